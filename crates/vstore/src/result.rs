use metamodel::{Type, Value};
use std::sync::Arc;

/// One row of a composed query result (§4.F). `path` is mount-relative as
/// returned by `Mount::on_query`, and rewritten to an absolute store path by
/// the router before it reaches a caller. `value` is `None` for an unknown
/// placeholder (`yield_unknown`): a row the dispatcher knows might exist but
/// has not resolved a concrete value for.
#[derive(Clone, Debug)]
pub struct QueryResult {
    pub id: u64,
    pub path: String,
    pub ty: Arc<Type>,
    pub value: Option<Value>,
}

impl QueryResult {
    pub fn is_unknown(&self) -> bool {
        self.value.is_none()
    }
}

/// `instanceof` (§4.F query field): true if `ty` is `name` or descends from
/// it through the base chain.
pub fn is_instance_of(ty: &Type, name: &str) -> bool {
    if ty.name == name {
        return true;
    }
    match &ty.base {
        Some(base) => is_instance_of(base, name),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use metamodel::{Delegates, Primitive};

    #[test]
    fn instanceof_walks_the_base_chain() {
        let base = Arc::new(Type::composite("Base", None, vec![], Delegates::default()).unwrap());
        let derived = Type::composite("Derived", Some(base.clone()), vec![], Delegates::default()).unwrap();
        assert!(is_instance_of(&derived, "Base"));
        assert!(is_instance_of(&derived, "Derived"));
        assert!(!is_instance_of(&derived, "Other"));

        let unrelated = Type::primitive("int32", Primitive::Int32);
        assert!(!is_instance_of(&unrelated, "Base"));
    }
}
