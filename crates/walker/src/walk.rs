use crate::policy::{AliasAction, KeyAction, OptionalAction, Policy};
use crate::position::Position;
use crate::sink::Sink;
use metamodel::{ContainerKind, Kind, Modifier, Type, Value};

/// Walks `value` (of type `ty`) structurally, calling `sink.enter`/`leave`
/// at every position the policy admits (§4.D). Mirrors
/// `original_source/packages/corto/src/walk.c`'s dispatch order: base
/// members first (when requested), own members next, then container
/// elements for collection-shaped types.
pub fn walk<S: Sink>(ty: &Type, value: &Value, sink: &mut S, policy: &Policy) -> Result<(), S::Error> {
    walk_value(Position::Object, ty, value, sink, policy)
}

fn walk_value<S: Sink>(
    pos: Position,
    ty: &Type,
    value: &Value,
    sink: &mut S,
    policy: &Policy,
) -> Result<(), S::Error> {
    tracing::trace!(ty = %ty.name, ?pos, "walk: enter");
    sink.enter(pos, ty, value)?;

    match ty.kind {
        Kind::Void | Kind::Primitive => {}
        Kind::Any => walk_any(ty, value, sink, policy)?,
        Kind::Composite => {
            let fields = match value {
                Value::Composite(fields) => fields,
                other => {
                    return Err(crate::Error::ShapeMismatch {
                        ty: ty.name.clone(),
                        expected: "composite",
                        found: other.kind_name(),
                    }
                    .into())
                }
            };
            let mut idx = 0;
            walk_composite(ty, fields, &mut idx, Position::Member, sink, policy)?;
        }
        Kind::Collection | Kind::Iterator => walk_collection(ty, value, sink, policy)?,
    }

    tracing::trace!(ty = %ty.name, ?pos, "walk: leave");
    sink.leave(pos, ty, value)
}

fn walk_any<S: Sink>(ty: &Type, value: &Value, sink: &mut S, policy: &Policy) -> Result<(), S::Error> {
    let (inner_ty, inner_val) = match value {
        Value::Any(inner_ty, inner_val) => (inner_ty, inner_val.as_ref()),
        other => {
            return Err(crate::Error::ShapeMismatch {
                ty: ty.name.clone(),
                expected: "any",
                found: other.kind_name(),
            }
            .into())
        }
    };
    if policy.alias_action == AliasAction::Follow {
        walk_value(Position::Mem, inner_ty, inner_val, sink, policy)?;
    }
    Ok(())
}

/// Recurses through `ty`'s base chain (tagging every base member `Base`)
/// before visiting `ty`'s own members (tagged `own_pos`, `Member` at the
/// root call and `Base` again for the base's own members one level up).
fn walk_composite<S: Sink>(
    ty: &Type,
    fields: &[Value],
    idx: &mut usize,
    own_pos: Position,
    sink: &mut S,
    policy: &Policy,
) -> Result<(), S::Error> {
    if let Some(base) = &ty.base {
        if policy.visit_base {
            walk_composite(base, fields, idx, Position::Base, sink, policy)?;
        } else {
            *idx += base.all_members().len();
        }
    }

    let Some(composite) = ty.as_composite() else {
        return Ok(());
    };

    for m in &composite.members {
        let field = fields.get(*idx).ok_or_else(|| crate::Error::FieldCountMismatch {
            ty: ty.name.clone(),
            expected: composite.members.len(),
            found: fields.len(),
        })?;
        *idx += 1;

        let is_key = m.is_key();
        let wanted = match policy.key_action {
            KeyAction::All => true,
            KeyAction::KeysOnly => is_key,
            KeyAction::DataOnly => !is_key,
        };
        if !wanted || !policy.access.matches(m.modifiers) {
            continue;
        }

        if m.modifiers.contains(Modifier::OPTIONAL) && matches!(field, Value::Void) {
            match policy.optional_action {
                OptionalAction::OnlyIfSet => continue,
                OptionalAction::PassThroughAddress => {
                    sink.enter(own_pos, &m.ty, field)?;
                    continue;
                }
                OptionalAction::Always => {}
            }
        }

        walk_value(own_pos, &m.ty, field, sink, policy)?;
    }
    Ok(())
}

fn walk_collection<S: Sink>(
    ty: &Type,
    value: &Value,
    sink: &mut S,
    policy: &Policy,
) -> Result<(), S::Error> {
    let collection = ty.as_collection().ok_or_else(|| crate::Error::ShapeMismatch {
        ty: ty.name.clone(),
        expected: "collection",
        found: value.kind_name(),
    })?;

    let items: Vec<&Value> = match (&collection.container, value) {
        (ContainerKind::Array(_), Value::Collection(items))
        | (ContainerKind::Sequence, Value::Collection(items)) => items.iter().collect(),
        (ContainerKind::List, Value::List(items)) => items.iter().collect(),
        (ContainerKind::Map, Value::Map(items)) => items.values().collect(),
        (_, Value::Iterator(items)) => items.iter().collect(),
        (_, other) => {
            return Err(crate::Error::ShapeMismatch {
                ty: ty.name.clone(),
                expected: "collection",
                found: other.kind_name(),
            }
            .into())
        }
    };

    for item in items {
        walk_value(Position::Element, &collection.element, item, sink, policy)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::policy::Policy;
    use metamodel::{Delegates, Member, Primitive};
    use std::sync::Arc;

    struct Recorder(Vec<String>);
    impl Sink for Recorder {
        type Error = crate::Error;
        fn enter(&mut self, pos: Position, ty: &Type, _value: &Value) -> Result<(), Self::Error> {
            self.0.push(format!("enter {:?} {}", pos, ty.name));
            Ok(())
        }
        fn leave(&mut self, pos: Position, ty: &Type, _value: &Value) -> Result<(), Self::Error> {
            self.0.push(format!("leave {:?} {}", pos, ty.name));
            Ok(())
        }
    }

    #[test]
    fn visits_base_before_own_members() {
        let int_ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        let base = Arc::new(
            Type::composite(
                "Base",
                None,
                vec![Member::new("a", int_ty.clone(), 0)],
                Delegates::default(),
            )
            .unwrap(),
        );
        let derived = Type::composite(
            "Derived",
            Some(base),
            vec![Member::new("b", int_ty, 0)],
            Delegates::default(),
        )
        .unwrap();

        let value = Value::Composite(vec![Value::Int(1), Value::Int(2)]);
        let mut rec = Recorder(Vec::new());
        walk(&derived, &value, &mut rec, &Policy::default()).unwrap();

        assert_eq!(
            rec.0,
            vec![
                "enter Object Derived",
                "enter Base int32",
                "leave Base int32",
                "enter Member int32",
                "leave Member int32",
                "leave Object Derived",
            ]
        );
    }

    #[test]
    fn collection_elements_visited_in_order() {
        let int_ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        let arr = Type::collection("ints", int_ty, ContainerKind::Sequence);
        let value = Value::Collection(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let mut rec = Recorder(Vec::new());
        walk(&arr, &value, &mut rec, &Policy::default()).unwrap();
        let enters: Vec<_> = rec.0.iter().filter(|l| l.starts_with("enter Element")).collect();
        assert_eq!(enters.len(), 3);
    }
}
