//! The fixed, ordered list of built-in types the metamodel bootstraps from
//! (§4.A): "boostrapped through a fixed, ordered list of built-in types
//! whose memory layouts are declared statically and validated at runtime".
//!
//! Declared sizes below stand in for what would, in the original system, be
//! read out of a generated metamodel description; here they're written out
//! explicitly so the self-check in [`run`] has something independent of
//! [`Primitive::native_layout`] to compare against (`original_source/
//! src/store/bootstrap.c` runs the equivalent check against the C compiler's
//! `sizeof`).

use crate::error::{Error, Result};
use crate::kind::Primitive;
use crate::ty::Type;
use std::sync::{Arc, LazyLock};

struct Declared {
    name: &'static str,
    prim: Primitive,
    declared_size: usize,
    declared_align: usize,
}

const BUILTINS: &[Declared] = &[
    Declared { name: "bool", prim: Primitive::Bool, declared_size: 1, declared_align: 1 },
    Declared { name: "int8", prim: Primitive::Int8, declared_size: 1, declared_align: 1 },
    Declared { name: "int16", prim: Primitive::Int16, declared_size: 2, declared_align: 2 },
    Declared { name: "int32", prim: Primitive::Int32, declared_size: 4, declared_align: 4 },
    Declared { name: "int64", prim: Primitive::Int64, declared_size: 8, declared_align: 8 },
    Declared { name: "uint8", prim: Primitive::UInt8, declared_size: 1, declared_align: 1 },
    Declared { name: "uint16", prim: Primitive::UInt16, declared_size: 2, declared_align: 2 },
    Declared { name: "uint32", prim: Primitive::UInt32, declared_size: 4, declared_align: 4 },
    Declared { name: "uint64", prim: Primitive::UInt64, declared_size: 8, declared_align: 8 },
    Declared { name: "float32", prim: Primitive::Float32, declared_size: 4, declared_align: 4 },
    Declared { name: "float64", prim: Primitive::Float64, declared_size: 8, declared_align: 8 },
];

/// Registry of bootstrapped built-in types, keyed by name in declaration
/// order (iteration order is preserved for diagnostics; lookups are by
/// name).
pub struct Registry {
    types: Vec<(&'static str, Arc<Type>)>,
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<Arc<Type>> {
        self.types
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Arc<Type>)> {
        self.types.iter()
    }
}

/// Runs the bootstrap self-check and builds the built-in type registry.
/// Returns `Error::Internal` on the first layout mismatch; per §7, this
/// category is not recoverable and callers should abort.
pub fn run() -> Result<Registry> {
    let mut types = Vec::with_capacity(BUILTINS.len());
    for b in BUILTINS {
        let (native_size, native_align) = b.prim.native_layout();
        if native_size != b.declared_size || native_align != b.declared_align {
            return Err(Error::Internal {
                name: b.name.to_string(),
                meta_size: b.declared_size,
                meta_align: b.declared_align,
                native_size,
                native_align,
            });
        }
        tracing::debug!(name = b.name, size = native_size, align = native_align, "bootstrapped builtin type");
        types.push((b.name, Arc::new(Type::primitive(b.name, b.prim))));
    }
    Ok(Registry { types })
}

/// Process-wide singleton registry, built once on first access. Bootstrap
/// failure here is an `Internal` error (§4.A) and aborts the process rather
/// than returning a half-built metamodel to callers.
pub static BUILTINS_REGISTRY: LazyLock<Registry> = LazyLock::new(|| match run() {
    Ok(reg) => reg,
    Err(err) => {
        tracing::error!(%err, "fatal metamodel bootstrap failure");
        std::process::abort();
    }
});

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bootstrap_succeeds_and_registers_known_names() {
        let reg = run().expect("bootstrap must succeed on this platform");
        assert!(reg.get("int32").is_some());
        assert!(reg.get("float64").is_some());
        assert!(reg.get("nonexistent").is_none());
    }

    #[test]
    fn declared_sizes_match_native_layout_for_every_builtin() {
        for b in BUILTINS {
            let (size, align) = b.prim.native_layout();
            assert_eq!(size, b.declared_size, "size mismatch for {}", b.name);
            assert_eq!(align, b.declared_align, "align mismatch for {}", b.name);
        }
    }
}
