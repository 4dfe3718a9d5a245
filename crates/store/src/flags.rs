/// Local copy of `metamodel::flags`'s bitset generator: named `u16`
/// constants plus `BitOr`/`BitAnd`/`Sub`/`Not` and a sparse `Debug`. Each
/// crate in this workspace that needs a bitmask carries its own copy rather
/// than exporting one from `metamodel`, matching the teacher's own pattern
/// of small, crate-local `Set` types rather than a shared flags crate.
macro_rules! bitset {
    ($name:ident, $repr:ty, { $( $(#[$meta:meta])* $const_name:ident = $val:expr ),+ $(,)? }) => {
        #[derive(Clone, Copy, Eq, PartialEq, Hash, Default)]
        pub struct $name(pub $repr);

        impl $name {
            pub const NONE: $name = $name(0);

            $(
                $(#[$meta])*
                pub const $const_name: $name = $name($val);
            )+

            #[inline]
            pub fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            #[inline]
            pub fn overlaps(self, other: $name) -> bool {
                (self.0 & other.0) != 0
            }

            #[inline]
            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            #[inline]
            pub fn remove(&mut self, other: $name) {
                self.0 &= !other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            #[inline]
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = $name;
            #[inline]
            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }

        impl std::ops::Sub for $name {
            type Output = $name;
            #[inline]
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 & !rhs.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut first = true;
                write!(f, "{}(", stringify!($name))?;
                $(
                    if self.contains($name::$const_name) {
                        if !first {
                            write!(f, "|")?;
                        }
                        write!(f, stringify!($const_name))?;
                        first = false;
                    }
                )+
                if first {
                    write!(f, "NONE")?;
                }
                write!(f, ")")
            }
        }
    };
}

bitset!(Attribute, u16, {
    /// Object is reachable by name from its parent's scope.
    NAMED = 0b0_0001,
    /// Object's payload may be assigned after `define`.
    WRITABLE = 0b0_0010,
    /// Object may be observed (§4.E).
    OBSERVABLE = 0b0_0100,
    /// Object survives process restart (persisted by a mount).
    PERSISTENT = 0b0_1000,
    /// Object is the default instance of its type within its scope.
    DEFAULT = 0b1_0000,
});
