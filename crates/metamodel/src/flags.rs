/// Defines a small bitset newtype over `u32`, in the style of
/// `doc::schema::types::Set`: named constants, `BitOr`/`BitAnd`/`Sub`
/// operators, and an `overlaps`/`contains` helper pair. Used for member
/// modifiers, object attributes, lifecycle state, and (in `observer`) event
/// and scope masks — anywhere the spec describes a "bitmask".
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
            pub fn is_empty(self) -> bool {
                self.0 == 0
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

        impl std::ops::Not for $name {
            type Output = $name;
            #[inline]
            fn not(self) -> $name {
                $name(!self.0)
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

pub(crate) use bitset;

bitset!(Modifier, u16, {
    /// Member is reachable through a named child (`NAMED` analog for members).
    OBSERVABLE = 0b0000_0001,
    /// Member participates in the composite's key (used for comparison/`keycache`).
    KEY = 0b0000_0010,
    /// Member may be absent; governed by a state condition expression.
    OPTIONAL = 0b0000_0100,
    /// Member is not reachable outside its declaring type.
    PRIVATE = 0b0000_1000,
    /// Member can be assigned after `define`.
    WRITABLE = 0b0001_0000,
    /// Member is local to this process and excluded from serialization.
    LOCAL = 0b0010_0000,
});

bitset!(TypeFlags, u16, {
    HAS_INIT = 0b0000_0001,
    HAS_DEINIT = 0b0000_0010,
    HAS_CONSTRUCT = 0b0000_0100,
    HAS_DESTRUCT = 0b0000_1000,
    HAS_REFERENCES = 0b0001_0000,
    HAS_RESOURCES = 0b0010_0000,
    NEEDS_INIT = 0b0100_0000,
    IS_CONTAINER = 0b1000_0000,
});
