/// Local copy of the `bitset!` shape used across this workspace (see
/// `store::flags` / `metamodel::flags` for the macro itself — each crate
/// that needs a bitmask keeps its own small copy rather than importing one).
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
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            #[inline]
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
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

bitset!(Event, u16, {
    DECLARE = 0b0000_0001,
    DEFINE = 0b0000_0010,
    UPDATE = 0b0000_0100,
    DELETE = 0b0000_1000,
    INVALIDATE = 0b0001_0000,
    RESUME = 0b0010_0000,
    SUSPEND = 0b0100_0000,
});

bitset!(Scope, u8, {
    /// The observed object itself.
    ON_SELF = 0b0000_0001,
    /// Direct children of the observed object.
    ON_SCOPE = 0b0000_0010,
    /// The observed object's entire subtree.
    ON_TREE = 0b0000_0100,
    /// The observed object's own payload value.
    ON_VALUE = 0b0000_1000,
    /// The observed object's type (metavalue).
    ON_METAVALUE = 0b0001_0000,
    /// Any of the above; matches regardless of scope.
    ON_ANY = 0b0001_1111,
});
