//! Strongly typed identifier wrappers.
//!
//! Network IDs (`NodeId`, `EdgeId`) are dense arena indices assigned by the
//! network builder.  `ObjectId` is the caller's identifier of an origin or
//! destination and is never used for indexing.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a network node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed network edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// External identifier of an origin or destination object.
    pub struct ObjectId(u64);
}

typed_id! {
    /// Public-transport line (route) identifier.
    pub struct LineId(u32);
}

typed_id! {
    /// Public-transport trip (vehicle run) identifier.
    pub struct TripId(u32);
}

typed_id! {
    /// Destination category used by multi-category result stores.
    pub struct CategoryId(u16);
}
