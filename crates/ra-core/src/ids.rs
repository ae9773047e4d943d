//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into arena `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around `u32` with a short display prefix.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident = $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel for "no valid ID" (`u32::MAX`).
            pub const INVALID: $name = $name(u32::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Wrap a `Vec` position.
            ///
            /// # Panics
            /// Panics in debug mode if `i` does not fit below the sentinel.
            #[inline(always)]
            pub fn from_index(i: usize) -> Self {
                debug_assert!(i < u32::MAX as usize, "{} overflow: {i}", stringify!($name));
                $name(i as u32)
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "?"))
                }
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Position of a geometry record inside its [`GeometrySet`](crate::GeometrySet).
    ///
    /// The spatial index stores these handles instead of owning the records.
    pub struct GeomKey = "g";
}

typed_id! {
    /// Index of a road-graph node.  Nodes are numbered in creation order.
    pub struct NodeId = "n";
}

typed_id! {
    /// Slot of a node in the spatial index arena.
    pub struct IndexNodeId = "x";
}
