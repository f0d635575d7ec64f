//! Index types for mesh elements.
//!
//! Points and cells are addressed through type-safe wrappers that are generic
//! over the underlying integer width: `u16` for tiny fixtures, `u32` for the
//! interactive meshes this crate targets, `u64` when a scan is huge.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types usable as mesh indices.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The largest index that can be stored.
    const MAX: Self;

    /// Sentinel for "no element".
    const INVALID: Self;

    /// Convert from usize.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check that this is not the sentinel.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX - 1;
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u128 <= Self::MAX as u128,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// A point (vertex) index. This is the "point id" handed out by pickers.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A cell (polygon) index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CellId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $prefix:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Wrap a position in the mesh's point or cell array.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The "no element" sentinel, used to pre-fill tables.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Position in the mesh's point or cell array.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// False for the sentinel returned by [`Self::invalid`].
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.is_valid() {
                    true => write!(f, "{}{}", $prefix, self.index()),
                    false => write!(f, "{}-", $prefix),
                }
            }
        }
    };
}

impl_index_type!(VertexId, "p");
impl_index_type!(CellId, "c");
