//! Index types for compressed storage.
//!
//! Row positions and column pointers are stored in a caller-chosen integer
//! type. Converting into that type is always checked: a value that does not
//! fit is an `Error::IndexOverflow`, never a silent truncation.

use crate::error::{Error, Result};
use core::fmt::Debug;
use num_traits::PrimInt;

/// Width descriptor of an index type, used to pick the widest type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexWidth {
    W8,
    W16,
    W32,
    W64,
}

pub trait SpIndex: PrimInt + Debug + Send + Sync + 'static {
    const NAME: &'static str;
    const WIDTH: IndexWidth;

    /// Checked conversion from a position.
    #[inline]
    fn from_usize(x: usize) -> Option<Self> {
        <Self as num_traits::NumCast>::from(x)
    }

    /// Like `from_usize`, reporting failure as `IndexOverflow`.
    #[inline]
    fn try_from_usize(x: usize) -> Result<Self> {
        Self::from_usize(x).ok_or(Error::IndexOverflow {
            value: x,
            index_type: Self::NAME,
        })
    }

    /// Position stored in this index; negative values are a structural bug.
    #[inline]
    fn index(self) -> usize {
        debug_assert!(self >= Self::zero());
        self.to_usize().unwrap_or(usize::MAX)
    }
}

macro_rules! impl_sp_index {
    ($($t:ty => $w:ident),* $(,)?) => {
        $(
            impl SpIndex for $t {
                const NAME: &'static str = stringify!($t);
                const WIDTH: IndexWidth = IndexWidth::$w;
            }
        )*
    };
}

impl_sp_index!(
    u8 => W8,
    u16 => W16,
    u32 => W32,
    u64 => W64,
    i16 => W16,
    i32 => W32,
    i64 => W64,
);

#[cfg(target_pointer_width = "64")]
impl SpIndex for usize {
    const NAME: &'static str = "usize";
    const WIDTH: IndexWidth = IndexWidth::W64;
}

#[cfg(target_pointer_width = "32")]
impl SpIndex for usize {
    const NAME: &'static str = "usize";
    const WIDTH: IndexWidth = IndexWidth::W32;
}
