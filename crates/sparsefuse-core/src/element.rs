//! Stored value types and their runtime descriptors.
//!
//! `Element` ties a Rust scalar to a `DType` descriptor and to the notion of
//! "zero" that decides whether a value is stored in sparse storage.

use core::fmt::Debug;

/// Runtime descriptor of a stored value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl DType {
    /// Size of one value in bytes.
    #[inline]
    #[must_use]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    #[must_use]
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    #[inline]
    #[must_use]
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    const fn priority(self) -> u8 {
        match self {
            Self::F64 => 100,
            Self::F32 => 90,
            Self::I64 => 65,
            Self::U64 => 60,
            Self::I32 => 55,
            Self::U32 => 50,
            Self::I16 => 45,
            Self::U16 => 40,
            Self::I8 => 35,
            Self::U8 => 30,
            Self::Bool => 25,
        }
    }

    /// Common type of two operand types.
    ///
    /// Floats win over integers, wider wins over narrower, and mixing signed
    /// with unsigned integers yields a signed type wide enough for both.
    #[must_use]
    pub const fn promote(self, other: Self) -> Self {
        if self as u8 == other as u8 {
            return self;
        }
        if self.is_signed_int() && other.is_unsigned_int() {
            return match (self, other) {
                (Self::I64, _) | (Self::I32, Self::U64 | Self::U32) => Self::I64,
                (Self::I32, _) => Self::I32,
                (Self::I16, Self::U64 | Self::U32 | Self::U16) => Self::I32,
                (Self::I16, _) => Self::I16,
                (Self::I8, Self::U8) => Self::I16,
                (Self::I8, Self::U16) => Self::I32,
                _ => Self::I64,
            };
        }
        if other.is_signed_int() && self.is_unsigned_int() {
            return other.promote(self);
        }
        if self.priority() >= other.priority() {
            self
        } else {
            other
        }
    }

    /// Common type of a list of operand types, `None` when empty.
    #[must_use]
    pub fn promote_all(types: &[Self]) -> Option<Self> {
        let (&first, rest) = types.split_first()?;
        Some(rest.iter().fold(first, |acc, &t| acc.promote(t)))
    }
}

/// A value that can be stored in a sparse container.
///
/// `zero()` is the implicit value of every unstored position. Kernels call
/// `is_zero` to keep results canonical (no stored zeros).
pub trait Element: Copy + PartialEq + Debug + Send + Sync + 'static {
    const DTYPE: DType;

    fn zero() -> Self;

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

macro_rules! impl_element {
    ($($t:ty => $d:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$d;

                #[inline]
                fn zero() -> Self {
                    <$t as num_traits::Zero>::zero()
                }
            }
        )*
    };
}

impl_element!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn zero() -> Self {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_prefers_float_and_width() {
        assert_eq!(DType::I32.promote(DType::F32), DType::F32);
        assert_eq!(DType::F32.promote(DType::F64), DType::F64);
        assert_eq!(DType::Bool.promote(DType::U8), DType::U8);
        assert_eq!(DType::I8.promote(DType::U8), DType::I16);
        assert_eq!(DType::U32.promote(DType::I32), DType::I64);
    }

    #[test]
    fn promote_all_folds() {
        assert_eq!(DType::promote_all(&[]), None);
        assert_eq!(
            DType::promote_all(&[DType::Bool, DType::I16, DType::F32]),
            Some(DType::F32)
        );
    }

    #[test]
    fn negative_zero_is_zero() {
        assert!((-0.0f64).is_zero());
        assert!(!f64::NAN.is_zero());
        assert!(!true.is_zero());
    }
}
