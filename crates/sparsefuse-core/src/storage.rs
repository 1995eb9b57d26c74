//! Uniform read view over sparse vectors and CSC matrices.
//!
//! A vector is a matrix with a single column, so kernels written against
//! `SparseStorage` iterate columns without a vector/matrix branch.

use crate::csc::Csc;
use crate::element::Element;
use crate::index::SpIndex;
use crate::vector::SparseVec;
use core::ops::Range;

pub trait SparseStorage<T, I> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    /// Positions in `stored_indices`/`stored_values` belonging to column `j`.
    fn col_range(&self, j: usize) -> Range<usize>;
    fn stored_indices(&self) -> &[I];
    fn stored_values(&self) -> &[T];

    #[inline]
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    #[inline]
    fn nnz(&self) -> usize {
        self.stored_values().len()
    }
}

impl<T: Element, I: SpIndex> SparseStorage<T, I> for Csc<T, I> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn col_range(&self, j: usize) -> Range<usize> {
        Csc::col_range(self, j)
    }

    #[inline]
    fn stored_indices(&self) -> &[I] {
        &self.indices
    }

    #[inline]
    fn stored_values(&self) -> &[T] {
        &self.data
    }
}

impl<T: Element, I: SpIndex> SparseStorage<T, I> for SparseVec<T, I> {
    #[inline]
    fn nrows(&self) -> usize {
        self.n
    }

    #[inline]
    fn ncols(&self) -> usize {
        1
    }

    #[inline]
    fn col_range(&self, j: usize) -> Range<usize> {
        debug_assert_eq!(j, 0);
        0..self.data.len()
    }

    #[inline]
    fn stored_indices(&self) -> &[I] {
        &self.indices
    }

    #[inline]
    fn stored_values(&self) -> &[T] {
        &self.data
    }
}

/// Borrowed operand handed to the kernels.
///
/// Built from any `SparseStorage`; the stored arrays are cached as slices so
/// the scan loops only go through the trait for per-column ranges.
pub struct Operand<'a, T, I> {
    src: &'a dyn SparseStorage<T, I>,
    indices: &'a [I],
    values: &'a [T],
    nrows: usize,
    ncols: usize,
}

impl<T, I> Clone for Operand<'_, T, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, I> Copy for Operand<'_, T, I> {}

impl<T, I> core::fmt::Debug for Operand<'_, T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Operand")
            .field("nrows", &self.nrows)
            .field("ncols", &self.ncols)
            .field("nnz", &self.values.len())
            .finish()
    }
}

impl<'a, T, I> Operand<'a, T, I> {
    #[must_use]
    pub fn new(src: &'a dyn SparseStorage<T, I>) -> Self {
        Self {
            src,
            indices: src.stored_indices(),
            values: src.stored_values(),
            nrows: src.nrows(),
            ncols: src.ncols(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    #[must_use]
    pub const fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    #[must_use]
    pub const fn nnz(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn col_range(&self, j: usize) -> Range<usize> {
        self.src.col_range(j)
    }
}

impl<T: Copy, I: SpIndex> Operand<'_, T, I> {
    /// Row of stored position `p`.
    #[inline]
    #[must_use]
    pub fn row(&self, p: usize) -> usize {
        self.indices[p].index()
    }

    /// Value of stored position `p`.
    #[inline]
    #[must_use]
    pub fn value(&self, p: usize) -> T {
        self.values[p]
    }
}

impl<'a, T: Element, I: SpIndex> From<&'a Csc<T, I>> for Operand<'a, T, I> {
    fn from(a: &'a Csc<T, I>) -> Self {
        Self::new(a)
    }
}

impl<'a, T: Element, I: SpIndex> From<&'a SparseVec<T, I>> for Operand<'a, T, I> {
    fn from(v: &'a SparseVec<T, I>) -> Self {
        Self::new(v)
    }
}

impl<T: Element, I: SpIndex> Csc<T, I> {
    #[inline]
    #[must_use]
    pub fn as_operand(&self) -> Operand<'_, T, I> {
        Operand::new(self)
    }
}

impl<T: Element, I: SpIndex> SparseVec<T, I> {
    #[inline]
    #[must_use]
    pub fn as_operand(&self) -> Operand<'_, T, I> {
        Operand::new(self)
    }
}
