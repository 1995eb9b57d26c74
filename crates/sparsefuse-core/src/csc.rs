//! CSC format definitions and constructors

use crate::element::Element;
use crate::error::{Error, Result};
use crate::index::SpIndex;
use crate::vector::SparseVec;
use core::ops::Range;

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Csc<T, I> {
    pub data: Vec<T>,
    pub indices: Vec<I>, // row indices per column
    pub indptr: Vec<I>,  // column pointer, length ncols + 1
    pub ncols: usize,
    pub nrows: usize,
}

impl<T, I> Csc<T, I> {
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }
    #[inline]
    #[must_use]
    pub const fn from_parts_unchecked(
        nrows: usize,
        ncols: usize,
        indptr: Vec<I>,
        indices: Vec<I>,
        data: Vec<T>,
    ) -> Self {
        Self {
            data,
            indices,
            indptr,
            ncols,
            nrows,
        }
    }

    /// Moves the backing arrays out, leaving the container empty (no columns).
    #[inline]
    pub fn take_parts(&mut self) -> (Vec<I>, Vec<I>, Vec<T>) {
        (
            core::mem::take(&mut self.indptr),
            core::mem::take(&mut self.indices),
            core::mem::take(&mut self.data),
        )
    }
}

impl<T: Element, I: SpIndex> Csc<T, I> {
    /// All-zero matrix with no stored entries.
    #[must_use]
    pub fn empty(nrows: usize, ncols: usize) -> Self {
        Self::from_parts_unchecked(
            nrows,
            ncols,
            vec![I::zero(); ncols + 1],
            Vec::new(),
            Vec::new(),
        )
    }

    #[inline]
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        indptr: Vec<I>,
        indices: Vec<I>,
        data: Vec<T>,
        check: bool,
    ) -> Result<Self> {
        let Some(expected_len) = ncols.checked_add(1) else {
            return Err(invalid("ncols overflow when adding 1"));
        };
        if indptr.len() != expected_len {
            return Err(invalid("indptr length must be ncols + 1"));
        }
        if indices.len() != data.len() {
            return Err(invalid("indices and data must have equal length"));
        }
        let nnz = indices.len();
        if indptr.last().and_then(|p| p.to_usize()) != Some(nnz) {
            return Err(invalid("indptr last element must equal nnz"));
        }
        if indptr.first().copied().unwrap_or_else(I::zero) != I::zero() {
            return Err(invalid("indptr first element must be 0"));
        }
        if check {
            for (prev_ptr, next_ptr) in indptr.iter().zip(indptr.iter().skip(1)) {
                if *prev_ptr < I::zero() || *next_ptr < I::zero() {
                    return Err(invalid("indptr must be non-negative"));
                }
                if prev_ptr > next_ptr {
                    return Err(invalid("indptr must be non-decreasing"));
                }
            }
            for (&start_i, &end_i) in indptr.iter().zip(indptr.iter().skip(1)).take(ncols) {
                let (start, end) = (start_i.index(), end_i.index());
                let Some(col_indices) = indices.get(start..end) else {
                    return Err(invalid("indptr elements must be within [0, nnz]"));
                };
                let mut prev_row: Option<usize> = None;
                for &i in col_indices {
                    if i < I::zero() || i.index() >= nrows {
                        return Err(invalid("row index out of bounds"));
                    }
                    let row = i.index();
                    if prev_row.is_some_and(|p| row <= p) {
                        return Err(invalid(
                            "row indices must be strictly increasing within each column",
                        ));
                    }
                    prev_row = Some(row);
                }
            }
        }
        Ok(Self::from_parts_unchecked(nrows, ncols, indptr, indices, data))
    }

    /// Stored positions `[indptr[j], indptr[j+1])` of column `j`.
    #[inline]
    #[must_use]
    pub fn col_range(&self, j: usize) -> Range<usize> {
        self.indptr[j].index()..self.indptr[j + 1].index()
    }

    /// Grows the backing arrays to hold at least `min_capacity` stored
    /// entries without moving existing content.
    #[inline]
    pub fn expand(&mut self, min_capacity: usize) {
        self.indices
            .reserve(min_capacity.saturating_sub(self.indices.len()));
        self.data.reserve(min_capacity.saturating_sub(self.data.len()));
    }

    /// Shrinks the backing arrays to exactly `exact` stored entries.
    #[inline]
    pub fn trim(&mut self, exact: usize) {
        self.indices.truncate(exact);
        self.data.truncate(exact);
        self.indices.shrink_to_fit();
        self.data.shrink_to_fit();
    }

    /// Builds a canonical matrix from a column-major dense buffer, skipping
    /// zeros.
    pub fn from_dense(nrows: usize, ncols: usize, dense: &[T]) -> Result<Self> {
        let cells = nrows
            .checked_mul(ncols)
            .ok_or_else(|| invalid("shape product overflow"))?;
        if dense.len() != cells {
            return Err(invalid("dense buffer length must be nrows * ncols"));
        }
        let mut indptr = Vec::with_capacity(ncols + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(I::zero());
        for j in 0..ncols {
            for (i, &v) in dense[j * nrows..(j + 1) * nrows].iter().enumerate() {
                if !v.is_zero() {
                    indices.push(I::try_from_usize(i)?);
                    data.push(v);
                }
            }
            indptr.push(I::try_from_usize(data.len())?);
        }
        Ok(Self::from_parts_unchecked(nrows, ncols, indptr, indices, data))
    }

    /// Column-major dense copy; unstored cells are `T::zero()`.
    #[must_use]
    pub fn to_dense(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.nrows * self.ncols];
        for j in 0..self.ncols {
            for p in self.col_range(j) {
                out[j * self.nrows + self.indices[p].index()] = self.data[p];
            }
        }
        out
    }

    /// Reinterprets a one-column matrix as a sparse vector.
    pub fn into_sparse_vec(self) -> Result<SparseVec<T, I>> {
        if self.ncols != 1 {
            return Err(Error::shape_mismatch((self.nrows, 1), self.shape()));
        }
        Ok(SparseVec::from_parts_unchecked(
            self.nrows,
            self.indices,
            self.data,
        ))
    }
}

#[inline]
fn invalid(msg: &str) -> Error {
    Error::InvalidStructure(msg.into())
}
