//! Eliminate explicitly stored zeros.
//!
//! A densified result stores every cell, including cells whose value is the
//! element zero; this recovers the minimal pattern.

use rayon::prelude::*;
use sparsefuse_core::{Csc, Element, Result, SpIndex, SparseVec};

use crate::utility::util::SMALL_NNZ_LIMIT;

#[inline]
fn count_nonzero<T: Element>(values: &[T]) -> usize {
    values.iter().filter(|v| !v.is_zero()).count()
}

/// Copy of `a` without stored zeros. Row order within columns is kept.
///
/// # Errors
/// `IndexOverflow` only if `a` itself holds pointers its index type cannot
/// represent, which a valid matrix never does.
pub fn eliminate_zeros<T: Element, I: SpIndex>(a: &Csc<T, I>) -> Result<Csc<T, I>> {
    if !a.data.iter().any(Element::is_zero) {
        return Ok(a.clone());
    }
    let ncols = a.ncols;
    let counts: Vec<usize> = if a.nnz() < SMALL_NNZ_LIMIT {
        (0..ncols).map(|j| count_nonzero(&a.data[a.col_range(j)])).collect()
    } else {
        (0..ncols)
            .into_par_iter()
            .map(|j| count_nonzero(&a.data[a.col_range(j)]))
            .collect()
    };
    let mut indptr = Vec::with_capacity(ncols + 1);
    let mut nnz = 0usize;
    indptr.push(I::zero());
    for count in counts {
        nnz += count;
        indptr.push(I::try_from_usize(nnz)?);
    }
    let mut indices = Vec::with_capacity(nnz);
    let mut data = Vec::with_capacity(nnz);
    for (&row, &v) in a.indices.iter().zip(&a.data) {
        if !v.is_zero() {
            indices.push(row);
            data.push(v);
        }
    }
    Ok(Csc::from_parts_unchecked(a.nrows, ncols, indptr, indices, data))
}

/// Vector form of [`eliminate_zeros`].
#[must_use]
pub fn eliminate_zeros_vec<T: Element, I: SpIndex>(v: &SparseVec<T, I>) -> SparseVec<T, I> {
    let (indices, data): (Vec<I>, Vec<T>) = v
        .indices
        .iter()
        .zip(&v.data)
        .filter(|(_, x)| !x.is_zero())
        .map(|(&i, &x)| (i, x))
        .unzip();
    SparseVec::from_parts_unchecked(v.n, indices, data)
}
