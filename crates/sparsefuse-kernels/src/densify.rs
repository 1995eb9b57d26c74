//! Dense fallback: full occupancy in sparse storage.
//!
//! After `densify` every cell of the container is a stored entry holding the
//! fill value, so scans can overwrite cells by offset (`j * nrows + i`)
//! without a separate dense code path.

use rayon::prelude::*;
use sparsefuse_core::{Csc, Element, Error, Result, SpIndex, SparseVec};

use crate::utility::util::SMALL_NNZ_LIMIT;

/// Expands `a` to all `nrows * ncols` cells, every value set to `fill`.
///
/// Column pointers become `0, nrows, 2*nrows, ...` and each column's row
/// indices `0..nrows`. Existing content is discarded; capacity is reused.
///
/// # Errors
/// `IndexOverflow` if the cell count does not fit the index type.
pub fn densify<T: Element, I: SpIndex>(a: &mut Csc<T, I>, fill: T) -> Result<()> {
    let (nrows, ncols) = a.shape();
    let cells = nrows.checked_mul(ncols).ok_or(Error::IndexOverflow {
        value: usize::MAX,
        index_type: "usize",
    })?;
    I::try_from_usize(cells)?;
    let rows = row_indices::<I>(nrows)?;

    a.indptr.clear();
    for j in 0..=ncols {
        a.indptr.push(I::try_from_usize(j * nrows)?);
    }
    a.indices.clear();
    a.indices.resize(cells, I::zero());
    if nrows > 0 {
        if cells < SMALL_NNZ_LIMIT {
            for col in a.indices.chunks_mut(nrows) {
                col.copy_from_slice(&rows);
            }
        } else {
            a.indices
                .par_chunks_mut(nrows)
                .for_each(|col| col.copy_from_slice(&rows));
        }
    }
    a.data.clear();
    a.data.resize(cells, fill);
    Ok(())
}

/// Vector form of [`densify`]: indices `0..n`, every value `fill`.
pub fn densify_vec<T: Element, I: SpIndex>(v: &mut SparseVec<T, I>, fill: T) -> Result<()> {
    let rows = row_indices::<I>(v.n)?;
    v.indices.clear();
    v.indices.extend_from_slice(&rows);
    v.data.clear();
    v.data.resize(v.n, fill);
    Ok(())
}

fn row_indices<I: SpIndex>(nrows: usize) -> Result<Vec<I>> {
    (0..nrows).map(I::try_from_usize).collect()
}
