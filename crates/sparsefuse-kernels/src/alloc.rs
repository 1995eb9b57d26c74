//! Result allocation and the write cursor shared by the scan kernels.
//!
//! `ResultWriter` owns the result container for the duration of a call. The
//! kernels only decide which `(row, value)` pairs a column produces; the
//! writer applies the storage policy:
//! - zero-preserving: zeros are dropped, entries are appended, storage is
//!   expanded when full and trimmed at the end;
//! - densifying: the container is densified up front and only cells that
//!   differ from the fill value are overwritten.

use sparsefuse_core::{Csc, Element, Result, SpIndex};
use tracing::trace;

use crate::densify::densify;
use crate::resolve::{Plan, Policy};

pub(crate) struct ResultWriter<U, J> {
    out: Csc<U, J>,
    policy: Policy<U>,
    growth_factor: usize,
    expansions: usize,
    base: usize,
}

/// Allocates an empty result of `plan.shape` with room for `plan.capacity`
/// stored entries.
pub(crate) fn allocate<U: Element, J: SpIndex>(
    plan: &Plan<U>,
    growth_factor: usize,
) -> Result<ResultWriter<U, J>> {
    allocate_in(plan, growth_factor, (Vec::new(), Vec::new(), Vec::new()))
}

/// Like `allocate`, reusing the given `(indptr, indices, data)` buffers.
pub(crate) fn allocate_in<U: Element, J: SpIndex>(
    plan: &Plan<U>,
    growth_factor: usize,
    parts: (Vec<J>, Vec<J>, Vec<U>),
) -> Result<ResultWriter<U, J>> {
    let (nrows, ncols) = plan.shape;
    let (mut indptr, mut indices, mut data) = parts;
    indptr.clear();
    indices.clear();
    data.clear();
    let mut out = Csc::from_parts_unchecked(nrows, ncols, indptr, indices, data);
    match plan.policy {
        Policy::ZeroPreserving => {
            out.indptr.reserve_exact(ncols + 1);
            out.indices.reserve_exact(plan.capacity);
            out.data.reserve_exact(plan.capacity);
        }
        Policy::Densifying(fill) => densify(&mut out, fill)?,
    }
    Ok(ResultWriter {
        out,
        policy: plan.policy,
        growth_factor,
        expansions: 0,
        base: 0,
    })
}

impl<U: Element, J: SpIndex> ResultWriter<U, J> {
    #[inline]
    pub(crate) const fn shape(&self) -> (usize, usize) {
        self.out.shape()
    }

    #[inline]
    pub(crate) fn is_fill(&self, v: &U) -> bool {
        self.policy.is_fill(v)
    }

    /// Starts output column `j`; columns are opened in ascending order.
    #[inline]
    pub(crate) fn open_column(&mut self, j: usize) -> Result<()> {
        match self.policy {
            Policy::ZeroPreserving => {
                debug_assert_eq!(self.out.indptr.len(), j);
                let start = J::try_from_usize(self.out.indices.len())?;
                self.out.indptr.push(start);
            }
            Policy::Densifying(_) => self.base = j * self.out.nrows,
        }
        Ok(())
    }

    /// Records the value of `row` in the open column. Rows of one column
    /// must arrive in ascending order.
    #[inline]
    pub(crate) fn emit(&mut self, row: usize, v: U) -> Result<()> {
        match self.policy {
            Policy::ZeroPreserving => {
                if v.is_zero() {
                    return Ok(());
                }
                let len = self.out.data.len();
                let room = self.out.indices.capacity().min(self.out.data.capacity());
                if len == room {
                    self.grow(len);
                }
                self.out.indices.push(J::try_from_usize(row)?);
                self.out.data.push(v);
            }
            Policy::Densifying(fill) => {
                if v != fill {
                    self.out.data[self.base + row] = v;
                }
            }
        }
        Ok(())
    }

    fn grow(&mut self, len: usize) {
        let target = len.saturating_mul(self.growth_factor).max(len + 1);
        trace!(from = len, to = target, "expanding result storage");
        self.out.expand(target);
        self.expansions += 1;
    }

    /// Closes the last column and trims storage to the occupied length.
    /// Returns the container and the number of expansions performed.
    pub(crate) fn finish(mut self) -> Result<(Csc<U, J>, usize)> {
        if matches!(self.policy, Policy::ZeroPreserving) {
            let nnz = self.out.indices.len();
            self.out.indptr.push(J::try_from_usize(nnz)?);
            self.out.trim(nnz);
        }
        debug_assert_eq!(self.out.indptr.len(), self.out.ncols + 1);
        Ok((self.out, self.expansions))
    }
}
