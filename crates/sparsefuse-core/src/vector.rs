//! Sparse vector format definitions and constructors

use crate::csc::Csc;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::index::SpIndex;

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct SparseVec<T, I> {
    pub data: Vec<T>,
    pub indices: Vec<I>, // strictly increasing positions
    pub n: usize,
}

impl<T, I> SparseVec<T, I> {
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }
    #[inline]
    #[must_use]
    pub const fn from_parts_unchecked(n: usize, indices: Vec<I>, data: Vec<T>) -> Self {
        Self { data, indices, n }
    }
}

impl<T: Element, I: SpIndex> SparseVec<T, I> {
    #[must_use]
    pub const fn empty(n: usize) -> Self {
        Self::from_parts_unchecked(n, Vec::new(), Vec::new())
    }

    pub fn from_parts(n: usize, indices: Vec<I>, data: Vec<T>, check: bool) -> Result<Self> {
        if indices.len() != data.len() {
            return Err(Error::InvalidStructure(
                "indices and data must have equal length".into(),
            ));
        }
        if check {
            let mut prev: Option<usize> = None;
            for &i in &indices {
                if i < I::zero() || i.index() >= n {
                    return Err(Error::InvalidStructure("index out of bounds".into()));
                }
                if prev.is_some_and(|p| i.index() <= p) {
                    return Err(Error::InvalidStructure(
                        "indices must be strictly increasing".into(),
                    ));
                }
                prev = Some(i.index());
            }
        }
        Ok(Self::from_parts_unchecked(n, indices, data))
    }

    pub fn from_dense(dense: &[T]) -> Result<Self> {
        let mut indices = Vec::new();
        let mut data = Vec::new();
        for (i, &v) in dense.iter().enumerate() {
            if !v.is_zero() {
                indices.push(I::try_from_usize(i)?);
                data.push(v);
            }
        }
        Ok(Self::from_parts_unchecked(dense.len(), indices, data))
    }

    #[must_use]
    pub fn to_dense(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.n];
        for (&i, &v) in self.indices.iter().zip(&self.data) {
            out[i.index()] = v;
        }
        out
    }

    #[inline]
    pub fn expand(&mut self, min_capacity: usize) {
        self.indices
            .reserve(min_capacity.saturating_sub(self.indices.len()));
        self.data.reserve(min_capacity.saturating_sub(self.data.len()));
    }

    #[inline]
    pub fn trim(&mut self, exact: usize) {
        self.indices.truncate(exact);
        self.data.truncate(exact);
        self.indices.shrink_to_fit();
        self.data.shrink_to_fit();
    }

    /// The same entries as an `n x 1` matrix.
    pub fn into_csc(self) -> Result<Csc<T, I>> {
        let nnz = I::try_from_usize(self.data.len())?;
        Ok(Csc::from_parts_unchecked(
            self.n,
            1,
            vec![I::zero(), nnz],
            self.indices,
            self.data,
        ))
    }
}
