//! Result shape, element type, index type and capacity of a fused call.
//!
//! Everything here runs before any result storage exists, so a
//! `ShapeMismatch` never leaves a partially written container behind.

use sparsefuse_core::{DType, Element, Error, IndexWidth, Operand, Result, SpIndex};

use crate::options::FuseOptions;

/// How the result of a call is stored, decided once by probing `f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy<U> {
    /// `f(0, ..., 0) == 0`: only nonzero results are stored.
    ZeroPreserving,
    /// `f(0, ..., 0) == fill != 0`: every cell is stored, prefilled with `fill`.
    Densifying(U),
}

impl<U: Element> Policy<U> {
    /// Applies `f` to the zero of every operand.
    pub fn probe<T: Element, F: Fn(&[T]) -> U>(f: &F, n: usize) -> Self {
        let zeros = vec![T::zero(); n];
        let fill = f(&zeros);
        if fill.is_zero() {
            Self::ZeroPreserving
        } else {
            Self::Densifying(fill)
        }
    }

    /// Whether `v` is the value of every unwritten cell.
    #[inline]
    pub fn is_fill(&self, v: &U) -> bool {
        match self {
            Self::ZeroPreserving => v.is_zero(),
            Self::Densifying(fill) => v == fill,
        }
    }
}

/// Everything a kernel needs to know before it starts writing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan<U> {
    pub shape: (usize, usize),
    pub input_type: DType,
    pub value_type: DType,
    pub index_width: IndexWidth,
    pub capacity: usize,
    pub policy: Policy<U>,
}

impl<U: Element> Plan<U> {
    pub(crate) fn for_map<T, I, J, F>(
        f: &F,
        operands: &[Operand<'_, T, I>],
        options: &FuseOptions,
    ) -> Result<Self>
    where
        T: Element,
        I: SpIndex,
        J: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let shape = map_shape(operands)?;
        let estimate = map_capacity(shape, operands);
        Self::build::<T, J, F>(f, shape, operands.len(), estimate, options)
    }

    pub(crate) fn for_broadcast<T, I, J, F>(
        f: &F,
        operands: &[Operand<'_, T, I>],
        target: Option<(usize, usize)>,
        options: &FuseOptions,
    ) -> Result<Self>
    where
        T: Element,
        I: SpIndex,
        J: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let shape = broadcast_shape(operands, target)?;
        let estimate = broadcast_capacity(shape, operands);
        Self::build::<T, J, F>(f, shape, operands.len(), estimate, options)
    }

    fn build<T, J, F>(
        f: &F,
        shape: (usize, usize),
        n: usize,
        estimate: usize,
        options: &FuseOptions,
    ) -> Result<Self>
    where
        T: Element,
        J: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let policy = Policy::probe(f, n);
        let capacity = match policy {
            Policy::ZeroPreserving => options.capacity_hint.unwrap_or(estimate),
            Policy::Densifying(_) => dense_cells(shape)?,
        };
        Ok(Self {
            shape,
            input_type: T::DTYPE,
            value_type: U::DTYPE,
            index_width: J::WIDTH,
            capacity,
            policy,
        })
    }
}

/// Common shape of equally shaped operands.
pub fn map_shape<T, I>(operands: &[Operand<'_, T, I>]) -> Result<(usize, usize)> {
    let (first, rest) = operands.split_first().ok_or(Error::NoOperands)?;
    let shape = first.shape();
    for op in rest {
        if op.shape() != shape {
            return Err(Error::shape_mismatch(shape, op.shape()));
        }
    }
    Ok(shape)
}

/// Broadcast shape of the operands, or `target` if every operand reaches it.
///
/// Per dimension, equal extents are kept and an extent of 1 takes the other
/// side's extent (including 0); any other pair is a `ShapeMismatch`.
pub fn broadcast_shape<T, I>(
    operands: &[Operand<'_, T, I>],
    target: Option<(usize, usize)>,
) -> Result<(usize, usize)> {
    let (first, rest) = operands.split_first().ok_or(Error::NoOperands)?;
    let mut shape = target.unwrap_or_else(|| first.shape());
    let ops = if target.is_some() { operands } else { rest };
    for op in ops {
        let (r, c) = op.shape();
        let rows = extent(shape.0, r, target.is_some());
        let cols = extent(shape.1, c, target.is_some());
        match (rows, cols) {
            (Some(rows), Some(cols)) => shape = (rows, cols),
            _ => return Err(Error::shape_mismatch(shape, op.shape())),
        }
    }
    Ok(shape)
}

#[inline]
fn extent(acc: usize, other: usize, fixed: bool) -> Option<usize> {
    if acc == other || other == 1 {
        Some(acc)
    } else if acc == 1 && !fixed {
        Some(other)
    } else {
        None
    }
}

/// `min(cells, sum of nnz)`; the union of the operand patterns never exceeds it.
fn map_capacity<T, I>(shape: (usize, usize), operands: &[Operand<'_, T, I>]) -> usize {
    let total = operands
        .iter()
        .fold(0usize, |acc, op| acc.saturating_add(op.nnz()));
    total.min(shape.0.saturating_mul(shape.1))
}

/// Each operand's nnz scaled by its replication factor in both dimensions,
/// capped at the dense cell count.
fn broadcast_capacity<T, I>(shape: (usize, usize), operands: &[Operand<'_, T, I>]) -> usize {
    let (nrows, ncols) = shape;
    let total = operands.iter().fold(0usize, |acc, op| {
        let vert = if op.nrows() == nrows { 1 } else { nrows };
        let horiz = if op.ncols() == ncols { 1 } else { ncols };
        acc.saturating_add(op.nnz().saturating_mul(vert).saturating_mul(horiz))
    });
    total.min(nrows.saturating_mul(ncols))
}

pub(crate) fn dense_cells(shape: (usize, usize)) -> Result<usize> {
    shape
        .0
        .checked_mul(shape.1)
        .ok_or(Error::IndexOverflow {
            value: usize::MAX,
            index_type: "usize",
        })
}
