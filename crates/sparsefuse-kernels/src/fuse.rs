//! Entry points of the fused element-wise engine.
//!
//! Every call runs the same pipeline: resolve shape, result type, capacity
//! and storage policy; allocate the result shell; run the merge or broadcast
//! scan; finish (trim) the result.

use sparsefuse_core::{Csc, Element, Operand, Result, SpIndex, SparseVec};
use tracing::debug;

use crate::alloc::{allocate, allocate_in, ResultWriter};
use crate::broadcast::broadcast_scan;
use crate::merge::merge_scan;
use crate::options::FuseOptions;
use crate::resolve::{Plan, Policy};

/// Outcome of one fused call, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuseReport<U> {
    pub policy: Policy<U>,
    /// Stored-entry capacity the result was allocated with.
    pub capacity: usize,
    /// Number of times result storage had to grow during the scan.
    pub expansions: usize,
    pub nnz: usize,
}

/// Result container together with its `FuseReport`.
#[derive(Debug, Clone)]
pub struct Fused<U, J> {
    pub matrix: Csc<U, J>,
    pub report: FuseReport<U>,
}

#[derive(Clone, Copy)]
enum Mode {
    Map,
    Broadcast,
}

impl FuseOptions {
    /// Element-wise `f` over equally shaped operands, result index type `J`.
    ///
    /// # Errors
    /// `NoOperands`, `ShapeMismatch` if the operand shapes differ,
    /// `IndexOverflow` if a row or column pointer does not fit `J`.
    pub fn map<J, T, U, I, F>(&self, f: F, operands: &[Operand<'_, T, I>]) -> Result<Fused<U, J>>
    where
        J: SpIndex,
        T: Element,
        U: Element,
        I: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let plan = Plan::for_map::<T, I, J, F>(&f, operands, self)?;
        let out = allocate::<U, J>(&plan, self.growth_factor)?;
        self.run(Mode::Map, &f, operands, &plan, out)
    }

    /// Element-wise `f` with broadcasting over unit extents, result index
    /// type `J`.
    ///
    /// # Errors
    /// `NoOperands`, `ShapeMismatch` if the shapes cannot be broadcast,
    /// `IndexOverflow` if a row or column pointer does not fit `J`.
    pub fn broadcast<J, T, U, I, F>(
        &self,
        f: F,
        operands: &[Operand<'_, T, I>],
    ) -> Result<Fused<U, J>>
    where
        J: SpIndex,
        T: Element,
        U: Element,
        I: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let plan = Plan::for_broadcast::<T, I, J, F>(&f, operands, None, self)?;
        let out = allocate::<U, J>(&plan, self.growth_factor)?;
        self.run(Mode::Broadcast, &f, operands, &plan, out)
    }

    /// `map` writing into `dest`, whose shape must equal the operands'.
    /// `dest`'s buffers are reused as result storage.
    ///
    /// # Errors
    /// As [`FuseOptions::map`], plus `ShapeMismatch` for a wrongly shaped
    /// destination. `dest` is left untouched by shape errors and reset to an
    /// empty matrix of its shape by an `IndexOverflow`.
    pub fn map_into<J, T, U, I, F>(
        &self,
        dest: &mut Csc<U, J>,
        f: F,
        operands: &[Operand<'_, T, I>],
    ) -> Result<FuseReport<U>>
    where
        J: SpIndex,
        T: Element,
        U: Element,
        I: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let plan = Plan::for_map::<T, I, J, F>(&f, operands, self)?;
        if dest.shape() != plan.shape {
            return Err(sparsefuse_core::Error::shape_mismatch(
                plan.shape,
                dest.shape(),
            ));
        }
        self.run_into(Mode::Map, dest, &f, operands, &plan)
    }

    /// `broadcast` writing into `dest`; every operand must broadcast to
    /// `dest`'s shape.
    ///
    /// # Errors
    /// As [`FuseOptions::map_into`].
    pub fn broadcast_into<J, T, U, I, F>(
        &self,
        dest: &mut Csc<U, J>,
        f: F,
        operands: &[Operand<'_, T, I>],
    ) -> Result<FuseReport<U>>
    where
        J: SpIndex,
        T: Element,
        U: Element,
        I: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let plan = Plan::for_broadcast::<T, I, J, F>(&f, operands, Some(dest.shape()), self)?;
        self.run_into(Mode::Broadcast, dest, &f, operands, &plan)
    }

    fn run_into<J, T, U, I, F>(
        &self,
        mode: Mode,
        dest: &mut Csc<U, J>,
        f: &F,
        operands: &[Operand<'_, T, I>],
        plan: &Plan<U>,
    ) -> Result<FuseReport<U>>
    where
        J: SpIndex,
        T: Element,
        U: Element,
        I: SpIndex,
        F: Fn(&[T]) -> U,
    {
        let (nrows, ncols) = dest.shape();
        let result = allocate_in::<U, J>(plan, self.growth_factor, dest.take_parts())
            .and_then(|out| self.run(mode, f, operands, plan, out));
        match result {
            Ok(fused) => {
                *dest = fused.matrix;
                Ok(fused.report)
            }
            Err(e) => {
                *dest = Csc::empty(nrows, ncols);
                Err(e)
            }
        }
    }

    fn run<J, T, U, I, F>(
        &self,
        mode: Mode,
        f: &F,
        operands: &[Operand<'_, T, I>],
        plan: &Plan<U>,
        mut out: ResultWriter<U, J>,
    ) -> Result<Fused<U, J>>
    where
        J: SpIndex,
        T: Element,
        U: Element,
        I: SpIndex,
        F: Fn(&[T]) -> U,
    {
        debug!(
            mode = match mode {
                Mode::Map => "map",
                Mode::Broadcast => "broadcast",
            },
            operands = operands.len(),
            nrows = plan.shape.0,
            ncols = plan.shape.1,
            input = ?plan.input_type,
            value = ?plan.value_type,
            index = ?plan.index_width,
            policy = ?plan.policy,
            capacity = plan.capacity,
            "fused element-wise call"
        );
        match mode {
            Mode::Map => merge_scan(f, operands, &mut out, self.specialized)?,
            Mode::Broadcast => broadcast_scan(f, operands, &mut out, self.specialized)?,
        }
        let (matrix, expansions) = out.finish()?;
        let report = FuseReport {
            policy: plan.policy,
            capacity: plan.capacity,
            expansions,
            nnz: matrix.nnz(),
        };
        debug!(nnz = report.nnz, expansions, "fused call finished");
        Ok(Fused { matrix, report })
    }
}

/// Element-wise `f` over equally shaped operands.
///
/// `f` receives one value per operand (zero where an operand stores
/// nothing). It is also called once with all zeros to decide whether the
/// result stays sparse, so it must be pure.
///
/// # Errors
/// `NoOperands`, `ShapeMismatch`, `IndexOverflow`.
pub fn map<T, U, I, F>(f: F, operands: &[Operand<'_, T, I>]) -> Result<Csc<U, I>>
where
    T: Element,
    U: Element,
    I: SpIndex,
    F: Fn(&[T]) -> U,
{
    FuseOptions::default()
        .map::<I, T, U, I, F>(f, operands)
        .map(|fused| fused.matrix)
}

/// [`map`] over sparse vectors of equal length.
///
/// # Errors
/// As [`map`].
pub fn map_vec<T, U, I, F>(f: F, operands: &[&SparseVec<T, I>]) -> Result<SparseVec<U, I>>
where
    T: Element,
    U: Element,
    I: SpIndex,
    F: Fn(&[T]) -> U,
{
    let ops: Vec<_> = operands.iter().map(|v| v.as_operand()).collect();
    map(f, &ops)?.into_sparse_vec()
}

/// [`map`] writing into `dest` (`map!`).
///
/// # Errors
/// As [`FuseOptions::map_into`].
pub fn map_into<T, U, I, F>(dest: &mut Csc<U, I>, f: F, operands: &[Operand<'_, T, I>]) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    F: Fn(&[T]) -> U,
{
    FuseOptions::default().map_into(dest, f, operands).map(|_| ())
}

/// `dest = f(dest, others...)` element-wise.
///
/// `dest`'s current storage is the first operand; the result replaces it.
/// On error `dest` keeps its original content.
///
/// # Errors
/// As [`map`].
pub fn map_in_place<T, I, F>(dest: &mut Csc<T, I>, f: F, others: &[Operand<'_, T, I>]) -> Result<()>
where
    T: Element,
    I: SpIndex,
    F: Fn(&[T]) -> T,
{
    let (nrows, ncols) = dest.shape();
    let (indptr, indices, data) = dest.take_parts();
    let own = Csc::from_parts_unchecked(nrows, ncols, indptr, indices, data);
    let mut ops = Vec::with_capacity(others.len() + 1);
    ops.push(own.as_operand());
    ops.extend_from_slice(others);
    let result = map(f, &ops);
    drop(ops);
    match result {
        Ok(m) => {
            *dest = m;
            Ok(())
        }
        Err(e) => {
            *dest = own;
            Err(e)
        }
    }
}

/// Element-wise `f` with broadcasting: an operand extent of 1 is replicated
/// along that dimension to match the result.
///
/// # Errors
/// `NoOperands`, `ShapeMismatch`, `IndexOverflow`.
pub fn broadcast<T, U, I, F>(f: F, operands: &[Operand<'_, T, I>]) -> Result<Csc<U, I>>
where
    T: Element,
    U: Element,
    I: SpIndex,
    F: Fn(&[T]) -> U,
{
    FuseOptions::default()
        .broadcast::<I, T, U, I, F>(f, operands)
        .map(|fused| fused.matrix)
}

/// [`broadcast`] over sparse vectors; lengths must be equal or 1.
///
/// # Errors
/// As [`broadcast`].
pub fn broadcast_vec<T, U, I, F>(f: F, operands: &[&SparseVec<T, I>]) -> Result<SparseVec<U, I>>
where
    T: Element,
    U: Element,
    I: SpIndex,
    F: Fn(&[T]) -> U,
{
    let ops: Vec<_> = operands.iter().map(|v| v.as_operand()).collect();
    broadcast(f, &ops)?.into_sparse_vec()
}

/// [`broadcast`] writing into `dest` (`broadcast!`).
///
/// # Errors
/// As [`FuseOptions::broadcast_into`].
pub fn broadcast_into<T, U, I, F>(
    dest: &mut Csc<U, I>,
    f: F,
    operands: &[Operand<'_, T, I>],
) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    F: Fn(&[T]) -> U,
{
    FuseOptions::default()
        .broadcast_into(dest, f, operands)
        .map(|_| ())
}
