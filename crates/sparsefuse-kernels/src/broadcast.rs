//! Column-synchronized scan with shape expansion (`broadcast`).
//!
//! An operand with one column is read at column 0 for every output column
//! (horizontal expansion). An operand with one row, in a result with more
//! than one row, holds at most one stored entry per column; that value is
//! replicated down the whole output column and acts as the operand's
//! per-column default instead of a cursor (vertical expansion).
//!
//! Per output column `f` is evaluated once on the defaults. If that value is
//! the fill value only rows stored by some cursor operand are visited;
//! otherwise every row is written, using the column default where no cursor
//! matches.
//!
//! When no operand expands at all, the call is handed to the merge-scan
//! kernel: several shortcuts below assume at least one expanding operand.

#![allow(
    clippy::many_single_char_names,
    reason = "Scan kernels conventionally use i/j/k/p for indices"
)]

use sparsefuse_core::{Element, Operand, Result, SpIndex};
use tracing::debug;

use crate::alloc::ResultWriter;
use crate::merge::merge_scan;

/// Per-column state of one operand.
#[derive(Clone, Copy)]
struct Lane<T> {
    pos: usize,
    end: usize,
    default: T,
}

impl<T: Element> Lane<T> {
    fn idle() -> Self {
        Self {
            pos: 0,
            end: 0,
            default: T::zero(),
        }
    }

    fn open<I: SpIndex>(op: &Operand<'_, T, I>, j: usize, shape: (usize, usize)) -> Self {
        let nrows = shape.0;
        let col = if op.ncols() == 1 { 0 } else { j };
        let range = op.col_range(col);
        if op.nrows() == 1 && nrows != 1 {
            let default = if range.is_empty() {
                T::zero()
            } else {
                op.value(range.start)
            };
            Self {
                pos: range.end,
                end: range.end,
                default,
            }
        } else {
            Self {
                pos: range.start,
                end: range.end,
                default: T::zero(),
            }
        }
    }

    /// Row under the cursor, `sentinel` once exhausted.
    #[inline]
    fn row<I: SpIndex>(&self, op: &Operand<'_, T, I>, sentinel: usize) -> usize {
        if self.pos < self.end {
            op.row(self.pos)
        } else {
            sentinel
        }
    }

    /// Operand value at row `i`, advancing the cursor on a match.
    #[inline]
    fn take<I: SpIndex>(&mut self, op: &Operand<'_, T, I>, i: usize) -> (T, bool) {
        if self.pos < self.end && op.row(self.pos) == i {
            self.pos += 1;
            (op.value(self.pos - 1), true)
        } else {
            (self.default, false)
        }
    }
}

pub(crate) fn broadcast_scan<T, U, I, J, F>(
    f: &F,
    operands: &[Operand<'_, T, I>],
    out: &mut ResultWriter<U, J>,
    specialized: bool,
) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    J: SpIndex,
    F: Fn(&[T]) -> U,
{
    let shape = out.shape();
    if operands.iter().all(|op| op.shape() == shape) {
        debug!(operands = operands.len(), "no operand expands; using merge scan");
        return merge_scan(f, operands, out, specialized);
    }
    match operands {
        [a] if specialized => broadcast_one(f, a, out),
        [a, b] if specialized => broadcast_two(f, a, b, out),
        _ => broadcast_many(f, operands, out),
    }
}

fn broadcast_one<T, U, I, J, F>(
    f: &F,
    a: &Operand<'_, T, I>,
    out: &mut ResultWriter<U, J>,
) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    J: SpIndex,
    F: Fn(&[T]) -> U,
{
    let shape = out.shape();
    let sentinel = shape.0;
    for j in 0..shape.1 {
        out.open_column(j)?;
        let mut la = Lane::open(a, j, shape);
        let col_default = f(&[la.default]);
        if out.is_fill(&col_default) {
            loop {
                let i = la.row(a, sentinel);
                if i == sentinel {
                    break;
                }
                let (va, _) = la.take(a, i);
                out.emit(i, f(&[va]))?;
            }
        } else {
            for i in 0..shape.0 {
                match la.take(a, i) {
                    (va, true) => out.emit(i, f(&[va]))?,
                    (_, false) => out.emit(i, col_default)?,
                }
            }
        }
    }
    Ok(())
}

fn broadcast_two<T, U, I, J, F>(
    f: &F,
    a: &Operand<'_, T, I>,
    b: &Operand<'_, T, I>,
    out: &mut ResultWriter<U, J>,
) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    J: SpIndex,
    F: Fn(&[T]) -> U,
{
    let shape = out.shape();
    let sentinel = shape.0;
    for j in 0..shape.1 {
        out.open_column(j)?;
        let mut la = Lane::open(a, j, shape);
        let mut lb = Lane::open(b, j, shape);
        let col_default = f(&[la.default, lb.default]);
        if out.is_fill(&col_default) {
            loop {
                let i = la.row(a, sentinel).min(lb.row(b, sentinel));
                if i == sentinel {
                    break;
                }
                let (va, _) = la.take(a, i);
                let (vb, _) = lb.take(b, i);
                out.emit(i, f(&[va, vb]))?;
            }
        } else {
            for i in 0..shape.0 {
                let (va, hit_a) = la.take(a, i);
                let (vb, hit_b) = lb.take(b, i);
                if hit_a || hit_b {
                    out.emit(i, f(&[va, vb]))?;
                } else {
                    out.emit(i, col_default)?;
                }
            }
        }
    }
    Ok(())
}

fn broadcast_many<T, U, I, J, F>(
    f: &F,
    operands: &[Operand<'_, T, I>],
    out: &mut ResultWriter<U, J>,
) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    J: SpIndex,
    F: Fn(&[T]) -> U,
{
    let shape = out.shape();
    let sentinel = shape.0;
    let n = operands.len();
    let mut lanes = vec![Lane::<T>::idle(); n];
    let mut args = vec![T::zero(); n];
    for j in 0..shape.1 {
        out.open_column(j)?;
        for (k, op) in operands.iter().enumerate() {
            lanes[k] = Lane::open(op, j, shape);
            args[k] = lanes[k].default;
        }
        let col_default = f(&args);
        if out.is_fill(&col_default) {
            loop {
                let i = next_row(&lanes, operands, sentinel);
                if i == sentinel {
                    break;
                }
                gather(&mut lanes, operands, i, &mut args);
                out.emit(i, f(&args))?;
            }
        } else {
            for i in 0..shape.0 {
                if gather(&mut lanes, operands, i, &mut args) {
                    out.emit(i, f(&args))?;
                } else {
                    out.emit(i, col_default)?;
                }
            }
        }
    }
    Ok(())
}

fn next_row<T: Element, I: SpIndex>(
    lanes: &[Lane<T>],
    operands: &[Operand<'_, T, I>],
    sentinel: usize,
) -> usize {
    lanes
        .iter()
        .zip(operands)
        .fold(sentinel, |i, (lane, op)| i.min(lane.row(op, sentinel)))
}

/// Fills `args` for row `i`; true if any cursor operand stores row `i`.
fn gather<T: Element, I: SpIndex>(
    lanes: &mut [Lane<T>],
    operands: &[Operand<'_, T, I>],
    i: usize,
    args: &mut [T],
) -> bool {
    let mut hit = false;
    for ((lane, op), arg) in lanes.iter_mut().zip(operands).zip(args.iter_mut()) {
        let (v, matched) = lane.take(op, i);
        *arg = v;
        hit |= matched;
    }
    hit
}
