//! Column-synchronized merge of equally shaped operands (`map`).
//!
//! Each output column is produced by walking the operands' stored rows of
//! that column in ascending order. At every row present in at least one
//! operand, `f` sees each operand's stored value, or zero where the operand
//! stores nothing. Rows absent from all operands are never visited: their
//! value is `f(0, ..., 0)`, which the writer already accounts for.
//!
//! The one- and two-operand loops avoid the cursor arrays of the general
//! loop; all three produce identical output.

#![allow(
    clippy::many_single_char_names,
    reason = "Merge kernels conventionally use i/j/k/p for indices"
)]

use sparsefuse_core::{Element, Operand, Result, SpIndex};

use crate::alloc::ResultWriter;

pub(crate) fn merge_scan<T, U, I, J, F>(
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
    match operands {
        [a] if specialized => merge_one(f, a, out),
        [a, b] if specialized => merge_two(f, a, b, out),
        _ => merge_many(f, operands, out),
    }
}

fn merge_one<T, U, I, J, F>(f: &F, a: &Operand<'_, T, I>, out: &mut ResultWriter<U, J>) -> Result<()>
where
    T: Element,
    U: Element,
    I: SpIndex,
    J: SpIndex,
    F: Fn(&[T]) -> U,
{
    let ncols = out.shape().1;
    for j in 0..ncols {
        out.open_column(j)?;
        for p in a.col_range(j) {
            out.emit(a.row(p), f(&[a.value(p)]))?;
        }
    }
    Ok(())
}

fn merge_two<T, U, I, J, F>(
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
    let (nrows, ncols) = out.shape();
    // exhausted cursors report one past the last row
    let sentinel = nrows;
    for j in 0..ncols {
        out.open_column(j)?;
        let (mut pa, ea) = range_bounds(a, j);
        let (mut pb, eb) = range_bounds(b, j);
        loop {
            let ia = if pa < ea { a.row(pa) } else { sentinel };
            let ib = if pb < eb { b.row(pb) } else { sentinel };
            let i = ia.min(ib);
            if i == sentinel {
                break;
            }
            let va = if ia == i {
                pa += 1;
                a.value(pa - 1)
            } else {
                T::zero()
            };
            let vb = if ib == i {
                pb += 1;
                b.value(pb - 1)
            } else {
                T::zero()
            };
            out.emit(i, f(&[va, vb]))?;
        }
    }
    Ok(())
}

fn merge_many<T, U, I, J, F>(
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
    let (nrows, ncols) = out.shape();
    let sentinel = nrows;
    let n = operands.len();
    let mut cursor = vec![0usize; n];
    let mut end = vec![0usize; n];
    let mut args = vec![T::zero(); n];
    for j in 0..ncols {
        out.open_column(j)?;
        for (k, op) in operands.iter().enumerate() {
            (cursor[k], end[k]) = range_bounds(op, j);
        }
        loop {
            let mut i = sentinel;
            for (k, op) in operands.iter().enumerate() {
                if cursor[k] < end[k] {
                    i = i.min(op.row(cursor[k]));
                }
            }
            if i == sentinel {
                break;
            }
            for (k, op) in operands.iter().enumerate() {
                args[k] = if cursor[k] < end[k] && op.row(cursor[k]) == i {
                    cursor[k] += 1;
                    op.value(cursor[k] - 1)
                } else {
                    T::zero()
                };
            }
            out.emit(i, f(&args))?;
        }
    }
    Ok(())
}

#[inline]
fn range_bounds<T, I>(op: &Operand<'_, T, I>, j: usize) -> (usize, usize) {
    let r = op.col_range(j);
    (r.start, r.end)
}
