use proptest::prelude::*;
use sparsefuse_core::{Csc, Error, SparseVec};
use sparsefuse_kernels::*;

fn mat(nrows: usize, ncols: usize, dense: &[f64]) -> Csc<f64, i64> {
    Csc::from_dense(nrows, ncols, dense).unwrap()
}

/// Dense broadcast reference over column-major buffers.
fn dense_broadcast<F: Fn(&[f64]) -> f64>(
    f: F,
    ops: &[&Csc<f64, i64>],
    shape: (usize, usize),
) -> Vec<f64> {
    let dense: Vec<Vec<f64>> = ops.iter().map(|a| a.to_dense()).collect();
    let mut out = vec![0.0; shape.0 * shape.1];
    let mut args = vec![0.0; ops.len()];
    for j in 0..shape.1 {
        for i in 0..shape.0 {
            for (k, a) in ops.iter().enumerate() {
                let ii = if a.nrows == 1 { 0 } else { i };
                let jj = if a.ncols == 1 { 0 } else { j };
                args[k] = dense[k][jj * a.nrows + ii];
            }
            out[j * shape.0 + i] = f(&args);
        }
    }
    out
}

fn assert_canonical(m: &Csc<f64, i64>) {
    assert!(m.data.iter().all(|&v| v != 0.0), "stored zero in {m:?}");
    for j in 0..m.ncols {
        let rows = &m.indices[m.col_range(j)];
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn column_plus_matrix() {
    let a = mat(2, 1, &[5.0, 0.0]);
    let b = mat(2, 3, &[1.0, 0.0, 0.0, 2.0, 3.0, 3.0]);
    let c = broadcast(|x| x[0] + x[1], &[a.as_operand(), b.as_operand()]).unwrap();
    assert_eq!(c.shape(), (2, 3));
    assert_eq!(c.to_dense(), vec![6.0, 0.0, 5.0, 2.0, 8.0, 3.0]);
    assert_eq!(
        c.to_dense(),
        dense_broadcast(|x| x[0] + x[1], &[&a, &b], (2, 3))
    );
    assert_eq!(c.nnz(), 5);
    assert_canonical(&c);
}

#[test]
fn column_against_matrix_shape_law() {
    let sizes = [0usize, 1, 2, 5];
    for &m in &sizes {
        for &n in &sizes {
            let col: Vec<f64> = (0..m)
                .map(|i| if i % 2 == 0 { (i + 1) as f64 } else { 0.0 })
                .collect();
            let full: Vec<f64> = (0..m * n).map(|k| (k % 3) as f64).collect();
            let a = mat(m, 1, &col);
            let b = mat(m, n, &full);
            for specialized in [true, false] {
                let opts = FuseOptions::new().specialized(specialized);
                let add = |x: &[f64]| x[0] + x[1];
                let c = opts
                    .broadcast::<i64, _, _, _, _>(add, &[a.as_operand(), b.as_operand()])
                    .unwrap()
                    .matrix;
                assert_eq!(c.shape(), (m, n), "m={m} n={n}");
                assert_eq!(c.to_dense(), dense_broadcast(add, &[&a, &b], (m, n)));
                assert_canonical(&c);

                let shifted = |x: &[f64]| x[0] * x[1] - 1.0;
                let d = opts
                    .broadcast::<i64, _, _, _, _>(shifted, &[a.as_operand(), b.as_operand()])
                    .unwrap()
                    .matrix;
                assert_eq!(d.nnz(), m * n);
                assert_eq!(d.to_dense(), dense_broadcast(shifted, &[&a, &b], (m, n)));
            }
        }
    }
}

#[test]
fn row_plus_matrix_sweeps_nonzero_columns() {
    let r = mat(1, 3, &[1.0, 0.0, 2.0]);
    let m = mat(3, 3, &[0.0, 4.0, 0.0, 0.0, 5.0, 0.0, -2.0, 0.0, 0.0]);
    let c = broadcast(|x| x[0] + x[1], &[r.as_operand(), m.as_operand()]).unwrap();
    assert_eq!(
        c.to_dense(),
        vec![1.0, 5.0, 1.0, 0.0, 5.0, 0.0, 0.0, 2.0, 2.0]
    );
    // column 0 and 2 are swept, column 1 follows the matrix pattern
    assert_eq!(c.indptr, vec![0, 3, 4, 6]);
    assert_canonical(&c);
}

#[test]
fn outer_product_of_column_and_row() {
    let col = mat(3, 1, &[1.0, 0.0, 2.0]);
    let row = mat(1, 4, &[10.0, 0.0, 20.0, 30.0]);
    let c = broadcast(|x| x[0] * x[1], &[col.as_operand(), row.as_operand()]).unwrap();
    assert_eq!(c.shape(), (3, 4));
    assert_eq!(
        c.to_dense(),
        dense_broadcast(|x| x[0] * x[1], &[&col, &row], (3, 4))
    );
    assert_eq!(c.nnz(), 6);

    let sum = broadcast(|x| x[0] + x[1], &[col.as_operand(), row.as_operand()]).unwrap();
    assert_eq!(
        sum.to_dense(),
        dense_broadcast(|x| x[0] + x[1], &[&col, &row], (3, 4))
    );
    assert_canonical(&sum);
}

#[test]
fn three_operand_broadcast() {
    let col = mat(2, 1, &[1.0, 0.0]);
    let row = mat(1, 3, &[0.0, 2.0, 3.0]);
    let full = mat(2, 3, &[0.0, 1.0, 0.0, 0.0, -4.0, 0.0]);
    let f = |x: &[f64]| x[0] * 100.0 + x[1] * 10.0 + x[2];
    let ops = [col.as_operand(), row.as_operand(), full.as_operand()];
    let c = broadcast(f, &ops).unwrap();
    assert_eq!(c.to_dense(), dense_broadcast(f, &[&col, &row, &full], (2, 3)));
    assert_canonical(&c);
}

#[test]
fn scalar_scales_matrix() {
    let s = mat(1, 1, &[2.0]);
    let m = mat(2, 2, &[1.0, 0.0, 0.0, 3.0]);
    let c = broadcast(|x| x[0] * x[1], &[s.as_operand(), m.as_operand()]).unwrap();
    assert_eq!(c.to_dense(), vec![2.0, 0.0, 0.0, 6.0]);
    assert_eq!(c.indices, m.indices);
}

#[test]
fn vectors_broadcast_unit_length() {
    let a: SparseVec<f64, i64> = SparseVec::from_dense(&[3.0]).unwrap();
    let b: SparseVec<f64, i64> = SparseVec::from_dense(&[1.0, 0.0, 2.0]).unwrap();
    let c = broadcast_vec(|x| x[0] + x[1], &[&a, &b]).unwrap();
    assert_eq!(c.n, 3);
    assert_eq!(c.to_dense(), vec![4.0, 3.0, 5.0]);
    let d = broadcast_vec(|x| x[0] * x[1], &[&a, &b]).unwrap();
    assert_eq!(d.indices, vec![0, 2]);
}

#[test]
fn equal_shapes_match_map() {
    let a = mat(2, 2, &[1.0, 0.0, 2.0, 3.0]);
    let b = mat(2, 2, &[0.0, 1.0, -2.0, 0.0]);
    let f = |x: &[f64]| x[0] + x[1];
    let ops = [a.as_operand(), b.as_operand()];
    assert_eq!(broadcast(f, &ops).unwrap(), map(f, &ops).unwrap());
}

#[test]
fn densifying_broadcast() {
    let a = mat(2, 1, &[5.0, 0.0]);
    let b = mat(2, 3, &[1.0, 0.0, 0.0, 2.0, 3.0, 3.0]);
    let fused = FuseOptions::new()
        .broadcast::<i64, _, _, _, _>(|x: &[f64]| x[0] + x[1] + 1.0, &[a.as_operand(), b.as_operand()])
        .unwrap();
    assert_eq!(fused.report.policy, Policy::Densifying(1.0));
    assert_eq!(fused.report.nnz, 6);
    assert_eq!(
        fused.matrix.to_dense(),
        vec![7.0, 1.0, 6.0, 3.0, 9.0, 4.0]
    );
}

#[test]
fn broadcast_capacity_is_capped() {
    let a = mat(2, 1, &[5.0, 0.0]);
    let b = mat(2, 3, &[1.0, 0.0, 0.0, 2.0, 3.0, 3.0]);
    let fused = FuseOptions::new()
        .broadcast::<i64, _, _, _, _>(|x: &[f64]| x[0] + x[1], &[a.as_operand(), b.as_operand()])
        .unwrap();
    assert_eq!(fused.report.capacity, 6);
    assert_eq!(fused.report.expansions, 0);
}

#[test]
fn incompatible_shapes() {
    let a = mat(2, 3, &[0.0; 6]);
    let b = mat(3, 1, &[0.0; 3]);
    let err = broadcast(|x| x[0] + x[1], &[a.as_operand(), b.as_operand()]).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn broadcast_into_destination_shape() {
    let col = mat(2, 1, &[1.0, 2.0]);
    let mut dest = mat(2, 3, &[0.0; 6]);
    broadcast_into(&mut dest, |x| 10.0 * x[0], &[col.as_operand()]).unwrap();
    assert_eq!(dest.to_dense(), vec![10.0, 20.0, 10.0, 20.0, 10.0, 20.0]);

    let tall = mat(3, 1, &[1.0, 2.0, 3.0]);
    let err = broadcast_into(&mut dest, |x| x[0], &[tall.as_operand()]).unwrap_err();
    assert_eq!(err, Error::shape_mismatch((2, 3), (3, 1)));
    assert_eq!(dest.nnz(), 6);
}

#[test]
fn broadcast_into_narrow_index_overflows() {
    let s = mat(1, 1, &[1.0]);
    let col = mat(300, 1, &vec![0.0; 300]);
    let mut dest: Csc<f64, u8> = Csc::empty(300, 1);
    let err = FuseOptions::new()
        .broadcast_into(&mut dest, |x: &[f64]| x[0] + x[1], &[s.as_operand(), col.as_operand()])
        .unwrap_err();
    assert_eq!(
        err,
        Error::IndexOverflow {
            value: 256,
            index_type: "u8"
        }
    );
    assert_eq!(dest, Csc::empty(300, 1));
}

/// Operand extents: full, row (1 x c), column (r x 1) or scalar.
fn extent(kind: usize, r: usize, c: usize) -> (usize, usize) {
    match kind {
        0 => (r, c),
        1 => (1, c),
        2 => (r, 1),
        _ => (1, 1),
    }
}

fn mixed_operands() -> impl Strategy<Value = (usize, usize, Vec<(usize, Vec<f64>)>)> {
    (0usize..5, 0usize..5, prop::collection::vec(0usize..4, 1..=3)).prop_flat_map(
        |(r, c, kinds)| {
            let cell = prop_oneof![3 => Just(0.0f64), 2 => (-3i32..=3).prop_map(f64::from)];
            let ops: Vec<_> = kinds
                .into_iter()
                .map(|kind| {
                    let (m, n) = extent(kind, r, c);
                    (Just(kind), prop::collection::vec(cell.clone(), m * n))
                })
                .collect();
            (Just(r), Just(c), ops)
        },
    )
}

proptest! {
    #[test]
    fn mixed_expansions_match_dense((r, c, ops) in mixed_operands()) {
        let mats: Vec<Csc<f64, i64>> = ops
            .iter()
            .map(|(kind, dense)| {
                let (m, n) = extent(*kind, r, c);
                mat(m, n, dense)
            })
            .collect();
        let refs: Vec<&Csc<f64, i64>> = mats.iter().collect();
        let views: Vec<_> = mats.iter().map(|m| m.as_operand()).collect();
        let rows = if ops.iter().any(|(k, _)| matches!(k, 0 | 2)) { r } else { 1 };
        let cols = if ops.iter().any(|(k, _)| matches!(k, 0 | 1)) { c } else { 1 };

        let weighted = |x: &[f64]| {
            x.iter()
                .enumerate()
                .map(|(k, v)| v * (k as f64 + 1.0))
                .sum::<f64>()
        };
        let shifted = |x: &[f64]| 1.0 + weighted(x);

        let mut results = Vec::new();
        for specialized in [true, false] {
            let opts = FuseOptions::new().specialized(specialized);
            let sparse = opts.broadcast::<i64, _, _, _, _>(weighted, &views).unwrap();
            prop_assert_eq!(sparse.report.policy, Policy::ZeroPreserving);
            prop_assert_eq!(sparse.matrix.shape(), (rows, cols));
            prop_assert_eq!(sparse.matrix.to_dense(), dense_broadcast(weighted, &refs, (rows, cols)));
            assert_canonical(&sparse.matrix);

            let dense = opts.broadcast::<i64, _, _, _, _>(shifted, &views).unwrap();
            prop_assert_eq!(dense.report.policy, Policy::Densifying(1.0));
            prop_assert_eq!(dense.matrix.nnz(), rows * cols);
            prop_assert_eq!(dense.matrix.to_dense(), dense_broadcast(shifted, &refs, (rows, cols)));
            results.push((sparse.matrix, dense.matrix));
        }
        prop_assert_eq!(&results[0], &results[1]);
    }
}
