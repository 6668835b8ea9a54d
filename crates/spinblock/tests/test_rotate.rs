//! Basis rotation and truncation.

mod common;

use approx::assert_relative_eq;
use common::{adapted_block, assert_mat_eq, ctx, rng};
use faer::Mat;
use spinblock::basis::BasisArena;
use spinblock::ops::{Rotation, RotationSide, tensor_rotate, tensor_rotate_into};
use spinblock::{Quantum, SparseOperator, SymmetryMode};

const MODE: SymmetryMode = SymmetryMode::SpinAdapted;

fn givens(theta: f64) -> Mat<f64> {
    let (s, c) = theta.sin_cos();
    Mat::from_fn(2, 2, |i, j| match (i, j) {
        (0, 0) | (1, 1) => c,
        (0, 1) => -s,
        _ => s,
    })
}

fn transposed(m: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(m.ncols(), m.nrows(), |i, j| m[(j, i)])
}

#[test]
fn test_round_trip_restores_retained_blocks() {
    let ctx = ctx(MODE);
    let mut bases = BasisArena::new();
    let old = adapted_block(&mut bases, [2, 3, 2]);
    let quanta = bases[old].quanta().to_vec();
    let new = bases.leaf(vec![quanta[0], quanta[2]], vec![2, 2]).unwrap();
    let kept = bases.leaf(vec![quanta[0], quanta[2]], vec![2, 2]).unwrap();

    let forward = [givens(0.3), Mat::zeros(3, 0), givens(-1.1)];
    let backward = [transposed(&forward[0]), transposed(&forward[2])];

    let mut a = SparseOperator::zeros(Quantum::vacuum(), &bases[old], &bases[old], MODE);
    a.randomize_with_rng(&mut rng(71));

    let rotated = tensor_rotate(
        &ctx,
        &bases,
        &a,
        &Rotation::Symmetric(RotationSide {
            old,
            new,
            transforms: &forward,
        }),
        1.0,
    );
    assert_eq!(rotated.blocks().len(), 2);

    let restored = tensor_rotate(
        &ctx,
        &bases,
        &rotated,
        &Rotation::Symmetric(RotationSide {
            old: new,
            new: kept,
            transforms: &backward,
        }),
        1.0,
    );
    for (new_label, old_label) in [(0, 0), (1, 2)] {
        let got = restored.element(new_label, new_label).unwrap();
        let want = a.element(old_label, old_label).unwrap();
        assert_mat_eq(got, want, 1e-12);
    }
}

#[test]
fn test_asymmetric_rotation_of_shifted_operator() {
    let ctx = ctx(MODE);
    let mut bases = BasisArena::new();
    let old = adapted_block(&mut bases, [2, 2, 1]);
    let quanta = bases[old].quanta().to_vec();
    let bra_new = bases.leaf(quanta.clone(), vec![1, 2, 1]).unwrap();
    let ket_new = bases.leaf(vec![quanta[0], quanta[1]], vec![2, 1]).unwrap();

    let bra_u = [Mat::from_fn(2, 1, |i, _| 1.0 + i as f64), givens(0.7), Mat::from_fn(1, 1, |_, _| 2.0)];
    let ket_u = [givens(0.2), Mat::from_fn(2, 1, |i, _| if i == 0 { 1.0 } else { -1.0 }), Mat::zeros(1, 0)];

    let mut a = SparseOperator::zeros(Quantum::new(1, 1, 0), &bases[old], &bases[old], MODE);
    a.randomize_with_rng(&mut rng(72));
    let rotation = Rotation::Asymmetric {
        bra: RotationSide {
            old,
            new: bra_new,
            transforms: &bra_u,
        },
        ket: RotationSide {
            old,
            new: ket_new,
            transforms: &ket_u,
        },
    };
    let rotated = tensor_rotate(&ctx, &bases, &a, &rotation, 2.0);

    // both blocks keep their label positions
    assert_eq!(rotated.blocks().len(), 2);
    for (row, col) in [(1, 0), (2, 1)] {
        let src = a.element(row, col).unwrap();
        let (u, v) = (&bra_u[row], &ket_u[col]);
        let expected = Mat::from_fn(u.ncols(), v.ncols(), |i, j| {
            let mut sum = 0.0;
            for p in 0..src.nrows() {
                for q in 0..src.ncols() {
                    sum += u[(p, i)] * src[(p, q)] * v[(q, j)];
                }
            }
            2.0 * sum
        });
        assert_mat_eq(rotated.element(row, col).unwrap(), expected.as_ref(), 1e-12);
    }
}

#[test]
fn test_rotate_into_skips_missing_source_blocks() {
    let ctx = ctx(MODE);
    let mut bases = BasisArena::new();
    let old = adapted_block(&mut bases, [1, 1, 1]);
    let new = adapted_block(&mut bases, [1, 1, 1]);
    let unit = [Mat::from_fn(1, 1, |_, _| 1.0), Mat::from_fn(1, 1, |_, _| 1.0), Mat::from_fn(1, 1, |_, _| 1.0)];
    let rotation = Rotation::Symmetric(RotationSide {
        old,
        new,
        transforms: &unit,
    });

    let delta = Quantum::new(1, 1, 0);
    let mut a = SparseOperator::with_blocks(delta, &bases[old], &bases[old], &[(1, 0)], MODE).unwrap();
    a.set_element(1, 0, Mat::from_fn(1, 1, |_, _| 3.0).as_ref()).unwrap();
    let mut c = SparseOperator::zeros(delta, &bases[new], &bases[new], MODE);
    c.set_element(2, 1, Mat::from_fn(1, 1, |_, _| 5.0).as_ref()).unwrap();

    tensor_rotate_into(&ctx, &bases, &a, &rotation, &mut c, 1.0);
    assert_relative_eq!(c.element(1, 0).unwrap()[(0, 0)], 3.0, epsilon = 1e-14);
    assert_eq!(c.element(2, 1).unwrap()[(0, 0)], 5.0);
}

#[test]
#[should_panic(expected = "rotation keeps")]
fn test_label_count_mismatch_panics() {
    let ctx = ctx(MODE);
    let mut bases = BasisArena::new();
    let old = adapted_block(&mut bases, [1, 1, 1]);
    let new = adapted_block(&mut bases, [1, 1, 1]);
    let transforms = [Mat::from_fn(1, 1, |_, _| 1.0), Mat::zeros(1, 0), Mat::from_fn(1, 1, |_, _| 1.0)];
    let a = SparseOperator::zeros(Quantum::vacuum(), &bases[old], &bases[old], MODE);
    tensor_rotate(
        &ctx,
        &bases,
        &a,
        &Rotation::Symmetric(RotationSide {
            old,
            new,
            transforms: &transforms,
        }),
        1.0,
    );
}
