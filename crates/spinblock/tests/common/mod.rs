//! Shared fixtures for the engine integration tests.
//!
//! Dense references are built in the factor bases and compared against the
//! engine output through the raw-to-collected layout of the composite basis.

#![allow(dead_code)]

use approx::assert_relative_eq;
use faer::{Mat, MatRef};
use rand::SeedableRng;
use rand::rngs::StdRng;
use spinblock::basis::{BasisArena, BasisId, StateInfo};
use spinblock::context::EngineContext;
use spinblock::quantum::{Quantum, SymmetryMode};
use spinblock::wavefunction::Wavefunction;

pub fn ctx(mode: SymmetryMode) -> EngineContext {
    EngineContext::builder().threads(3).mode(mode).build().unwrap()
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Projected-spin site with empty, up, down and doubly occupied sectors.
pub fn projected_site(bases: &mut BasisArena, states: [usize; 4]) -> BasisId {
    bases
        .leaf(
            vec![
                Quantum::new(0, 0, 0),
                Quantum::new(1, 1, 0),
                Quantum::new(1, -1, 0),
                Quantum::new(2, 0, 0),
            ],
            states.to_vec(),
        )
        .unwrap()
}

/// Spin-adapted block with N=0 S=0, N=1 S=1/2 and N=2 S=0 sectors.
pub fn adapted_block(bases: &mut BasisArena, states: [usize; 3]) -> BasisId {
    bases
        .leaf(
            vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0), Quantum::new(2, 0, 0)],
            states.to_vec(),
        )
        .unwrap()
}

/// For every state of composite `id`, the unblocked `(left, right)` states
/// it is built from.
pub fn composite_states(bases: &BasisArena, id: BasisId) -> Vec<(usize, usize)> {
    let composite = bases.try_composite(id).unwrap();
    let mut states = vec![(0, 0); composite.info.total_states()];
    for label in 0..composite.info.n_labels() {
        for &raw in composite.map.collected(label) {
            let entry = composite.map.raw_entry(raw);
            let nr = composite.right.states(entry.right);
            let start = composite.info.offset(label) + entry.offset;
            for il in 0..composite.left.states(entry.left) {
                for ir in 0..nr {
                    states[start + il * nr + ir] = (
                        composite.left.offset(entry.left) + il,
                        composite.right.offset(entry.right) + ir,
                    );
                }
            }
        }
    }
    states
}

/// State range of collected label `q` in basis `id`.
pub fn sector_range(bases: &BasisArena, id: BasisId, q: Quantum) -> std::ops::Range<usize> {
    let info = &bases[id];
    let label = info.find(&q).unwrap();
    info.offset(label)..info.offset(label) + info.states(label)
}

/// Label of unblocked state `index`.
pub fn label_of(info: &StateInfo, index: usize) -> Quantum {
    let (label, _) = info.block_dim().locate(index).unwrap();
    info.quantum(label)
}

/// Dense matrix whose `(i, j)` entry is `f(left_i, right_i, left_j, right_j)`
/// over the states of composite `id`.
pub fn dense_on_composite(
    bases: &BasisArena,
    id: BasisId,
    f: impl Fn(usize, usize, usize, usize) -> f64,
) -> Mat<f64> {
    let states = composite_states(bases, id);
    Mat::from_fn(states.len(), states.len(), |i, j| {
        let ((li, ri), (lj, rj)) = (states[i], states[j]);
        f(li, ri, lj, rj)
    })
}

/// Wavefunction blocks placed in a `left × right` dense matrix.
pub fn wavefunction_dense(psi: &Wavefunction, left: &StateInfo, right: &StateInfo) -> Mat<f64> {
    let mut dense = Mat::zeros(left.total_states(), right.total_states());
    for block in psi.blocks() {
        let src = psi.block(block.row, block.col).unwrap();
        let (r0, c0) = (left.offset(block.row), right.offset(block.col));
        for j in 0..src.ncols() {
            for i in 0..src.nrows() {
                dense[(r0 + i, c0 + j)] = src[(i, j)];
            }
        }
    }
    dense
}

pub fn assert_mat_eq(actual: MatRef<'_, f64>, expected: MatRef<'_, f64>, epsilon: f64) {
    assert_eq!(
        (actual.nrows(), actual.ncols()),
        (expected.nrows(), expected.ncols()),
        "shape mismatch"
    );
    for j in 0..actual.ncols() {
        for i in 0..actual.nrows() {
            assert_relative_eq!(actual[(i, j)], expected[(i, j)], epsilon = epsilon);
        }
    }
}
