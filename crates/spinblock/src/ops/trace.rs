//! Trace contraction of a factor operator into a composite basis.
//!
//! Given a composite basis `L ⊗ R` and an operator `a` on one factor, these
//! kernels accumulate `a ⊗ I` or `I ⊗ a` expressed in the collected
//! composite labels. Each output block is decomposed into the raw
//! `(l, r)` pairs of its bra and ket labels; a pair contributes when `a` has
//! the block and the traced factor's label agrees on both sides.

use log::debug;

use crate::backend::{IdentityFactor, kron_identity_add};
use crate::basis::{BasisArena, BasisId, Composite, StateInfo};
use crate::context::EngineContext;
use crate::diagonal::DiagonalBuffer;
use crate::operator::SparseOperator;
use crate::parallel::for_each_block;
use crate::quantum::Quantum;
use crate::storage::{BlockMatrix, BlockViewMut};

use super::{NEGLIGIBLE_SCALE, assert_operand, assert_output, sign};

/// Which factor of the composite basis is traced over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceSide {
    /// `a ⊗ I`: `a` acts on the left factor.
    Right,
    /// `I ⊗ a`: `a` acts on the right factor.
    Left,
}

impl TraceSide {
    fn acted_on<'a>(self, composite: &Composite<'a>) -> &'a StateInfo {
        match self {
            TraceSide::Right => composite.left,
            TraceSide::Left => composite.right,
        }
    }
}

/// Accumulate `scale · (a ⊗ I)` or `scale · (I ⊗ a)` into `c`.
///
/// `c` lives on the composite basis `basis` (both bra and ket) and must use
/// the normal convention. The 9j rows are `(ket_l, ket_r, ket_total;
/// k_l, k_r, k_c; bra_l, bra_r, bra_total)` with the traced slot set to
/// spin 0. Tracing the left factor adds a `-1` whenever a fermionic `a`
/// passes a fermionic left label.
///
/// # Panics
///
/// Panics if `basis` is not composite, `c` is transposed, or the operand
/// label counts disagree with the bases.
pub fn tensor_trace(
    ctx: &EngineContext,
    bases: &BasisArena,
    basis: BasisId,
    a: &SparseOperator,
    c: &mut SparseOperator,
    side: TraceSide,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let composite = bases.composite(basis);
    assert_output(c, composite.info, composite.info);
    let acted = side.acted_on(&composite);
    assert_operand("a", a, acted, acted);

    let c_delta = c.delta();
    let views = c.storage_mut().split_blocks_mut();
    debug!("trace {side:?}: {} output blocks", views.len());
    for_each_block(ctx, views, |view| {
        trace_block(ctx, &composite, a, c_delta, side, scale, view);
    });
}

fn trace_block(
    ctx: &EngineContext,
    composite: &Composite<'_>,
    a: &SparseOperator,
    c_delta: Quantum,
    side: TraceSide,
    scale: f64,
    mut view: BlockViewMut<'_>,
) {
    let target = view.block();
    let map = composite.map;
    let bra_total = composite.info.quantum(target.row);
    let ket_total = composite.info.quantum(target.col);
    let vacuum = Quantum::vacuum();
    let mut out = view.as_mat_mut();

    for &bra_raw in map.collected(target.row) {
        let bra = map.raw_entry(bra_raw);
        let lbra = composite.left.quantum(bra.left);
        let rbra = composite.right.quantum(bra.right);
        for &ket_raw in map.collected(target.col) {
            let ket = map.raw_entry(ket_raw);
            let lket = composite.left.quantum(ket.left);
            let rket = composite.right.quantum(ket.right);

            let (block, factor, n, identity) = match side {
                TraceSide::Right => {
                    if bra.right != ket.right {
                        continue;
                    }
                    let Some(block) = a.element(bra.left, ket.left) else {
                        continue;
                    };
                    let factor = ctx.ninej(
                        [lket, rket, ket_total],
                        [a.delta(), vacuum, c_delta],
                        [lbra, rbra, bra_total],
                    ) * a.scaling(&lbra, &lket);
                    let n = composite.right.states(bra.right);
                    (block, factor, n, IdentityFactor::Right)
                }
                TraceSide::Left => {
                    if bra.left != ket.left {
                        continue;
                    }
                    let Some(block) = a.element(bra.right, ket.right) else {
                        continue;
                    };
                    let factor = ctx.ninej(
                        [lket, rket, ket_total],
                        [vacuum, a.delta(), c_delta],
                        [lbra, rbra, bra_total],
                    ) * a.scaling(&rbra, &rket)
                        * sign::trace_left(a.is_fermion(), &lket);
                    let n = composite.left.states(bra.left);
                    (block, factor, n, IdentityFactor::Left)
                }
            };

            let alpha = scale * factor;
            if alpha.abs() < NEGLIGIBLE_SCALE {
                continue;
            }
            kron_identity_add(&mut out, bra.offset, ket.offset, block, n, identity, alpha);
        }
    }
}

/// Diagonal of `scale · (a ⊗ I)` or `scale · (I ⊗ a)`, accumulated into
/// `diag`.
///
/// `a` must be diagonal-compatible (a spin-0 shift). For each factor pair
/// `(l, r)` only the lowest-spin collected label of the pair is written, at
/// the offset of the pair's raw sub-block; inside it entry `(i, j)` sits at
/// `i · n_r + j`.
///
/// # Panics
///
/// Panics if `basis` is not composite, `diag` is not sized to the composite
/// basis, or `a` does not match the factor it acts on.
pub fn tensor_trace_diagonal(
    ctx: &EngineContext,
    bases: &BasisArena,
    basis: BasisId,
    a: &SparseOperator,
    diag: &mut DiagonalBuffer,
    side: TraceSide,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let composite = bases.composite(basis);
    let acted = side.acted_on(&composite);
    assert_operand("a", a, acted, acted);
    assert_eq!(
        diag.len(),
        composite.info.total_states(),
        "diagonal buffer has {} entries but the basis has {} states",
        diag.len(),
        composite.info.total_states()
    );

    let (left, right) = (composite.left, composite.right);
    let vacuum = Quantum::vacuum();
    for l in 0..left.n_labels() {
        for r in 0..right.n_labels() {
            let Some(entry) = composite.map.first_of_pair(l, r) else {
                continue;
            };
            let total = composite.info.quantum(entry.collected);
            let (ql, qr) = (left.quantum(l), right.quantum(r));
            let (nl, nr) = (left.states(l), right.states(r));
            let start = composite.info.offset(entry.collected) + entry.offset;

            match side {
                TraceSide::Right => {
                    let Some(block) = a.element(l, l) else {
                        continue;
                    };
                    let factor = scale
                        * ctx.ninej([ql, qr, total], [a.delta(), vacuum, vacuum], [ql, qr, total])
                        * a.scaling(&ql, &ql);
                    let segment = diag.segment_mut(start, nl * nr);
                    for i in 0..nl {
                        let value = factor * block[(i, i)];
                        for j in 0..nr {
                            segment[i * nr + j] += value;
                        }
                    }
                }
                TraceSide::Left => {
                    let Some(block) = a.element(r, r) else {
                        continue;
                    };
                    let factor = scale
                        * ctx.ninej([ql, qr, total], [vacuum, a.delta(), vacuum], [ql, qr, total])
                        * a.scaling(&qr, &qr)
                        * sign::trace_left(a.is_fermion(), &ql);
                    let segment = diag.segment_mut(start, nl * nr);
                    for i in 0..nl {
                        for j in 0..nr {
                            segment[i * nr + j] += factor * block[(j, j)];
                        }
                    }
                }
            }
        }
    }
}
