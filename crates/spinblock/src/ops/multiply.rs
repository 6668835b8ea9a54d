//! Operator-on-wavefunction products without forming the operator.
//!
//! These are the inner kernels of the eigensolver's matrix-vector product.
//! `v += (a ⊗ b) · c` is evaluated block by block as `a · c · bᵀ`, with the
//! intermediate `c · bᵀ` held in a per-lane scratch buffer claimed from
//! the context's arena for the duration of the call.

use faer::{Accum, MatMut};
use log::debug;

use crate::backend::{gemm, mat_mut};
use crate::basis::{BasisArena, BasisId, Composite, StateInfo};
use crate::context::EngineContext;
use crate::operator::SparseOperator;
use crate::parallel::{ScratchPool, for_each_block, for_each_block_with_scratch};
use crate::quantum::Quantum;
use crate::storage::BlockMatrix;
use crate::wavefunction::Wavefunction;

use super::trace::TraceSide;
use super::{BraKet, NEGLIGIBLE_SCALE, assert_operand, assert_wavefunction, sign};

fn largest_states(info: &StateInfo) -> usize {
    info.block_dim().sizes().iter().copied().max().unwrap_or(0)
}

/// Accumulate `scale · (a ⊗ b) · c` into `v`.
///
/// `op_q` is the net label of `a ⊗ b`. `c` lives on the factors of the ket
/// composite and `v` on the factors of the bra composite; `a` maps the left
/// factors and `b` the right factors.
///
/// # Panics
///
/// Panics if a basis is not composite or an operand or wavefunction does not
/// match its bases.
#[allow(clippy::too_many_arguments)]
pub fn tensor_product_multiply(
    ctx: &EngineContext,
    bases: &BasisArena,
    braket: BraKet,
    a: &SparseOperator,
    b: &SparseOperator,
    op_q: Quantum,
    c: &Wavefunction,
    v: &mut Wavefunction,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let (bra_id, ket_id) = braket.ids();
    let bra = bases.composite(bra_id);
    let ket = bases.composite(ket_id);
    assert_operand("a", a, bra.left, ket.left);
    assert_operand("b", b, bra.right, ket.right);
    assert_wavefunction("c", c, ket.left, ket.right);
    assert_wavefunction("v", v, bra.left, bra.right);

    let maxlen = largest_states(ket.left) * largest_states(bra.right);
    let mut scratch = ScratchPool::claim(ctx.arena(), ctx.threads(), maxlen);
    let (c_target, v_target) = (c.target(), v.target());
    let views = v.storage_mut().split_blocks_mut();
    debug!(
        "product multiply {braket:?}: {} output blocks, scratch {maxlen} per worker",
        views.len()
    );

    for_each_block_with_scratch(ctx, views, &mut scratch, |mut view, buffer| {
        let target = view.block();
        let (lq, rq) = (target.row, target.col);
        let lbra = bra.left.quantum(lq);
        let rbra = bra.right.quantum(rq);
        let mut out = view.as_mat_mut();

        for &rqp in b.active_cols(rq) {
            let Some(b_block) = b.element(rq, rqp) else {
                continue;
            };
            let rket = ket.right.quantum(rqp);
            for &lqp in c.active_rows(rqp) {
                let Some(a_block) = a.element(lq, lqp) else {
                    continue;
                };
                let Some(c_block) = c.block(lqp, rqp) else {
                    continue;
                };
                let lket = ket.left.quantum(lqp);
                let factor = scale
                    * ctx.ninej(
                        [lket, rket, c_target],
                        [a.delta(), b.delta(), op_q],
                        [lbra, rbra, v_target],
                    )
                    * a.scaling(&lbra, &lket)
                    * b.scaling(&rbra, &rket)
                    * sign::multiply(b.is_fermion(), &lket);
                if factor.abs() < NEGLIGIBLE_SCALE {
                    continue;
                }

                let (nl, nr) = (c_block.nrows(), b_block.nrows());
                let mut m = mat_mut(&mut buffer[..nl * nr], nl, nr);
                gemm(m.as_mut(), Accum::Replace, c_block, b_block.transpose(), 1.0);
                gemm(out.as_mut(), Accum::Add, a_block, m.as_ref(), factor);
            }
        }
    });
}

/// Accumulate `scale · (a ⊗ I) · c` or `scale · (I ⊗ a) · c` into `v`.
///
/// Bra and ket share the composite `basis`. `c` and `v` may have different
/// targets when `a` carries a shift.
///
/// # Panics
///
/// Panics if `basis` is not composite or an operand or wavefunction does not
/// match it.
#[allow(clippy::too_many_arguments)]
pub fn tensor_trace_multiply(
    ctx: &EngineContext,
    bases: &BasisArena,
    basis: BasisId,
    a: &SparseOperator,
    c: &Wavefunction,
    v: &mut Wavefunction,
    side: TraceSide,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let composite = bases.composite(basis);
    match side {
        TraceSide::Right => assert_operand("a", a, composite.left, composite.left),
        TraceSide::Left => assert_operand("a", a, composite.right, composite.right),
    }
    assert_wavefunction("c", c, composite.left, composite.right);
    assert_wavefunction("v", v, composite.left, composite.right);

    let (c_target, v_target) = (c.target(), v.target());
    let views = v.storage_mut().split_blocks_mut();
    debug!("trace multiply {side:?}: {} output blocks", views.len());
    for_each_block(ctx, views, |mut view| {
        let target = view.block();
        let mut out = view.as_mat_mut();
        let targets = [c_target, v_target];
        let (lq, rq) = (target.row, target.col);
        match side {
            TraceSide::Right => trace_right_block(ctx, &composite, a, c, targets, lq, rq, scale, &mut out),
            TraceSide::Left => trace_left_block(ctx, &composite, a, c, targets, lq, rq, scale, &mut out),
        }
    });
}

#[allow(clippy::too_many_arguments)]
fn trace_right_block(
    ctx: &EngineContext,
    composite: &Composite<'_>,
    a: &SparseOperator,
    c: &Wavefunction,
    [c_target, v_target]: [Quantum; 2],
    lq: usize,
    rq: usize,
    scale: f64,
    out: &mut MatMut<'_, f64>,
) {
    let r = composite.right.quantum(rq);
    let lbra = composite.left.quantum(lq);
    let vacuum = Quantum::vacuum();
    for &lqp in a.active_cols(lq) {
        let Some(c_block) = c.block(lqp, rq) else {
            continue;
        };
        let Some(a_block) = a.element(lq, lqp) else {
            continue;
        };
        let lket = composite.left.quantum(lqp);
        let factor = scale
            * ctx.ninej(
                [lket, r, c_target],
                [a.delta(), vacuum, a.delta()],
                [lbra, r, v_target],
            )
            * a.scaling(&lbra, &lket);
        if factor.abs() < NEGLIGIBLE_SCALE {
            continue;
        }
        gemm(out.as_mut(), Accum::Add, a_block, c_block, factor);
    }
}

#[allow(clippy::too_many_arguments)]
fn trace_left_block(
    ctx: &EngineContext,
    composite: &Composite<'_>,
    a: &SparseOperator,
    c: &Wavefunction,
    [c_target, v_target]: [Quantum; 2],
    lq: usize,
    rq: usize,
    scale: f64,
    out: &mut MatMut<'_, f64>,
) {
    let l = composite.left.quantum(lq);
    let rbra = composite.right.quantum(rq);
    let vacuum = Quantum::vacuum();
    let parity = sign::trace_multiply_left(a.is_fermion(), &l);
    for &rqp in a.active_cols(rq) {
        let Some(c_block) = c.block(lq, rqp) else {
            continue;
        };
        let Some(a_block) = a.element(rq, rqp) else {
            continue;
        };
        let rket = composite.right.quantum(rqp);
        let factor = scale
            * parity
            * ctx.ninej(
                [l, rket, c_target],
                [vacuum, a.delta(), a.delta()],
                [l, rbra, v_target],
            )
            * a.scaling(&rbra, &rket);
        if factor.abs() < NEGLIGIBLE_SCALE {
            continue;
        }
        gemm(out.as_mut(), Accum::Add, c_block, a_block.transpose(), factor);
    }
}
