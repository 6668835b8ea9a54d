//! Dense recombination of two operators acting on the same basis.
//!
//! `c += scale · factor · (a · b)`, where the product of the two spin
//! tensors is recoupled to the net rank of `c`. In spin-adapted mode the
//! factor for intermediate label `j_m` is
//!
//! ```text
//! W(j_c', k_b, j_c, k_a; j_m, k_c) · sqrt((k_c + 1)(j_m + 1)) · (-1)^((k_a + k_b - k_c)/2)
//! ```
//!
//! times both operators' scalings; in projected-spin mode only the scalings
//! remain.

use faer::Accum;
use log::debug;

use crate::backend::gemm;
use crate::basis::StateInfo;
use crate::context::EngineContext;
use crate::coupling::phase;
use crate::operator::SparseOperator;
use crate::parallel::for_each_block;
use crate::quantum::{Quantum, SymmetryMode};
use crate::storage::{BlockMatrix, BlockViewMut};

use super::{NEGLIGIBLE_SCALE, assert_operand, assert_output};

/// Accumulate the recoupled product `a · b` into `c`, all on `basis`.
///
/// # Panics
///
/// Panics if `c` is transposed or an operand does not match `basis`.
pub fn product(
    ctx: &EngineContext,
    basis: &StateInfo,
    a: &SparseOperator,
    b: &SparseOperator,
    c: &mut SparseOperator,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    assert_output(c, basis, basis);
    assert_operand("a", a, basis, basis);
    assert_operand("b", b, basis, basis);

    let c_delta = c.delta();
    let views = c.storage_mut().split_blocks_mut();
    debug!(
        "recombine k_a={} k_b={} -> k_c={}: {} output blocks",
        a.spin(),
        b.spin(),
        c_delta.spin,
        views.len()
    );
    for_each_block(ctx, views, |view| {
        recombine_block(ctx, basis, a, b, c_delta, scale, view);
    });
}

fn recoupling(ctx: &EngineContext, a: &SparseOperator, b: &SparseOperator, kc: i32, labels: [Quantum; 3]) -> f64 {
    let [bra, mid, ket] = labels;
    let scalings = a.scaling(&bra, &mid) * b.scaling(&mid, &ket);
    match ctx.mode() {
        SymmetryMode::SpinAdapted => {
            let (ka, kb) = (a.spin(), b.spin());
            let w = ctx
                .coupling()
                .racah([ket.spin, kb, bra.spin, ka, mid.spin, kc]);
            scalings
                * w
                * (f64::from(kc + 1) * f64::from(mid.spin + 1)).sqrt()
                * phase((ka + kb - kc) / 2)
        }
        SymmetryMode::ProjectedSpin => scalings,
    }
}

fn recombine_block(
    ctx: &EngineContext,
    basis: &StateInfo,
    a: &SparseOperator,
    b: &SparseOperator,
    c_delta: Quantum,
    scale: f64,
    mut view: BlockViewMut<'_>,
) {
    let target = view.block();
    let (row, col) = (target.row, target.col);
    let mut out = view.as_mat_mut();
    for &mid in a.active_cols(row) {
        let Some(b_block) = b.element(mid, col) else {
            continue;
        };
        let Some(a_block) = a.element(row, mid) else {
            continue;
        };
        let labels = [basis.quantum(row), basis.quantum(mid), basis.quantum(col)];
        let alpha = scale * recoupling(ctx, a, b, c_delta.spin, labels);
        if alpha.abs() < NEGLIGIBLE_SCALE {
            continue;
        }
        gemm(out.as_mut(), Accum::Add, a_block, b_block, alpha);
    }
}
