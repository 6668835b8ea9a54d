//! Tensor product of a left-factor and a right-factor operator.

use log::debug;

use crate::backend::kron_add;
use crate::basis::{BasisArena, BasisId, Composite};
use crate::context::EngineContext;
use crate::diagonal::DiagonalBuffer;
use crate::operator::SparseOperator;
use crate::parallel::for_each_block;
use crate::quantum::Quantum;
use crate::storage::{BlockMatrix, BlockViewMut};

use super::{BraKet, NEGLIGIBLE_SCALE, assert_operand, assert_output, sign};

/// Accumulate `scale · (a ⊗ b)` into `c`.
///
/// `a` acts between the left factors of the bra and ket composites, `b`
/// between their right factors. With [`BraKet::Distinct`] the two composite
/// bases may differ, which yields transition elements.
///
/// # Panics
///
/// Panics if either basis is not composite, `c` is transposed, or an
/// operand does not match its bases.
pub fn tensor_product(
    ctx: &EngineContext,
    bases: &BasisArena,
    braket: BraKet,
    a: &SparseOperator,
    b: &SparseOperator,
    c: &mut SparseOperator,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let (bra_id, ket_id) = braket.ids();
    let bra = bases.composite(bra_id);
    let ket = bases.composite(ket_id);
    assert_output(c, bra.info, ket.info);
    assert_operand("a", a, bra.left, ket.left);
    assert_operand("b", b, bra.right, ket.right);

    let c_delta = c.delta();
    let views = c.storage_mut().split_blocks_mut();
    debug!("product {braket:?}: {} output blocks", views.len());
    for_each_block(ctx, views, |view| {
        product_block(ctx, &bra, &ket, a, b, c_delta, scale, view);
    });
}

#[allow(clippy::too_many_arguments)]
fn product_block(
    ctx: &EngineContext,
    bra: &Composite<'_>,
    ket: &Composite<'_>,
    a: &SparseOperator,
    b: &SparseOperator,
    c_delta: Quantum,
    scale: f64,
    mut view: BlockViewMut<'_>,
) {
    let target = view.block();
    let bra_total = bra.info.quantum(target.row);
    let ket_total = ket.info.quantum(target.col);
    let mut out = view.as_mat_mut();

    for &bra_raw in bra.map.collected(target.row) {
        let br = bra.map.raw_entry(bra_raw);
        let (lbra, rbra) = (bra.left.quantum(br.left), bra.right.quantum(br.right));
        for &ket_raw in ket.map.collected(target.col) {
            let kt = ket.map.raw_entry(ket_raw);
            let Some(a_block) = a.element(br.left, kt.left) else {
                continue;
            };
            let Some(b_block) = b.element(br.right, kt.right) else {
                continue;
            };
            let (lket, rket) = (ket.left.quantum(kt.left), ket.right.quantum(kt.right));

            let factor = a.scaling(&lbra, &lket)
                * ctx.ninej(
                    [lket, rket, ket_total],
                    [a.delta(), b.delta(), c_delta],
                    [lbra, rbra, bra_total],
                )
                * b.scaling(&rbra, &rket)
                * sign::product(b.is_fermion(), &lket);
            let alpha = scale * factor;
            if alpha.abs() < NEGLIGIBLE_SCALE {
                continue;
            }
            kron_add(&mut out, br.offset, kt.offset, a_block, b_block, alpha);
        }
    }
}

/// Diagonal of `scale · (a ⊗ b)` on one composite basis, accumulated into
/// `diag`.
///
/// Entries land at the raw sub-block of each pair's lowest-spin collected
/// label, `(i, j) ↦ i · n_r + j`.
///
/// # Panics
///
/// Panics if `basis` is not composite, `diag` has the wrong length, or an
/// operand does not match its factor.
pub fn tensor_product_diagonal(
    ctx: &EngineContext,
    bases: &BasisArena,
    basis: BasisId,
    a: &SparseOperator,
    b: &SparseOperator,
    diag: &mut DiagonalBuffer,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let composite = bases.composite(basis);
    assert_operand("a", a, composite.left, composite.left);
    assert_operand("b", b, composite.right, composite.right);
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
        let Some(a_block) = a.element(l, l) else {
            continue;
        };
        let ql = left.quantum(l);
        for r in 0..right.n_labels() {
            let Some(b_block) = b.element(r, r) else {
                continue;
            };
            let Some(entry) = composite.map.first_of_pair(l, r) else {
                continue;
            };
            let qr = right.quantum(r);
            let total = composite.info.quantum(entry.collected);
            let factor = scale
                * a.scaling(&ql, &ql)
                * ctx.ninej([ql, qr, total], [a.delta(), b.delta(), vacuum], [ql, qr, total])
                * b.scaling(&qr, &qr)
                * sign::product(b.is_fermion(), &ql);
            if factor.abs() < NEGLIGIBLE_SCALE {
                continue;
            }

            let (nl, nr) = (left.states(l), right.states(r));
            let start = composite.info.offset(entry.collected) + entry.offset;
            let segment = diag.segment_mut(start, nl * nr);
            for i in 0..nl {
                let ai = factor * a_block[(i, i)];
                for j in 0..nr {
                    segment[i * nr + j] += ai * b_block[(j, j)];
                }
            }
        }
    }
}
