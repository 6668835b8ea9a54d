//! Elementwise utilities: scale, add, dot and precondition.
//!
//! The generic functions work on anything implementing [`BlockMatrix`], so
//! operators and wavefunctions share them.

use crate::basis::StateInfo;
use crate::context::EngineContext;
use crate::coupling::standalone_scaling;
use crate::diagonal::DiagonalBuffer;
use crate::operator::{Conjugacy, SparseOperator};
use crate::parallel::for_each_block;
use crate::storage::BlockMatrix;

use super::{NEGLIGIBLE_SCALE, PRECONDITION_TOLERANCE, assert_operand, assert_output};

fn assert_normal<M: BlockMatrix>(name: &str, m: &M) {
    assert_eq!(
        m.conjugacy(),
        Conjugacy::Normal,
        "{name} must use the normal convention"
    );
}

/// Multiply every stored element of `a` by `s`.
pub fn tensor_scale<M: BlockMatrix>(ctx: &EngineContext, s: f64, a: &mut M) {
    let views = a.storage_mut().split_blocks_mut();
    for_each_block(ctx, views, |mut view| {
        for x in view.as_mut_slice() {
            *x *= s;
        }
    });
}

/// `c += s · a` over the blocks present in both.
///
/// `bra` and `ket` are the bases of `c`. When `a` is transposed each block
/// is weighted by the stand-alone scaling of its labels.
///
/// # Panics
///
/// Panics if `c` is transposed or either operator does not match the bases.
pub fn tensor_scale_add(
    ctx: &EngineContext,
    s: f64,
    a: &SparseOperator,
    c: &mut SparseOperator,
    bra: &StateInfo,
    ket: &StateInfo,
) {
    if s.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    assert_output(c, bra, ket);
    assert_operand("a", a, bra, ket);

    let views = c.storage_mut().split_blocks_mut();
    for_each_block(ctx, views, |mut view| {
        let target = view.block();
        let Some(src) = a.element(target.row, target.col) else {
            return;
        };
        let weight = match a.conjugacy() {
            Conjugacy::Normal => s,
            Conjugacy::Transposed => {
                s * standalone_scaling(
                    &a.delta(),
                    &bra.quantum(target.row),
                    &ket.quantum(target.col),
                    a.mode(),
                )
            }
        };
        let mut dst = view.as_mat_mut();
        for j in 0..src.ncols() {
            for i in 0..src.nrows() {
                dst[(i, j)] += weight * src[(i, j)];
            }
        }
    });
}

/// `c += s · a` for two normal-convention matrices, over the blocks present
/// in both.
///
/// # Panics
///
/// Panics if either argument is transposed.
pub fn tensor_scale_add_normal<M: BlockMatrix>(ctx: &EngineContext, s: f64, a: &M, c: &mut M) {
    if s.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    assert_normal("a", a);
    assert_normal("c", c);
    let source = a.storage();
    let views = c.storage_mut().split_blocks_mut();
    for_each_block(ctx, views, |mut view| {
        let Some(src) = source.block_slice(view.block()) else {
            return;
        };
        for (x, y) in view.as_mut_slice().iter_mut().zip(src) {
            *x += s * y;
        }
    });
}

/// Sum of elementwise products over the blocks present in both.
///
/// # Panics
///
/// Panics if either argument is transposed.
pub fn tensor_dot_product<M: BlockMatrix>(a: &M, b: &M) -> f64 {
    assert_normal("a", a);
    assert_normal("b", b);
    let (lhs, rhs) = (a.storage(), b.storage());
    lhs.blocks()
        .iter()
        .filter_map(|&block| Some((lhs.block_slice(block)?, rhs.block_slice(block)?)))
        .map(|(x, y)| x.iter().zip(y).map(|(p, q)| p * q).sum::<f64>())
        .sum()
}

/// Divide each element of `a` by `e - d`, `d` its entry of `diag`.
///
/// Elements are matched to `diag` block by block in ascending order and
/// row-major inside a block. Elements with `|e - d| <` [`PRECONDITION_TOLERANCE`]
/// are left unchanged. For a wavefunction with target `T` on a composite
/// basis, pass [`DiagonalBuffer::sector`] of the composite diagonal at `T`.
///
/// # Panics
///
/// Panics if `diag` does not have one entry per stored element.
pub fn tensor_precondition<M: BlockMatrix>(a: &mut M, e: f64, diag: &DiagonalBuffer) {
    let storage = a.storage_mut();
    assert_eq!(
        diag.len(),
        storage.nnz(),
        "diagonal has {} entries for {} stored elements",
        diag.len(),
        storage.nnz()
    );
    let mut cursor = 0;
    for mut view in storage.split_blocks_mut() {
        let (nrows, ncols) = view.shape();
        let d = diag.segment(cursor, nrows * ncols);
        let data = view.as_mut_slice();
        for i in 0..nrows {
            for j in 0..ncols {
                let denom = e - d[i * ncols + j];
                if denom.abs() >= PRECONDITION_TOLERANCE {
                    data[j * nrows + i] /= denom;
                }
            }
        }
        cursor += nrows * ncols;
    }
}
