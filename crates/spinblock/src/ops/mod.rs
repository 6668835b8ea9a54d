//! Tensor-algebra engine.
//!
//! Every entry point takes the [`EngineContext`](crate::context::EngineContext)
//! first, borrows its operands for the duration of the call and writes only
//! into blocks that already exist in the output. Multi-block operations run
//! one task per output block on the context's pool.
//!
//! Calls whose overall scale is below [`NEGLIGIBLE_SCALE`] return
//! immediately, and single contributions whose combined factor is below it
//! are skipped.
//!
//! - [`trace`]: `a⊗I` / `I⊗a` into a composite basis, full and diagonal
//! - [`product`]: `a⊗b` into a composite basis, full and diagonal
//! - [`recombine`]: `a·b` on one basis recoupled to a net rank
//! - [`rotate`]: truncation of an operator to a new basis
//! - [`multiply`]: `(a⊗b)·ψ` and `(a⊗I)·ψ` without forming the operator
//! - [`scalar`]: scale, add, dot and precondition

pub mod multiply;
pub mod product;
pub mod recombine;
pub mod rotate;
pub mod scalar;
pub mod sign;
pub mod trace;

use crate::basis::{BasisId, StateInfo};
use crate::operator::{Conjugacy, SparseOperator};
use crate::wavefunction::Wavefunction;

pub use multiply::{tensor_product_multiply, tensor_trace_multiply};
pub use product::{tensor_product, tensor_product_diagonal};
pub use rotate::{Rotation, RotationSide, tensor_rotate, tensor_rotate_into};
pub use scalar::{
    tensor_dot_product, tensor_precondition, tensor_scale, tensor_scale_add,
    tensor_scale_add_normal,
};
pub use trace::{TraceSide, tensor_trace, tensor_trace_diagonal};

/// Magnitude below which a scale factor counts as zero.
pub const NEGLIGIBLE_SCALE: f64 = 1e-20;

/// Preconditioner denominators smaller than this leave the element unchanged.
pub const PRECONDITION_TOLERANCE: f64 = 1e-12;

/// Bra and ket composite bases of a product-type operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BraKet {
    /// Bra and ket share one basis.
    Same(BasisId),
    /// Transition elements between two bases.
    Distinct { bra: BasisId, ket: BasisId },
}

impl BraKet {
    /// `(bra, ket)` ids.
    pub fn ids(self) -> (BasisId, BasisId) {
        match self {
            BraKet::Same(id) => (id, id),
            BraKet::Distinct { bra, ket } => (bra, ket),
        }
    }
}

pub(crate) fn assert_operand(name: &str, op: &SparseOperator, bra: &StateInfo, ket: &StateInfo) {
    assert_eq!(
        op.nrows(),
        bra.n_labels(),
        "{name}: operator has {} row labels but the bra basis has {}",
        op.nrows(),
        bra.n_labels()
    );
    assert_eq!(
        op.ncols(),
        ket.n_labels(),
        "{name}: operator has {} column labels but the ket basis has {}",
        op.ncols(),
        ket.n_labels()
    );
}

pub(crate) fn assert_output(op: &SparseOperator, bra: &StateInfo, ket: &StateInfo) {
    assert_eq!(
        op.conjugacy(),
        Conjugacy::Normal,
        "output operator must use the normal convention"
    );
    assert_operand("output", op, bra, ket);
}

pub(crate) fn assert_wavefunction(name: &str, psi: &Wavefunction, left: &StateInfo, right: &StateInfo) {
    assert_eq!(
        (psi.nrows(), psi.ncols()),
        (left.n_labels(), right.n_labels()),
        "{name}: wavefunction label grid does not match its left/right bases"
    );
}
