//! Dense building blocks behind the block-sparse engine.
//!
//! - [`faer_interop`]: zero-copy faer views of block slices
//! - [`kernels`]: GEMM and Kronecker accumulation on single blocks

mod faer_interop;
mod kernels;

pub use faer_interop::{mat_mut, mat_ref};
pub use kernels::{IdentityFactor, gemm, kron_add, kron_identity_add};
