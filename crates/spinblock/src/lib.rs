//! spinblock - block-sparse spin-adapted tensor algebra
//!
//! Operators and wavefunctions of renormalization-group calculations are
//! stored as dense blocks indexed by pairs of symmetry labels. This crate
//! provides the engine that traces, multiplies, rotates and applies them while
//! respecting the symmetry selection rules, the angular-momentum recoupling
//! factors and the fermionic reordering signs.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Engine (ops module)
//!     → trace, product, recombine, rotate, multiply, scalar
//!
//! Level 2: Data model
//!     → Quantum labels, StateInfo bases in a BasisArena,
//!       SparseOperator, Wavefunction, DiagonalBuffer
//!
//! Level 3: Storage and kernels (storage, backend modules)
//!     → BlockSparse column-major blocks, faer GEMM and Kronecker kernels
//! ```
//!
//! Every engine call takes an [`EngineContext`] holding the worker pool, the
//! recoupling provider, the symmetry mode and the scratch arena.
//!
//! # Example
//!
//! ```
//! use spinblock::ops::{TraceSide, tensor_trace};
//! use spinblock::{BasisArena, EngineContext, Quantum, SparseOperator};
//!
//! let ctx = EngineContext::builder().threads(1).build().unwrap();
//! let mode = ctx.mode();
//!
//! let mut bases = BasisArena::new();
//! let site = bases
//!     .leaf(vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0)], vec![1, 1])
//!     .unwrap();
//! let pair = bases.product(site, site, mode).unwrap();
//!
//! let id = SparseOperator::identity(&bases[site], mode);
//! let mut total = SparseOperator::zeros(Quantum::vacuum(), &bases[pair], &bases[pair], mode);
//! tensor_trace(&ctx, &bases, pair, &id, &mut total, TraceSide::Right, 1.0);
//!
//! let dense = total.to_dense(&bases[pair], &bases[pair]);
//! assert!((dense[(0, 0)] - 1.0).abs() < 1e-12);
//! ```

pub mod arena;
pub mod backend;
pub mod basis;
pub mod context;
pub mod coupling;
pub mod diagonal;
pub mod error;
pub mod operator;
pub mod ops;
pub mod quantum;
pub mod storage;
pub mod wavefunction;

mod parallel;

pub use arena::{HeapArena, ScratchArena};
pub use basis::{BasisArena, BasisId, StateInfo};
pub use context::{EngineConfig, EngineContext};
pub use coupling::{CouplingTable, Recoupling};
pub use diagonal::DiagonalBuffer;
pub use error::SpinBlockError;
pub use operator::{Conjugacy, SparseOperator};
pub use quantum::{Quantum, SymmetryMode};
pub use wavefunction::Wavefunction;
