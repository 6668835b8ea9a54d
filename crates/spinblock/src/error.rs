//! Error types for spinblock.
//!
//! Only construction from caller-supplied data is fallible. Violations of the
//! engine's calling contract (mismatched operands, transposed outputs) are
//! programmer errors and panic with a descriptive message instead.

use thiserror::Error;

use crate::quantum::Quantum;

/// Errors that can occur while building bases, operators and contexts.
#[derive(Debug, Error)]
pub enum SpinBlockError {
    /// The block is forbidden by the selection rule of the operator or wavefunction.
    #[error("block ({row}, {col}) is forbidden by the symmetry label {label}")]
    BlockNotAllowed {
        row: usize,
        col: usize,
        label: Quantum,
    },

    /// Dense block shape does not match the state counts of its labels.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Label index outside the basis.
    #[error("label index {index} is out of range for a basis with {len} labels")]
    LabelOutOfRange { index: usize, len: usize },

    /// The same quantum label appears twice in one basis.
    #[error("label {label} appears more than once in the basis")]
    DuplicateLabel { label: Quantum },

    /// Label list and state-count list have different lengths.
    #[error("basis has {labels} labels but {states} state counts")]
    LengthMismatch { labels: usize, states: usize },

    /// Basis id not issued by this arena.
    #[error("basis id {id} is unknown to this arena")]
    UnknownBasis { id: usize },

    /// Basis is a leaf where a direct-product basis is required.
    #[error("basis {id} is not a direct-product basis")]
    NotComposite { id: usize },

    /// Worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
