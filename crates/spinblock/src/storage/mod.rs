//! Storage types shared by operators and wavefunctions.

pub mod blocksparse;

pub use blocksparse::{Block, BlockDim, BlockDims, BlockOffsets, BlockSparse, BlockViewMut};

use crate::operator::Conjugacy;

/// A matrix whose numeric content is a [`BlockSparse`] store.
///
/// Implemented by [`SparseOperator`](crate::operator::SparseOperator) and
/// [`Wavefunction`](crate::wavefunction::Wavefunction) so the scalar
/// utilities in [`ops::scalar`](crate::ops::scalar) work on both.
pub trait BlockMatrix {
    /// Stored blocks.
    fn storage(&self) -> &BlockSparse;

    /// Mutable stored blocks. The block set itself cannot change.
    fn storage_mut(&mut self) -> &mut BlockSparse;

    /// How stored blocks relate to logical ones.
    fn conjugacy(&self) -> Conjugacy {
        Conjugacy::Normal
    }
}
