//! Block-sparse storage for symmetry-blocked matrices.
//!
//! Operators and wavefunctions are matrices whose rows and columns are grouped
//! by quantum label; only label pairs allowed by the symmetry carry a dense
//! block.
//!
//! ## Core Types
//!
//! - [`Block`] - (row label, column label) coordinate
//! - [`BlockDim`] - State counts of the labels along one axis
//! - [`BlockDims`] - Row and column dimensions together
//! - [`BlockOffsets`] - Mapping from blocks to storage offsets
//! - [`BlockSparse`] - Flat storage of all present blocks
//!
//! # Example
//!
//! ```
//! use spinblock::storage::blocksparse::{Block, BlockDim, BlockDims, BlockSparse};
//!
//! let dims = BlockDims::new(BlockDim::new(vec![2, 3]), BlockDim::new(vec![4, 5, 6]));
//! let mut storage = BlockSparse::zeros(&[Block::new(0, 0), Block::new(1, 2)], dims);
//!
//! storage.block_mut(Block::new(1, 2)).unwrap()[(2, 5)] = 1.0;
//! assert_eq!(storage.nnz(), 8 + 18);
//! ```

mod block;
mod block_dim;
mod block_offsets;
mod storage;

pub use block::Block;
pub use block_dim::{BlockDim, BlockDims};
pub use block_offsets::BlockOffsets;
pub use storage::{BlockSparse, BlockViewMut};
