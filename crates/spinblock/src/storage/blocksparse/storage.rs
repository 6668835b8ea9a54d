//! BlockSparse storage for symmetry-blocked real matrices.
//!
//! All present blocks live back to back in one flat column-major buffer. The
//! block set is fixed at construction; afterwards only numeric content
//! changes.

use faer::{MatMut, MatRef};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::backend::{mat_mut, mat_ref};

use super::block::Block;
use super::block_dim::BlockDims;
use super::block_offsets::BlockOffsets;

/// Block-sparse storage for a real matrix.
///
/// # Example
///
/// ```
/// use spinblock::storage::blocksparse::{Block, BlockDim, BlockDims, BlockSparse};
///
/// let dims = BlockDims::new(BlockDim::new(vec![2, 3]), BlockDim::new(vec![4, 5]));
/// let storage = BlockSparse::zeros(&[Block::new(0, 0), Block::new(1, 1)], dims);
///
/// assert_eq!(storage.nnzblocks(), 2);
/// assert_eq!(storage.nnz(), 8 + 15);
/// assert_eq!(storage.block(Block::new(1, 1)).unwrap().nrows(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSparse {
    data: Vec<f64>,
    offsets: BlockOffsets,
    dims: BlockDims,
}

impl BlockSparse {
    /// Zero-filled storage holding `blocks`.
    pub fn zeros(blocks: &[Block], dims: BlockDims) -> Self {
        let offsets = BlockOffsets::from_blocks(blocks, &dims);
        let data = vec![0.0; offsets.total_nnz()];
        Self {
            data,
            offsets,
            dims,
        }
    }

    /// Number of stored elements.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Number of present blocks.
    #[inline]
    pub fn nnzblocks(&self) -> usize {
        self.offsets.nnzblocks()
    }

    /// Label dimensions.
    #[inline]
    pub fn dims(&self) -> &BlockDims {
        &self.dims
    }

    /// Block layout.
    #[inline]
    pub fn offsets(&self) -> &BlockOffsets {
        &self.offsets
    }

    /// Check if a block is present.
    #[inline]
    pub fn contains(&self, block: Block) -> bool {
        self.offsets.contains(block)
    }

    /// Present blocks in storage order.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        self.offsets.blocks()
    }

    /// Flat data, blocks in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Column-major elements of `block`.
    pub fn block_slice(&self, block: Block) -> Option<&[f64]> {
        let offset = self.offsets.get(block)?;
        let size = self.dims.block_size(block.row, block.col);
        Some(&self.data[offset..offset + size])
    }

    /// Mutable column-major elements of `block`.
    pub fn block_slice_mut(&mut self, block: Block) -> Option<&mut [f64]> {
        let offset = self.offsets.get(block)?;
        let size = self.dims.block_size(block.row, block.col);
        Some(&mut self.data[offset..offset + size])
    }

    /// Matrix view of `block`.
    pub fn block(&self, block: Block) -> Option<MatRef<'_, f64>> {
        let (nrows, ncols) = self.dims.block_shape(block.row, block.col);
        self.block_slice(block).map(|data| mat_ref(data, nrows, ncols))
    }

    /// Mutable matrix view of `block`.
    pub fn block_mut(&mut self, block: Block) -> Option<MatMut<'_, f64>> {
        let (nrows, ncols) = self.dims.block_shape(block.row, block.col);
        self.block_slice_mut(block).map(|data| mat_mut(data, nrows, ncols))
    }

    /// Split the buffer into one disjoint mutable view per block, in storage
    /// order. The views can be handed to different workers.
    pub fn split_blocks_mut(&mut self) -> Vec<BlockViewMut<'_>> {
        let Self {
            data,
            offsets,
            dims,
        } = self;
        let mut views = Vec::with_capacity(offsets.nnzblocks());
        let mut rest: &mut [f64] = data.as_mut_slice();
        for &block in offsets.blocks() {
            let (nrows, ncols) = dims.block_shape(block.row, block.col);
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(nrows * ncols);
            views.push(BlockViewMut {
                block,
                nrows,
                ncols,
                data: head,
            });
            rest = tail;
        }
        views
    }

    /// Overwrite every stored element with a standard-normal sample.
    pub fn randomize_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for x in &mut self.data {
            *x = rng.sample(StandardNormal);
        }
    }
}

/// Disjoint mutable view of one block, produced by
/// [`BlockSparse::split_blocks_mut`].
#[derive(Debug)]
pub struct BlockViewMut<'a> {
    block: Block,
    nrows: usize,
    ncols: usize,
    data: &'a mut [f64],
}

impl<'a> BlockViewMut<'a> {
    /// Coordinate of the block.
    #[inline]
    pub fn block(&self) -> Block {
        self.block
    }

    /// Dense shape.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Column-major elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut *self.data
    }

    /// Reborrowed matrix view.
    #[inline]
    pub fn as_mat_mut(&mut self) -> MatMut<'_, f64> {
        mat_mut(&mut *self.data, self.nrows, self.ncols)
    }

    /// Consume the view into a matrix view with the full lifetime.
    #[inline]
    pub fn into_mat_mut(self) -> MatMut<'a, f64> {
        mat_mut(self.data, self.nrows, self.ncols)
    }
}
