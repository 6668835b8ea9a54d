//! BlockOffsets for mapping blocks to storage offsets.
//!
//! Besides the O(1) block-to-offset lookup, the offsets keep the per-row and
//! per-column lists of present blocks that the contraction kernels walk.

use std::collections::HashMap;

use super::block::Block;
use super::block_dim::BlockDims;

/// Maps blocks to their offsets in flat storage.
///
/// Blocks are laid out in ascending [`Block`] order, each occupying
/// `rows × cols` consecutive elements.
///
/// # Example
/// ```
/// use spinblock::storage::blocksparse::{Block, BlockDim, BlockDims, BlockOffsets};
///
/// let dims = BlockDims::new(BlockDim::new(vec![2, 3]), BlockDim::new(vec![4, 5]));
/// let offsets = BlockOffsets::from_blocks(&[Block::new(1, 1), Block::new(0, 0)], &dims);
///
/// // (0,0) is 2x4 and comes first after sorting
/// assert_eq!(offsets.get(Block::new(0, 0)), Some(0));
/// assert_eq!(offsets.get(Block::new(1, 1)), Some(8));
/// assert_eq!(offsets.total_nnz(), 8 + 15);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockOffsets {
    offsets: HashMap<Block, usize>,
    /// Present blocks in storage order.
    order: Vec<Block>,
    /// Column labels present in each row, ascending.
    by_row: Vec<Vec<usize>>,
    /// Row labels present in each column, ascending.
    by_col: Vec<Vec<usize>>,
    total_nnz: usize,
}

impl BlockOffsets {
    /// Lay out `blocks` (sorted and deduplicated first) against `dims`.
    ///
    /// # Panics
    /// Panics if a block lies outside `dims`.
    pub fn from_blocks(blocks: &[Block], dims: &BlockDims) -> Self {
        let mut order = blocks.to_vec();
        order.sort_unstable();
        order.dedup();

        let mut offsets = HashMap::with_capacity(order.len());
        let mut by_row = vec![Vec::new(); dims.rows().len()];
        let mut by_col = vec![Vec::new(); dims.cols().len()];
        let mut current = 0;
        for &block in &order {
            assert!(
                dims.contains(block.row, block.col),
                "{block} is outside a {}x{} label grid",
                dims.rows().len(),
                dims.cols().len()
            );
            offsets.insert(block, current);
            by_row[block.row].push(block.col);
            by_col[block.col].push(block.row);
            current += dims.block_size(block.row, block.col);
        }

        Self {
            offsets,
            order,
            by_row,
            by_col,
            total_nnz: current,
        }
    }

    /// Offset of `block`, or `None` if absent.
    #[inline]
    pub fn get(&self, block: Block) -> Option<usize> {
        self.offsets.get(&block).copied()
    }

    /// Check if a block is present.
    #[inline]
    pub fn contains(&self, block: Block) -> bool {
        self.offsets.contains_key(&block)
    }

    /// Number of present blocks.
    #[inline]
    pub fn nnzblocks(&self) -> usize {
        self.order.len()
    }

    /// Total number of stored elements.
    #[inline]
    pub fn total_nnz(&self) -> usize {
        self.total_nnz
    }

    /// True when no block is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Present blocks in storage order.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.order
    }

    /// Columns with a block in `row`.
    #[inline]
    pub fn cols_in_row(&self, row: usize) -> &[usize] {
        self.by_row.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows with a block in `col`.
    #[inline]
    pub fn rows_in_col(&self, col: usize) -> &[usize] {
        self.by_col.get(col).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl std::fmt::Display for BlockOffsets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BlockOffsets(nnzblocks={}, total_nnz={})",
            self.nnzblocks(),
            self.total_nnz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::blocksparse::BlockDim;

    fn dims() -> BlockDims {
        BlockDims::new(BlockDim::new(vec![2, 3, 1]), BlockDim::new(vec![4, 1]))
    }

    #[test]
    fn test_offsets_follow_sorted_order() {
        let blocks = [Block::new(2, 0), Block::new(0, 1), Block::new(1, 0)];
        let offsets = BlockOffsets::from_blocks(&blocks, &dims());
        assert_eq!(
            offsets.blocks(),
            &[Block::new(0, 1), Block::new(1, 0), Block::new(2, 0)]
        );
        assert_eq!(offsets.get(Block::new(0, 1)), Some(0));
        assert_eq!(offsets.get(Block::new(1, 0)), Some(2));
        assert_eq!(offsets.get(Block::new(2, 0)), Some(14));
        assert_eq!(offsets.total_nnz(), 18);
        assert_eq!(offsets.get(Block::new(0, 0)), None);
    }

    #[test]
    fn test_duplicates_are_merged() {
        let blocks = [Block::new(0, 0), Block::new(0, 0)];
        let offsets = BlockOffsets::from_blocks(&blocks, &dims());
        assert_eq!(offsets.nnzblocks(), 1);
        assert_eq!(offsets.total_nnz(), 8);
    }

    #[test]
    fn test_row_and_column_index() {
        let blocks = [Block::new(0, 0), Block::new(0, 1), Block::new(2, 0)];
        let offsets = BlockOffsets::from_blocks(&blocks, &dims());
        assert_eq!(offsets.cols_in_row(0), &[0, 1]);
        assert_eq!(offsets.cols_in_row(1), &[] as &[usize]);
        assert_eq!(offsets.rows_in_col(0), &[0, 2]);
        assert_eq!(offsets.rows_in_col(7), &[] as &[usize]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_block_out_of_grid_panics() {
        BlockOffsets::from_blocks(&[Block::new(3, 0)], &dims());
    }
}
