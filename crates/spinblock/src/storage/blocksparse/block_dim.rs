//! Label state counts along one or both axes of a blocked matrix.

/// State counts for the labels of one axis, with cumulative offsets.
///
/// # Example
/// ```
/// use spinblock::storage::blocksparse::BlockDim;
///
/// let dim = BlockDim::new(vec![2, 3, 1]);
/// assert_eq!(dim.len(), 3);
/// assert_eq!(dim.total(), 6);
/// assert_eq!(dim.offset(2), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDim {
    sizes: Vec<usize>,
    /// `cumulative[i]` = sum of `sizes[..i]`, one trailing entry for the total.
    cumulative: Vec<usize>,
}

impl BlockDim {
    /// Create from per-label state counts.
    pub fn new(sizes: Vec<usize>) -> Self {
        let mut cumulative = Vec::with_capacity(sizes.len() + 1);
        let mut total = 0usize;
        cumulative.push(total);
        for &size in &sizes {
            total += size;
            cumulative.push(total);
        }
        Self { sizes, cumulative }
    }

    /// Number of labels.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True when there are no labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// State count of label `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn size(&self, i: usize) -> usize {
        self.sizes[i]
    }

    /// Offset of label `i` in the unblocked index.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn offset(&self, i: usize) -> usize {
        self.cumulative[i]
    }

    /// Total number of states.
    #[inline]
    pub fn total(&self) -> usize {
        self.cumulative[self.sizes.len()]
    }

    /// All state counts.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Label containing unblocked index `index`, with the position inside it.
    pub fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.total() {
            return None;
        }
        let label = self.cumulative.partition_point(|&start| start <= index) - 1;
        Some((label, index - self.cumulative[label]))
    }
}

/// Row and column [`BlockDim`]s of a blocked matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDims {
    rows: BlockDim,
    cols: BlockDim,
}

impl BlockDims {
    /// Combine row and column dimensions.
    pub fn new(rows: BlockDim, cols: BlockDim) -> Self {
        Self { rows, cols }
    }

    /// Row dimension.
    #[inline]
    pub fn rows(&self) -> &BlockDim {
        &self.rows
    }

    /// Column dimension.
    #[inline]
    pub fn cols(&self) -> &BlockDim {
        &self.cols
    }

    /// Dense shape `(rows, cols)` of block `(row, col)`.
    #[inline]
    pub fn block_shape(&self, row: usize, col: usize) -> (usize, usize) {
        (self.rows.size(row), self.cols.size(col))
    }

    /// Number of elements in block `(row, col)`.
    #[inline]
    pub fn block_size(&self, row: usize, col: usize) -> usize {
        let (nrows, ncols) = self.block_shape(row, col);
        nrows * ncols
    }

    /// True when both label indices are in range.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows.len() && col < self.cols.len()
    }

    /// Shape of the fully dense matrix.
    pub fn dense_shape(&self) -> (usize, usize) {
        (self.rows.total(), self.cols.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_dim_offsets() {
        let dim = BlockDim::new(vec![2, 0, 3]);
        assert_eq!(dim.offset(0), 0);
        assert_eq!(dim.offset(1), 2);
        assert_eq!(dim.offset(2), 2);
        assert_eq!(dim.total(), 5);
    }

    #[test]
    fn test_locate_skips_empty_labels() {
        let dim = BlockDim::new(vec![2, 0, 3]);
        assert_eq!(dim.locate(0), Some((0, 0)));
        assert_eq!(dim.locate(1), Some((0, 1)));
        assert_eq!(dim.locate(2), Some((2, 0)));
        assert_eq!(dim.locate(4), Some((2, 2)));
        assert_eq!(dim.locate(5), None);
    }

    #[test]
    fn test_block_dims_shape() {
        let dims = BlockDims::new(BlockDim::new(vec![2, 3]), BlockDim::new(vec![4, 5]));
        assert_eq!(dims.block_shape(1, 0), (3, 4));
        assert_eq!(dims.block_size(0, 1), 10);
        assert_eq!(dims.dense_shape(), (5, 9));
        assert!(dims.contains(1, 1));
        assert!(!dims.contains(2, 0));
    }
}
