//! Block coordinates for 2-D block-sparse storage.
//!
//! A [`Block`] names one dense sub-matrix of a symmetry-blocked matrix by its
//! (row label, column label) pair.

/// A (row label, column label) coordinate.
///
/// Ordering is lexicographic, row first. Storage lays blocks out in this
/// order, so sorted iteration and storage order coincide.
///
/// # Example
/// ```
/// use spinblock::storage::blocksparse::Block;
///
/// let block = Block::new(1, 2);
/// assert_eq!(block.transpose(), Block::new(2, 1));
/// assert!(Block::new(0, 5) < Block::new(1, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    /// Row label index.
    pub row: usize,
    /// Column label index.
    pub col: usize,
}

impl Block {
    /// Create a block coordinate.
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The coordinate with row and column exchanged.
    #[inline]
    pub const fn transpose(self) -> Self {
        Self::new(self.col, self.row)
    }
}

impl From<(usize, usize)> for Block {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({}, {})", self.row, self.col)
    }
}
