//! Block-sparse wavefunctions.
//!
//! A [`Wavefunction`] on a left ⊗ right partition is a matrix whose rows are
//! left-factor labels and columns right-factor labels. Block `(l, r)` exists
//! when the fixed target label is contained in `l ⊗ r`.

use faer::{MatMut, MatRef};
use rand::Rng;

use crate::basis::StateInfo;
use crate::quantum::{Quantum, SymmetryMode};
use crate::storage::{Block, BlockDims, BlockMatrix, BlockSparse};

/// Block-sparse wavefunction with one target label.
#[derive(Clone, Debug, PartialEq)]
pub struct Wavefunction {
    storage: BlockSparse,
    target: Quantum,
    mode: SymmetryMode,
}

impl Wavefunction {
    /// Zero wavefunction holding every block that couples to `target`.
    pub fn zeros(target: Quantum, left: &StateInfo, right: &StateInfo, mode: SymmetryMode) -> Self {
        let mut blocks = Vec::new();
        for l in 0..left.n_labels() {
            for r in 0..right.n_labels() {
                if target.is_in_product(&left.quantum(l), &right.quantum(r), mode) {
                    blocks.push(Block::new(l, r));
                }
            }
        }
        let dims = BlockDims::new(left.block_dim().clone(), right.block_dim().clone());
        Self {
            storage: BlockSparse::zeros(&blocks, dims),
            target,
            mode,
        }
    }

    /// Target label.
    #[inline]
    pub fn target(&self) -> Quantum {
        self.target
    }

    /// Coupling mode the block set was built for.
    #[inline]
    pub fn mode(&self) -> SymmetryMode {
        self.mode
    }

    /// Number of left labels.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.storage.dims().rows().len()
    }

    /// Number of right labels.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.storage.dims().cols().len()
    }

    /// True when block `(l, r)` is present.
    #[inline]
    pub fn allowed(&self, l: usize, r: usize) -> bool {
        self.storage.contains(Block::new(l, r))
    }

    /// Block `(l, r)`.
    #[inline]
    pub fn block(&self, l: usize, r: usize) -> Option<MatRef<'_, f64>> {
        self.storage.block(Block::new(l, r))
    }

    /// Mutable block `(l, r)`.
    #[inline]
    pub fn block_mut(&mut self, l: usize, r: usize) -> Option<MatMut<'_, f64>> {
        self.storage.block_mut(Block::new(l, r))
    }

    /// Left labels with a block in column `r`.
    #[inline]
    pub fn active_rows(&self, r: usize) -> &[usize] {
        self.storage.offsets().rows_in_col(r)
    }

    /// Right labels with a block in row `l`.
    #[inline]
    pub fn active_cols(&self, l: usize) -> &[usize] {
        self.storage.offsets().cols_in_row(l)
    }

    /// Present blocks, ascending.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        self.storage.blocks()
    }

    /// Euclidean norm over all stored elements.
    pub fn norm(&self) -> f64 {
        self.storage.as_slice().iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Fill every element with a standard-normal sample.
    pub fn randomize_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.storage.randomize_with_rng(rng);
    }
}

impl BlockMatrix for Wavefunction {
    fn storage(&self) -> &BlockSparse {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut BlockSparse {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_couple_to_target() {
        let left = StateInfo::new(
            vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0), Quantum::new(2, 0, 0)],
            vec![1, 2, 1],
        )
        .unwrap();
        let right = StateInfo::new(vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0)], vec![1, 3]).unwrap();
        let psi = Wavefunction::zeros(Quantum::new(2, 0, 0), &left, &right, SymmetryMode::SpinAdapted);

        assert_eq!(psi.blocks(), &[Block::new(1, 1), Block::new(2, 0)]);
        assert_eq!(psi.block(1, 1).map(|b| (b.nrows(), b.ncols())), Some((2, 3)));
        assert_eq!(psi.active_rows(0), &[2]);
        assert_eq!(psi.active_cols(1), &[1]);
        assert!(!psi.allowed(0, 0));
    }

    #[test]
    fn test_norm() {
        let site = StateInfo::new(vec![Quantum::new(1, 1, 0)], vec![2]).unwrap();
        let mut psi = Wavefunction::zeros(Quantum::new(2, 2, 0), &site, &site, SymmetryMode::SpinAdapted);
        let mut block = psi.block_mut(0, 0).unwrap();
        block[(0, 0)] = 3.0;
        block[(1, 1)] = 4.0;
        assert_eq!(psi.norm(), 5.0);
    }
}
