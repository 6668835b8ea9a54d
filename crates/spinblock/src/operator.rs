//! Block-sparse operators.
//!
//! A [`SparseOperator`] is a matrix between a bra basis (rows) and a ket basis
//! (columns) that carries an intrinsic quantum shift `delta`: block
//! `(row, col)` may exist only when `row ∈ col ⊗ delta`.
//!
//! A transposed operator ([`Conjugacy::Transposed`]) keeps the storage of its
//! untransposed source. Reading logical block `(i, j)` returns the stored
//! block `(j, i)` transposed, and using it against normal operands brings in
//! the closed-form [`standalone_scaling`].
//!
//! # Example
//!
//! ```
//! use spinblock::basis::StateInfo;
//! use spinblock::operator::SparseOperator;
//! use spinblock::quantum::{Quantum, SymmetryMode};
//!
//! let site = StateInfo::new(vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0)], vec![1, 1]).unwrap();
//! let creation = Quantum::new(1, 1, 0);
//! let op = SparseOperator::zeros(creation, &site, &site, SymmetryMode::SpinAdapted);
//!
//! assert!(op.allowed(1, 0));
//! assert!(!op.allowed(0, 1));
//! assert!(op.is_fermion());
//! let t = op.transpose();
//! assert!(t.allowed(0, 1));
//! ```

use faer::{Mat, MatMut, MatRef};
use rand::Rng;

use crate::basis::StateInfo;
use crate::coupling::standalone_scaling;
use crate::error::SpinBlockError;
use crate::quantum::{Quantum, SymmetryMode};
use crate::storage::{Block, BlockDims, BlockMatrix, BlockSparse};

/// Relation between stored and logical blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Conjugacy {
    /// Logical block `(i, j)` is the stored block `(i, j)`.
    #[default]
    Normal,
    /// Logical block `(i, j)` is the stored block `(j, i)` transposed.
    Transposed,
}

impl Conjugacy {
    /// The other convention.
    pub fn flip(self) -> Self {
        match self {
            Conjugacy::Normal => Conjugacy::Transposed,
            Conjugacy::Transposed => Conjugacy::Normal,
        }
    }
}

/// Block-sparse operator with a symmetry shift.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseOperator {
    storage: BlockSparse,
    /// Shift of the logical operator.
    delta: Quantum,
    conjugacy: Conjugacy,
    mode: SymmetryMode,
}

fn allowed_blocks(
    delta: &Quantum,
    bra: &StateInfo,
    ket: &StateInfo,
    mode: SymmetryMode,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    for row in 0..bra.n_labels() {
        for col in 0..ket.n_labels() {
            if bra.quantum(row).is_in_product(&ket.quantum(col), delta, mode) {
                blocks.push(Block::new(row, col));
            }
        }
    }
    blocks
}

impl SparseOperator {
    /// Zero operator holding every block the shift allows.
    pub fn zeros(delta: Quantum, bra: &StateInfo, ket: &StateInfo, mode: SymmetryMode) -> Self {
        let blocks = allowed_blocks(&delta, bra, ket, mode);
        Self::from_blocks(delta, &blocks, bra, ket, mode)
    }

    /// Zero operator holding only the listed `(row, col)` blocks.
    ///
    /// # Errors
    ///
    /// Fails when a label index is out of range or a block is forbidden by
    /// `delta`.
    pub fn with_blocks(
        delta: Quantum,
        bra: &StateInfo,
        ket: &StateInfo,
        blocks: &[(usize, usize)],
        mode: SymmetryMode,
    ) -> Result<Self, SpinBlockError> {
        let mut checked = Vec::with_capacity(blocks.len());
        for &(row, col) in blocks {
            if row >= bra.n_labels() {
                return Err(SpinBlockError::LabelOutOfRange {
                    index: row,
                    len: bra.n_labels(),
                });
            }
            if col >= ket.n_labels() {
                return Err(SpinBlockError::LabelOutOfRange {
                    index: col,
                    len: ket.n_labels(),
                });
            }
            if !bra.quantum(row).is_in_product(&ket.quantum(col), &delta, mode) {
                return Err(SpinBlockError::BlockNotAllowed {
                    row,
                    col,
                    label: delta,
                });
            }
            checked.push(Block::new(row, col));
        }
        Ok(Self::from_blocks(delta, &checked, bra, ket, mode))
    }

    /// Identity on `basis`: unit diagonal blocks, vacuum shift.
    pub fn identity(basis: &StateInfo, mode: SymmetryMode) -> Self {
        let blocks: Vec<Block> = (0..basis.n_labels()).map(|i| Block::new(i, i)).collect();
        let mut op = Self::from_blocks(Quantum::vacuum(), &blocks, basis, basis, mode);
        for view in op.storage.split_blocks_mut() {
            let mut m = view.into_mat_mut();
            for i in 0..m.nrows() {
                m[(i, i)] = 1.0;
            }
        }
        op
    }

    pub(crate) fn from_blocks(
        delta: Quantum,
        blocks: &[Block],
        bra: &StateInfo,
        ket: &StateInfo,
        mode: SymmetryMode,
    ) -> Self {
        let dims = BlockDims::new(bra.block_dim().clone(), ket.block_dim().clone());
        Self {
            storage: BlockSparse::zeros(blocks, dims),
            delta,
            conjugacy: Conjugacy::Normal,
            mode,
        }
    }

    /// Transposed view sharing the same numbers.
    ///
    /// The logical shift becomes the conjugate label.
    pub fn transpose(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            delta: self.delta.conj(self.mode),
            conjugacy: self.conjugacy.flip(),
            mode: self.mode,
        }
    }

    /// Shift of the logical operator.
    #[inline]
    pub fn delta(&self) -> Quantum {
        self.delta
    }

    /// Spin rank, as `2S`.
    #[inline]
    pub fn spin(&self) -> i32 {
        self.delta.spin
    }

    /// True for an odd particle-number change.
    #[inline]
    pub fn is_fermion(&self) -> bool {
        self.delta.is_fermion()
    }

    /// Stored-versus-logical convention.
    #[inline]
    pub fn conjugacy(&self) -> Conjugacy {
        self.conjugacy
    }

    /// Coupling mode the block set was built for.
    #[inline]
    pub fn mode(&self) -> SymmetryMode {
        self.mode
    }

    #[inline]
    fn stored(&self, row: usize, col: usize) -> Block {
        match self.conjugacy {
            Conjugacy::Normal => Block::new(row, col),
            Conjugacy::Transposed => Block::new(col, row),
        }
    }

    /// Number of logical row labels.
    pub fn nrows(&self) -> usize {
        let dims = self.storage.dims();
        match self.conjugacy {
            Conjugacy::Normal => dims.rows().len(),
            Conjugacy::Transposed => dims.cols().len(),
        }
    }

    /// Number of logical column labels.
    pub fn ncols(&self) -> usize {
        let dims = self.storage.dims();
        match self.conjugacy {
            Conjugacy::Normal => dims.cols().len(),
            Conjugacy::Transposed => dims.rows().len(),
        }
    }

    /// True when logical block `(row, col)` is present.
    #[inline]
    pub fn allowed(&self, row: usize, col: usize) -> bool {
        self.storage.contains(self.stored(row, col))
    }

    /// Logical block `(row, col)`.
    pub fn element(&self, row: usize, col: usize) -> Option<MatRef<'_, f64>> {
        let block = self.storage.block(self.stored(row, col))?;
        Some(match self.conjugacy {
            Conjugacy::Normal => block,
            Conjugacy::Transposed => block.transpose(),
        })
    }

    /// Mutable logical block `(row, col)`.
    pub fn element_mut(&mut self, row: usize, col: usize) -> Option<MatMut<'_, f64>> {
        let conjugacy = self.conjugacy;
        let stored = self.stored(row, col);
        let block = self.storage.block_mut(stored)?;
        Some(match conjugacy {
            Conjugacy::Normal => block,
            Conjugacy::Transposed => block.transpose_mut(),
        })
    }

    /// Copy `values` into logical block `(row, col)`.
    ///
    /// # Errors
    ///
    /// Fails when the block is absent or `values` has the wrong shape.
    pub fn set_element(
        &mut self,
        row: usize,
        col: usize,
        values: MatRef<'_, f64>,
    ) -> Result<(), SpinBlockError> {
        let delta = self.delta;
        let Some(mut dst) = self.element_mut(row, col) else {
            return Err(SpinBlockError::BlockNotAllowed {
                row,
                col,
                label: delta,
            });
        };
        let expected = (dst.nrows(), dst.ncols());
        let actual = (values.nrows(), values.ncols());
        if expected != actual {
            return Err(SpinBlockError::ShapeMismatch { expected, actual });
        }
        for j in 0..actual.1 {
            for i in 0..actual.0 {
                dst[(i, j)] = values[(i, j)];
            }
        }
        Ok(())
    }

    /// Column labels with a present block in logical row `row`.
    pub fn active_cols(&self, row: usize) -> &[usize] {
        let offsets = self.storage.offsets();
        match self.conjugacy {
            Conjugacy::Normal => offsets.cols_in_row(row),
            Conjugacy::Transposed => offsets.rows_in_col(row),
        }
    }

    /// Row labels with a present block in logical column `col`.
    pub fn active_rows(&self, col: usize) -> &[usize] {
        let offsets = self.storage.offsets();
        match self.conjugacy {
            Conjugacy::Normal => offsets.rows_in_col(col),
            Conjugacy::Transposed => offsets.cols_in_row(col),
        }
    }

    /// Present logical blocks, ascending.
    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks: Vec<Block> = match self.conjugacy {
            Conjugacy::Normal => self.storage.blocks().to_vec(),
            Conjugacy::Transposed => {
                self.storage.blocks().iter().map(|b| b.transpose()).collect()
            }
        };
        blocks.sort_unstable();
        blocks
    }

    /// Scaling that accompanies logical block `(bra, ket)` in a contraction.
    ///
    /// 1 for a normal operator; the stand-alone scaling of the source
    /// operator's shift for a transposed one.
    pub fn scaling(&self, bra: &Quantum, ket: &Quantum) -> f64 {
        match self.conjugacy {
            Conjugacy::Normal => 1.0,
            Conjugacy::Transposed => standalone_scaling(&self.delta, bra, ket, self.mode),
        }
    }

    /// Fill every stored element with a standard-normal sample.
    pub fn randomize_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.storage.randomize_with_rng(rng);
    }

    /// Dense logical matrix, blocks placed at the label offsets of `bra` and `ket`.
    pub fn to_dense(&self, bra: &StateInfo, ket: &StateInfo) -> Mat<f64> {
        assert_eq!(bra.n_labels(), self.nrows(), "bra basis does not match operator rows");
        assert_eq!(ket.n_labels(), self.ncols(), "ket basis does not match operator columns");
        let mut dense = Mat::zeros(bra.total_states(), ket.total_states());
        for block in self.blocks() {
            let Some(src) = self.element(block.row, block.col) else {
                continue;
            };
            let (r0, c0) = (bra.offset(block.row), ket.offset(block.col));
            for j in 0..src.ncols() {
                for i in 0..src.nrows() {
                    dense[(r0 + i, c0 + j)] = src[(i, j)];
                }
            }
        }
        dense
    }
}

impl BlockMatrix for SparseOperator {
    fn storage(&self) -> &BlockSparse {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut BlockSparse {
        &mut self.storage
    }

    fn conjugacy(&self) -> Conjugacy {
        self.conjugacy
    }
}
