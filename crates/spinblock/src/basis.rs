//! Hierarchical bases.
//!
//! A [`StateInfo`] is an ordered list of distinct quantum labels, each with a
//! number of states. A composite basis is the symmetry-collected direct
//! product of two factor bases: every pair of factor labels contributes one
//! *raw* entry per coupled total label, and raw entries with the same total
//! label are *collected* into one label of the composite basis.
//!
//! Within one collected label the raw sub-ranges follow the order of
//! [`ProductMap::collected`], and inside a raw sub-range the states are
//! left-major: `(i_l, i_r) ↦ i_l · n_r + i_r`.
//!
//! Bases live in a [`BasisArena`] and refer to their factors by [`BasisId`].
//!
//! # Example
//!
//! ```
//! use spinblock::basis::BasisArena;
//! use spinblock::quantum::{Quantum, SymmetryMode};
//!
//! let mut arena = BasisArena::new();
//! let site = arena
//!     .leaf(vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0)], vec![1, 1])
//!     .unwrap();
//! let pair = arena.product(site, site, SymmetryMode::SpinAdapted).unwrap();
//!
//! let info = &arena[pair];
//! // N=0 S=0, N=1 S=1/2 (two raw entries), N=2 S=0, N=2 S=1
//! assert_eq!(info.n_labels(), 4);
//! assert_eq!(info.states(1), 2);
//! ```

use std::collections::HashMap;
use std::ops::Index;

use smallvec::SmallVec;

use crate::error::SpinBlockError;
use crate::quantum::{Quantum, SymmetryMode};
use crate::storage::blocksparse::BlockDim;

/// Handle of a basis inside a [`BasisArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasisId(usize);

impl BasisId {
    /// Position in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BasisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One uncollected direct-product entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEntry {
    /// Left factor label.
    pub left: usize,
    /// Right factor label.
    pub right: usize,
    /// Coupled total label.
    pub quantum: Quantum,
    /// `states(left) · states(right)`.
    pub states: usize,
    /// Collected label this entry belongs to.
    pub collected: usize,
    /// First state of this entry inside its collected label.
    pub offset: usize,
}

/// Raw-to-collected bookkeeping of a composite basis.
#[derive(Clone, Debug)]
pub struct ProductMap {
    left: BasisId,
    right: BasisId,
    raw: Vec<RawEntry>,
    collected: Vec<Vec<usize>>,
    /// Raw entries of each `(left, right)` pair, ascending total spin.
    pairs: Vec<SmallVec<[usize; 4]>>,
    n_right: usize,
}

impl ProductMap {
    /// Left factor.
    #[inline]
    pub fn left(&self) -> BasisId {
        self.left
    }

    /// Right factor.
    #[inline]
    pub fn right(&self) -> BasisId {
        self.right
    }

    /// All raw entries.
    #[inline]
    pub fn raw(&self) -> &[RawEntry] {
        &self.raw
    }

    /// Raw entry `index`.
    #[inline]
    pub fn raw_entry(&self, index: usize) -> &RawEntry {
        &self.raw[index]
    }

    /// Raw entries collected into label `label`, in layout order.
    #[inline]
    pub fn collected(&self, label: usize) -> &[usize] {
        &self.collected[label]
    }

    /// Raw entries produced by the factor pair `(left, right)`.
    #[inline]
    pub fn pair(&self, left: usize, right: usize) -> &[usize] {
        &self.pairs[left * self.n_right + right]
    }

    /// Lowest-spin raw entry produced by `(left, right)`, if the pair couples.
    #[inline]
    pub fn first_of_pair(&self, left: usize, right: usize) -> Option<&RawEntry> {
        self.pair(left, right).first().map(|&raw| &self.raw[raw])
    }
}

/// An ordered set of labels with state counts.
#[derive(Clone, Debug)]
pub struct StateInfo {
    quanta: Vec<Quantum>,
    dim: BlockDim,
    lookup: HashMap<Quantum, usize>,
    product: Option<ProductMap>,
}

impl StateInfo {
    /// Basis with the given labels and state counts.
    ///
    /// # Errors
    ///
    /// Fails when the two lists differ in length or a label repeats.
    pub fn new(quanta: Vec<Quantum>, states: Vec<usize>) -> Result<Self, SpinBlockError> {
        if quanta.len() != states.len() {
            return Err(SpinBlockError::LengthMismatch {
                labels: quanta.len(),
                states: states.len(),
            });
        }
        let mut lookup = HashMap::with_capacity(quanta.len());
        for (i, &q) in quanta.iter().enumerate() {
            if lookup.insert(q, i).is_some() {
                return Err(SpinBlockError::DuplicateLabel { label: q });
            }
        }
        Ok(Self {
            quanta,
            dim: BlockDim::new(states),
            lookup,
            product: None,
        })
    }

    /// Number of labels.
    #[inline]
    pub fn n_labels(&self) -> usize {
        self.quanta.len()
    }

    /// All labels.
    #[inline]
    pub fn quanta(&self) -> &[Quantum] {
        &self.quanta
    }

    /// Label `i`.
    #[inline]
    pub fn quantum(&self, i: usize) -> Quantum {
        self.quanta[i]
    }

    /// State count of label `i`.
    #[inline]
    pub fn states(&self, i: usize) -> usize {
        self.dim.size(i)
    }

    /// Offset of label `i` in the unblocked index.
    #[inline]
    pub fn offset(&self, i: usize) -> usize {
        self.dim.offset(i)
    }

    /// Total number of states.
    #[inline]
    pub fn total_states(&self) -> usize {
        self.dim.total()
    }

    /// State counts as a [`BlockDim`].
    #[inline]
    pub fn block_dim(&self) -> &BlockDim {
        &self.dim
    }

    /// Index of `q`, if present.
    pub fn find(&self, q: &Quantum) -> Option<usize> {
        self.lookup.get(q).copied()
    }

    /// Raw-to-collected map, present for composite bases.
    #[inline]
    pub fn product(&self) -> Option<&ProductMap> {
        self.product.as_ref()
    }

    /// True for a basis built by [`BasisArena::product`].
    #[inline]
    pub fn is_composite(&self) -> bool {
        self.product.is_some()
    }
}

/// A composite basis together with both factors.
#[derive(Clone, Copy, Debug)]
pub struct Composite<'a> {
    /// The collected basis.
    pub info: &'a StateInfo,
    /// Left factor.
    pub left: &'a StateInfo,
    /// Right factor.
    pub right: &'a StateInfo,
    /// Raw-to-collected map.
    pub map: &'a ProductMap,
}

/// Owner of every basis built during one renormalization step.
///
/// Ids are only meaningful for the arena that issued them. Dropping the arena
/// drops all bases at once.
#[derive(Clone, Debug, Default)]
pub struct BasisArena {
    nodes: Vec<StateInfo>,
}

impl BasisArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bases.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store a basis.
    pub fn insert(&mut self, info: StateInfo) -> BasisId {
        self.nodes.push(info);
        BasisId(self.nodes.len() - 1)
    }

    /// Build and store a leaf basis.
    pub fn leaf(&mut self, quanta: Vec<Quantum>, states: Vec<usize>) -> Result<BasisId, SpinBlockError> {
        Ok(self.insert(StateInfo::new(quanta, states)?))
    }

    /// Basis `id`.
    pub fn get(&self, id: BasisId) -> Result<&StateInfo, SpinBlockError> {
        self.nodes
            .get(id.0)
            .ok_or(SpinBlockError::UnknownBasis { id: id.0 })
    }

    /// Composite basis `id` with both factors resolved.
    pub fn try_composite(&self, id: BasisId) -> Result<Composite<'_>, SpinBlockError> {
        let info = self.get(id)?;
        let map = info
            .product()
            .ok_or(SpinBlockError::NotComposite { id: id.0 })?;
        Ok(Composite {
            info,
            left: self.get(map.left)?,
            right: self.get(map.right)?,
            map,
        })
    }

    /// Like [`BasisArena::try_composite`], for engine entry points.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown or not a composite basis.
    pub fn composite(&self, id: BasisId) -> Composite<'_> {
        match self.try_composite(id) {
            Ok(composite) => composite,
            Err(err) => panic!("engine requires a direct-product basis: {err}"),
        }
    }

    /// Direct product of `left` and `right`, collected by total label.
    ///
    /// Raw entries are enumerated left label first, then right label, then
    /// ascending total spin. Collected labels are sorted by [`Quantum`]
    /// ordering.
    pub fn product(
        &mut self,
        left: BasisId,
        right: BasisId,
        mode: SymmetryMode,
    ) -> Result<BasisId, SpinBlockError> {
        let (lhs, rhs) = (self.get(left)?, self.get(right)?);
        let n_right = rhs.n_labels();

        let mut raw = Vec::new();
        let mut pairs = Vec::with_capacity(lhs.n_labels() * n_right);
        for l in 0..lhs.n_labels() {
            for r in 0..n_right {
                let mut pair = SmallVec::new();
                for quantum in lhs.quantum(l).couple(&rhs.quantum(r), mode) {
                    pair.push(raw.len());
                    raw.push(RawEntry {
                        left: l,
                        right: r,
                        quantum,
                        states: lhs.states(l) * rhs.states(r),
                        collected: 0,
                        offset: 0,
                    });
                }
                pairs.push(pair);
            }
        }

        let mut quanta: Vec<Quantum> = raw.iter().map(|e| e.quantum).collect();
        quanta.sort_unstable();
        quanta.dedup();

        let mut collected = vec![Vec::new(); quanta.len()];
        let mut states = vec![0usize; quanta.len()];
        for (index, entry) in raw.iter_mut().enumerate() {
            let label = quanta.partition_point(|q| *q < entry.quantum);
            entry.collected = label;
            entry.offset = states[label];
            states[label] += entry.states;
            collected[label].push(index);
        }

        let mut info = StateInfo::new(quanta, states)?;
        log::debug!(
            "product basis {left} x {right}: {} raw entries collected into {} labels ({} states)",
            raw.len(),
            info.n_labels(),
            info.total_states()
        );
        info.product = Some(ProductMap {
            left,
            right,
            raw,
            collected,
            pairs,
            n_right,
        });
        Ok(self.insert(info))
    }
}

impl Index<BasisId> for BasisArena {
    type Output = StateInfo;

    fn index(&self, id: BasisId) -> &StateInfo {
        &self.nodes[id.0]
    }
}
