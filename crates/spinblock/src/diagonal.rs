//! Flat diagonal buffers.
//!
//! A [`DiagonalBuffer`] holds one value per state of a basis, in unblocked
//! order. The diagonal kernels write into it through bounds-checked
//! `(offset, len)` segments.
//!
//! The states of one collected label of a composite basis are contiguous and
//! follow the same order as the elements of a wavefunction with that target:
//! blocks in ascending `(left, right)` order, row-major inside a block. So
//! [`DiagonalBuffer::sector`] is the diagonal that
//! [`tensor_precondition`](crate::ops::tensor_precondition) expects for such
//! a wavefunction.

use crate::basis::StateInfo;
use crate::quantum::Quantum;

/// Diagonal of an operator in unblocked state order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagonalBuffer {
    data: Vec<f64>,
}

impl DiagonalBuffer {
    /// Zero buffer of `len` entries.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    /// Wrap existing values.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All entries.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// All entries, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Entries `offset..offset + len`.
    ///
    /// # Panics
    ///
    /// Panics if the segment runs past the end of the buffer.
    pub fn segment(&self, offset: usize, len: usize) -> &[f64] {
        self.check(offset, len);
        &self.data[offset..offset + len]
    }

    /// Mutable entries `offset..offset + len`.
    ///
    /// # Panics
    ///
    /// Panics if the segment runs past the end of the buffer.
    pub fn segment_mut(&mut self, offset: usize, len: usize) -> &mut [f64] {
        self.check(offset, len);
        &mut self.data[offset..offset + len]
    }

    /// Copy of the entries belonging to collected label `target` of `info`,
    /// or `None` when `info` has no such label.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not sized to `info`.
    pub fn sector(&self, info: &StateInfo, target: &Quantum) -> Option<DiagonalBuffer> {
        assert_eq!(
            self.data.len(),
            info.total_states(),
            "diagonal buffer has {} entries but the basis has {} states",
            self.data.len(),
            info.total_states()
        );
        let label = info.find(target)?;
        let segment = self.segment(info.offset(label), info.states(label));
        Some(Self::from_vec(segment.to_vec()))
    }

    fn check(&self, offset: usize, len: usize) {
        assert!(
            offset + len <= self.data.len(),
            "diagonal segment {}..{} exceeds buffer of length {}",
            offset,
            offset + len,
            self.data.len()
        );
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}
