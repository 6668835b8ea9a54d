//! Recoupling coefficients consumed by the tensor-algebra engine.
//!
//! The engine never evaluates angular-momentum algebra itself; it asks a
//! [`Recoupling`] provider for 9j and Racah coefficients keyed by integer
//! `2j` labels. [`CouplingTable`] is the provider shipped with the crate: it
//! evaluates the symbols in [`wigner`] once per distinct key and serves
//! later lookups from a shared cache.
//!
//! # Example
//!
//! ```
//! use spinblock::coupling::{CouplingTable, Recoupling};
//!
//! let table = CouplingTable::new();
//! let w = table.ninej([0, 0, 0, 1, 0, 1, 1, 0, 1]);
//! assert!((w - 1.0).abs() < 1e-12);
//! assert_eq!(table.len(), 1);
//! ```

pub mod wigner;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::quantum::{Quantum, SymmetryMode};

pub use wigner::phase;

/// Thread-safe source of recoupling coefficients.
///
/// Implementations must be pure: equal keys always give equal values.
pub trait Recoupling: Send + Sync {
    /// Normalised 9j coefficient, see [`wigner::ninej_normalized`] for the
    /// row convention.
    fn ninej(&self, spins: [i32; 9]) -> f64;

    /// Racah coefficient `W(abcd; ef)` for `labels = [a, b, c, d, e, f]`.
    fn racah(&self, labels: [i32; 6]) -> f64;

    /// Spatial analogue of [`Recoupling::ninej`]. Abelian point groups have
    /// only one-dimensional irreps, so the factor is 1.
    fn spatial_ninej(&self, _irreps: [u8; 9]) -> f64 {
        1.0
    }
}

/// Memoising cache of Wigner coefficients.
#[derive(Debug, Default)]
pub struct CouplingTable {
    ninej: RwLock<HashMap<[i32; 9], f64>>,
    racah: RwLock<HashMap<[i32; 6], f64>>,
}

impl CouplingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached coefficients.
    pub fn len(&self) -> usize {
        let ninej = self.ninej.read().unwrap_or_else(PoisonError::into_inner).len();
        let racah = self.racah.read().unwrap_or_else(PoisonError::into_inner).len();
        ninej + racah
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill the Racah cache for every admissible label set with `2j <= max_two_j`.
    pub fn precompute_racah(&self, max_two_j: i32) {
        let mut cache = self.racah.write().unwrap_or_else(PoisonError::into_inner);
        let range = 0..=max_two_j;
        for a in range.clone() {
            for b in range.clone() {
                for c in range.clone() {
                    for d in range.clone() {
                        for e in range.clone() {
                            for f in range.clone() {
                                let value = wigner::racah(a, b, c, d, e, f);
                                if value != 0.0 {
                                    cache.insert([a, b, c, d, e, f], value);
                                }
                            }
                        }
                    }
                }
            }
        }
        log::debug!("precomputed {} Racah coefficients up to 2j = {max_two_j}", cache.len());
    }
}

fn cached<K, F>(cache: &RwLock<HashMap<K, f64>>, key: K, compute: F) -> f64
where
    K: std::hash::Hash + Eq + Copy,
    F: FnOnce() -> f64,
{
    if let Some(&value) = cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return value;
    }
    let value = compute();
    cache
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, value);
    value
}

impl Recoupling for CouplingTable {
    fn ninej(&self, spins: [i32; 9]) -> f64 {
        cached(&self.ninej, spins, || wigner::ninej_normalized(spins))
    }

    fn racah(&self, labels: [i32; 6]) -> f64 {
        let [a, b, c, d, e, f] = labels;
        cached(&self.racah, labels, || wigner::racah(a, b, c, d, e, f))
    }
}

/// Closed-form scaling applied when a transposed operator block is used
/// directly against a normal-convention operand.
///
/// `(-1)^((k + s_ket - s_bra)/2) · sqrt((s_ket + 1)/(s_bra + 1))` in
/// spin-adapted mode, 1 in projected-spin mode.
pub fn standalone_scaling(op: &Quantum, bra: &Quantum, ket: &Quantum, mode: SymmetryMode) -> f64 {
    match mode {
        SymmetryMode::SpinAdapted => {
            let sign = phase((op.spin + ket.spin - bra.spin) / 2);
            sign * (f64::from(ket.spin + 1) / f64::from(bra.spin + 1)).sqrt()
        }
        SymmetryMode::ProjectedSpin => 1.0,
    }
}
