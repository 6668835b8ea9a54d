//! Composite quantum labels.
//!
//! A [`Quantum`] carries a particle number, a spin irrep stored as `2S` and an
//! irrep of an abelian point group (D2h or one of its subgroups, irreps `0..8`).
//! How two labels couple depends on the [`SymmetryMode`]:
//!
//! - [`SymmetryMode::SpinAdapted`]: total spins run over the triangle
//!   `|s_l - s_r| ..= s_l + s_r` in steps of 2;
//! - [`SymmetryMode::ProjectedSpin`]: spin labels hold `2Sz` and simply add.
//!
//! Particle numbers add and spatial irreps multiply by XOR in both modes.
//!
//! # Example
//!
//! ```
//! use spinblock::quantum::{Quantum, SymmetryMode};
//!
//! let up = Quantum::new(1, 1, 0);
//! let totals = up.couple(&up, SymmetryMode::SpinAdapted);
//! assert_eq!(totals.as_slice(), &[Quantum::new(2, 0, 0), Quantum::new(2, 2, 0)]);
//! ```

use smallvec::{SmallVec, smallvec};

/// How spin labels couple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SymmetryMode {
    /// Full SU(2) spin adaptation, spins stored as `2S`.
    #[default]
    SpinAdapted,
    /// Only `Sz` is conserved, spins stored as `2Sz`.
    ProjectedSpin,
}

/// Composite symmetry label.
///
/// Ordering is lexicographic in (particles, spin, irrep), which is the order
/// collected labels of a product basis are listed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantum {
    /// Particle number.
    pub particles: i32,
    /// Twice the spin (or twice `Sz` in projected-spin mode).
    pub spin: i32,
    /// Abelian point-group irrep.
    pub irrep: u8,
}

/// Product of two abelian point-group irreps.
#[inline]
pub fn irrep_product(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Angular-momentum triangle condition in `2j` units.
#[inline]
pub fn triangle(a: i32, b: i32, c: i32) -> bool {
    a >= 0 && b >= 0 && c >= 0 && (a + b + c) % 2 == 0 && c >= (a - b).abs() && c <= a + b
}

impl Quantum {
    /// Create a label from particle number, `2S` and irrep.
    pub const fn new(particles: i32, spin: i32, irrep: u8) -> Self {
        Self {
            particles,
            spin,
            irrep,
        }
    }

    /// The vacuum label, neutral under coupling.
    pub const fn vacuum() -> Self {
        Self::new(0, 0, 0)
    }

    /// True when the particle number is odd.
    #[inline]
    pub fn is_fermion(&self) -> bool {
        self.particles.rem_euclid(2) == 1
    }

    /// Label of the conjugate (transposed) operator.
    pub fn conj(&self, mode: SymmetryMode) -> Self {
        let spin = match mode {
            SymmetryMode::SpinAdapted => self.spin,
            SymmetryMode::ProjectedSpin => -self.spin,
        };
        Self::new(-self.particles, spin, self.irrep)
    }

    /// All labels contained in `self ⊗ other`, in ascending spin order.
    pub fn couple(&self, other: &Quantum, mode: SymmetryMode) -> SmallVec<[Quantum; 4]> {
        let particles = self.particles + other.particles;
        let irrep = irrep_product(self.irrep, other.irrep);
        match mode {
            SymmetryMode::SpinAdapted => {
                let lo = (self.spin - other.spin).abs();
                let hi = self.spin + other.spin;
                (lo..=hi)
                    .step_by(2)
                    .map(|spin| Quantum::new(particles, spin, irrep))
                    .collect()
            }
            SymmetryMode::ProjectedSpin => {
                smallvec![Quantum::new(particles, self.spin + other.spin, irrep)]
            }
        }
    }

    /// True when `self` is one of the labels in `a ⊗ b`.
    pub fn is_in_product(&self, a: &Quantum, b: &Quantum, mode: SymmetryMode) -> bool {
        if self.particles != a.particles + b.particles
            || self.irrep != irrep_product(a.irrep, b.irrep)
        {
            return false;
        }
        match mode {
            SymmetryMode::SpinAdapted => triangle(a.spin, b.spin, self.spin),
            SymmetryMode::ProjectedSpin => self.spin == a.spin + b.spin,
        }
    }
}

impl std::fmt::Display for Quantum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.spin % 2 == 0 {
            write!(f, "(N={}, S={}, irrep={})", self.particles, self.spin / 2, self.irrep)
        } else {
            write!(f, "(N={}, S={}/2, irrep={})", self.particles, self.spin, self.irrep)
        }
    }
}
