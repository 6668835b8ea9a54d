//! Engine context.
//!
//! Everything an engine call needs besides its operands: the worker pool, the
//! recoupling provider, the symmetry mode and the scratch arena. A context is
//! built once and passed by reference to every operation in [`crate::ops`].
//!
//! # Example
//!
//! ```
//! use spinblock::context::EngineContext;
//! use spinblock::quantum::SymmetryMode;
//!
//! let ctx = EngineContext::builder()
//!     .threads(2)
//!     .mode(SymmetryMode::SpinAdapted)
//!     .build()
//!     .unwrap();
//! assert_eq!(ctx.threads(), 2);
//! ```

use std::sync::Arc;

use crate::arena::{HeapArena, ScratchArena};
use crate::coupling::{CouplingTable, Recoupling};
use crate::error::SpinBlockError;
use crate::quantum::{Quantum, SymmetryMode};

/// Runtime parameters of an [`EngineContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads in the context's pool.
    pub threads: usize,
    /// How spin labels couple.
    pub mode: SymmetryMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            mode: SymmetryMode::SpinAdapted,
        }
    }
}

/// Shared state of the tensor-algebra engine.
pub struct EngineContext {
    config: EngineConfig,
    pool: rayon::ThreadPool,
    coupling: Arc<dyn Recoupling>,
    arena: Arc<dyn ScratchArena>,
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EngineContext {
    /// Context with a fresh [`CouplingTable`] and [`HeapArena`].
    pub fn new(config: EngineConfig) -> Result<Self, SpinBlockError> {
        EngineContextBuilder {
            config,
            ..EngineContextBuilder::default()
        }
        .build()
    }

    /// Start from the default configuration.
    pub fn builder() -> EngineContextBuilder {
        EngineContextBuilder::default()
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of workers.
    #[inline]
    pub fn threads(&self) -> usize {
        self.config.threads
    }

    /// Coupling mode.
    #[inline]
    pub fn mode(&self) -> SymmetryMode {
        self.config.mode
    }

    /// Recoupling provider.
    #[inline]
    pub fn coupling(&self) -> &dyn Recoupling {
        self.coupling.as_ref()
    }

    /// Scratch arena.
    #[inline]
    pub fn arena(&self) -> &dyn ScratchArena {
        self.arena.as_ref()
    }

    /// Run `op` inside the context's pool.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Full 9j recoupling weight (spin times spatial) for one contribution.
    ///
    /// Each argument is a `(left, right, total)` triple; `ket`, `op` and `bra`
    /// are the three rows of the 9j array. In projected-spin mode only the
    /// spatial factor remains.
    pub fn ninej(&self, ket: [Quantum; 3], op: [Quantum; 3], bra: [Quantum; 3]) -> f64 {
        let rows = [ket, op, bra];
        let irreps: [u8; 9] = std::array::from_fn(|k| rows[k / 3][k % 3].irrep);
        let spatial = self.coupling.spatial_ninej(irreps);
        match self.config.mode {
            SymmetryMode::SpinAdapted => {
                let spins: [i32; 9] = std::array::from_fn(|k| rows[k / 3][k % 3].spin);
                spatial * self.coupling.ninej(spins)
            }
            SymmetryMode::ProjectedSpin => spatial,
        }
    }
}

/// Builder for [`EngineContext`].
#[derive(Default)]
pub struct EngineContextBuilder {
    config: EngineConfig,
    coupling: Option<Arc<dyn Recoupling>>,
    arena: Option<Arc<dyn ScratchArena>>,
}

impl EngineContextBuilder {
    /// Worker count; zero is treated as one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Coupling mode.
    pub fn mode(mut self, mode: SymmetryMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Use a shared recoupling provider instead of a fresh table.
    pub fn coupling(mut self, coupling: Arc<dyn Recoupling>) -> Self {
        self.coupling = Some(coupling);
        self
    }

    /// Use a caller-provided scratch arena.
    pub fn arena(mut self, arena: Arc<dyn ScratchArena>) -> Self {
        self.arena = Some(arena);
        self
    }

    /// Start the worker pool.
    pub fn build(self) -> Result<EngineContext, SpinBlockError> {
        let mut config = self.config;
        config.threads = config.threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("spinblock-{i}"))
            .build()?;
        log::debug!("engine context: {} workers, {:?}", config.threads, config.mode);
        Ok(EngineContext {
            config,
            pool,
            coupling: self.coupling.unwrap_or_else(|| Arc::new(CouplingTable::new())),
            arena: self.arena.unwrap_or_else(|| Arc::new(HeapArena::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builder_defaults() {
        let ctx = EngineContext::builder().threads(0).build().unwrap();
        assert_eq!(ctx.threads(), 1);
        assert_eq!(ctx.mode(), SymmetryMode::SpinAdapted);
    }

    #[test]
    fn test_install_runs_on_pool() {
        let ctx = EngineContext::new(EngineConfig {
            threads: 2,
            mode: SymmetryMode::ProjectedSpin,
        })
        .unwrap();
        let index = ctx.install(rayon::current_thread_index);
        assert!(index.is_some_and(|i| i < 2));
    }

    #[test]
    fn test_ninej_modes() {
        let vac = Quantum::vacuum();
        let half = Quantum::new(1, 1, 0);
        let ket = [vac, vac, vac];
        let op = [half, vac, half];
        let bra = [half, vac, half];

        let adapted = EngineContext::builder().threads(1).build().unwrap();
        assert_relative_eq!(adapted.ninej(ket, op, bra), 1.0, epsilon = 1e-14);

        let projected = EngineContext::builder()
            .threads(1)
            .mode(SymmetryMode::ProjectedSpin)
            .build()
            .unwrap();
        let zero_in_spin_mode = [vac, half, vac];
        assert_eq!(projected.ninej(ket, zero_in_spin_mode, bra), 1.0);
    }

    #[test]
    fn test_shared_coupling_table() {
        let table = Arc::new(CouplingTable::new());
        let ctx = EngineContext::builder()
            .threads(1)
            .coupling(table.clone())
            .build()
            .unwrap();
        let vac = Quantum::vacuum();
        ctx.ninej([vac; 3], [vac; 3], [vac; 3]);
        assert_eq!(table.len(), 1);
    }
}
