//! Scratch memory for the fused multiply kernels.
//!
//! The engine only needs an allocate/deallocate contract; where the memory
//! comes from is up to the caller. [`HeapArena`] is a heap-backed
//! implementation that tracks current and peak usage.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of scratch buffers.
pub trait ScratchArena: Send + Sync {
    /// A zeroed buffer of `len` elements.
    fn allocate(&self, len: usize) -> Vec<f64>;

    /// Return a buffer obtained from [`ScratchArena::allocate`].
    fn deallocate(&self, buffer: Vec<f64>);
}

/// Heap-backed [`ScratchArena`] with usage accounting.
///
/// # Example
///
/// ```
/// use spinblock::arena::{HeapArena, ScratchArena};
///
/// let arena = HeapArena::new();
/// let buf = arena.allocate(128);
/// assert_eq!(arena.in_use(), 128);
/// arena.deallocate(buf);
/// assert_eq!(arena.in_use(), 0);
/// assert_eq!(arena.peak(), 128);
/// ```
#[derive(Debug, Default)]
pub struct HeapArena {
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl HeapArena {
    /// Create an arena with zero usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements currently handed out.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Largest simultaneous usage seen.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

impl ScratchArena for HeapArena {
    fn allocate(&self, len: usize) -> Vec<f64> {
        let now = self.in_use.fetch_add(len, Ordering::Relaxed) + len;
        self.peak.fetch_max(now, Ordering::Relaxed);
        log::trace!("scratch allocate {len} (in use {now})");
        vec![0.0; len]
    }

    fn deallocate(&self, buffer: Vec<f64>) {
        let len = buffer.len();
        let before = self.in_use.fetch_sub(len, Ordering::Relaxed);
        debug_assert!(before >= len, "scratch arena released more than it handed out");
        log::trace!("scratch release {len} (in use {})", before.saturating_sub(len));
    }
}
