//! Block-parallel execution helpers.
//!
//! Every multi-block operation splits its output into disjoint block views
//! and processes them on the context's rayon pool. Kernels that need scratch
//! memory run in lanes instead: the views are dealt round-robin to one lane
//! per scratch buffer, and each lane owns its buffer for the whole region.

use rayon::prelude::*;

use crate::arena::ScratchArena;
use crate::context::EngineContext;
use crate::storage::BlockViewMut;

/// Run `kernel` once per output block on the context's pool.
///
/// Tasks are not batched, so a few expensive blocks cannot starve the rest
/// of the workers.
pub(crate) fn for_each_block<'a, F>(ctx: &EngineContext, views: Vec<BlockViewMut<'a>>, kernel: F)
where
    F: Fn(BlockViewMut<'a>) + Send + Sync,
{
    ctx.install(|| views.into_par_iter().with_max_len(1).for_each(kernel));
}

/// Run `kernel` once per output block, handing it the scratch buffer of the
/// lane the block was dealt to.
pub(crate) fn for_each_block_with_scratch<'a, F>(
    ctx: &EngineContext,
    views: Vec<BlockViewMut<'a>>,
    scratch: &mut ScratchPool<'_>,
    kernel: F,
) where
    F: Fn(BlockViewMut<'a>, &mut [f64]) + Send + Sync,
{
    let lanes = scratch.buffers.len();
    let mut dealt: Vec<Vec<BlockViewMut<'a>>> = (0..lanes).map(|_| Vec::new()).collect();
    for (i, view) in views.into_iter().enumerate() {
        dealt[i % lanes].push(view);
    }
    ctx.install(|| {
        dealt
            .into_par_iter()
            .zip(scratch.buffers.par_iter_mut())
            .with_max_len(1)
            .for_each(|(lane, buffer)| {
                for view in lane {
                    kernel(view, buffer.as_mut_slice());
                }
            })
    });
}

/// Per-worker scratch buffers claimed from an arena for one parallel region.
///
/// Buffers go back to the arena when the pool is dropped.
pub(crate) struct ScratchPool<'a> {
    arena: &'a dyn ScratchArena,
    buffers: Vec<Vec<f64>>,
}

impl<'a> ScratchPool<'a> {
    /// Claim `workers` buffers of `len` elements each.
    pub(crate) fn claim(arena: &'a dyn ScratchArena, workers: usize, len: usize) -> Self {
        let buffers = (0..workers.max(1)).map(|_| arena.allocate(len)).collect();
        Self { arena, buffers }
    }
}

impl Drop for ScratchPool<'_> {
    fn drop(&mut self) {
        for buffer in self.buffers.drain(..) {
            self.arena.deallocate(buffer);
        }
    }
}
