//! Renormalization of an operator into a truncated basis.
//!
//! A truncation is described per old label by a dense `old_states ×
//! kept_states` transform. Labels whose transform has no columns are
//! discarded, and the surviving labels, in order, must be exactly the labels
//! of the new basis.

use faer::{Accum, Mat};
use log::debug;

use crate::backend::gemm;
use crate::basis::{BasisArena, BasisId};
use crate::context::EngineContext;
use crate::operator::SparseOperator;
use crate::parallel::for_each_block;
use crate::storage::{Block, BlockMatrix};

use super::{NEGLIGIBLE_SCALE, assert_operand, assert_output};

/// One side of a truncation.
#[derive(Clone, Copy, Debug)]
pub struct RotationSide<'a> {
    /// Basis before truncation.
    pub old: BasisId,
    /// Basis after truncation.
    pub new: BasisId,
    /// One transform per old label.
    pub transforms: &'a [Mat<f64>],
}

/// Truncation applied to an operator.
#[derive(Clone, Copy, Debug)]
pub enum Rotation<'a> {
    /// Bra and ket share one truncation.
    Symmetric(RotationSide<'a>),
    /// Independent bra and ket truncations.
    Asymmetric {
        bra: RotationSide<'a>,
        ket: RotationSide<'a>,
    },
}

impl<'a> Rotation<'a> {
    fn sides(&self) -> (&RotationSide<'a>, &RotationSide<'a>) {
        match self {
            Rotation::Symmetric(side) => (side, side),
            Rotation::Asymmetric { bra, ket } => (bra, ket),
        }
    }
}

/// Old label of every new label, plus the inverse map.
#[derive(Clone, Debug)]
struct LabelMap {
    old_of_new: Vec<usize>,
    new_of_old: Vec<Option<usize>>,
}

impl LabelMap {
    fn build(bases: &BasisArena, side: &RotationSide<'_>) -> Self {
        let old = &bases[side.old];
        let new = &bases[side.new];
        assert_eq!(
            side.transforms.len(),
            old.n_labels(),
            "rotation needs one transform per old label ({} given, {} labels)",
            side.transforms.len(),
            old.n_labels()
        );

        let mut old_of_new = Vec::with_capacity(new.n_labels());
        let mut new_of_old = vec![None; old.n_labels()];
        for (q, u) in side.transforms.iter().enumerate() {
            if u.ncols() == 0 {
                continue;
            }
            assert_eq!(
                u.nrows(),
                old.states(q),
                "transform of old label {q} has {} rows but the label has {} states",
                u.nrows(),
                old.states(q)
            );
            new_of_old[q] = Some(old_of_new.len());
            old_of_new.push(q);
        }
        assert_eq!(
            old_of_new.len(),
            new.n_labels(),
            "rotation keeps {} labels but the new basis has {}",
            old_of_new.len(),
            new.n_labels()
        );
        for (n, &q) in old_of_new.iter().enumerate() {
            assert_eq!(
                side.transforms[q].ncols(),
                new.states(n),
                "transform of old label {q} keeps {} states but new label {n} has {}",
                side.transforms[q].ncols(),
                new.states(n)
            );
        }
        Self {
            old_of_new,
            new_of_old,
        }
    }
}

/// Both sides of a rotation with their label maps.
struct RotationPlan<'r, 'a> {
    bra: &'r RotationSide<'a>,
    ket: &'r RotationSide<'a>,
    bra_map: LabelMap,
    ket_map: LabelMap,
}

impl<'r, 'a> RotationPlan<'r, 'a> {
    fn new(bases: &BasisArena, rotation: &'r Rotation<'a>) -> Self {
        let (bra, ket) = rotation.sides();
        let bra_map = LabelMap::build(bases, bra);
        let ket_map = match rotation {
            Rotation::Symmetric(_) => bra_map.clone(),
            Rotation::Asymmetric { .. } => LabelMap::build(bases, ket),
        };
        Self {
            bra,
            ket,
            bra_map,
            ket_map,
        }
    }
}

/// Rotate `a` into the truncated basis, returning a new operator.
///
/// The result uses the normal convention, has `a`'s logical shift and holds
/// exactly the images of `a`'s blocks between retained labels.
///
/// # Panics
///
/// Panics if a side keeps a different number of labels than its new basis
/// has, a transform has the wrong shape, or `a` does not match the old bases.
pub fn tensor_rotate(
    ctx: &EngineContext,
    bases: &BasisArena,
    a: &SparseOperator,
    rotation: &Rotation<'_>,
    scale: f64,
) -> SparseOperator {
    let plan = RotationPlan::new(bases, rotation);
    let blocks: Vec<Block> = a
        .blocks()
        .into_iter()
        .filter_map(|block| {
            let row = plan.bra_map.new_of_old.get(block.row).copied().flatten()?;
            let col = plan.ket_map.new_of_old.get(block.col).copied().flatten()?;
            Some(Block::new(row, col))
        })
        .collect();
    let mut rotated = SparseOperator::from_blocks(
        a.delta(),
        &blocks,
        &bases[plan.bra.new],
        &bases[plan.ket.new],
        a.mode(),
    );
    rotate_planned(ctx, bases, a, &plan, &mut rotated, scale);
    rotated
}

/// Accumulate `scale · Uᵀ_bra · a · U_ket` into the existing blocks of `c`.
///
/// Blocks of `c` whose source block is absent in `a` are left untouched.
///
/// # Panics
///
/// Same conditions as [`tensor_rotate`], plus `c` being transposed or not
/// matching the new bases.
pub fn tensor_rotate_into(
    ctx: &EngineContext,
    bases: &BasisArena,
    a: &SparseOperator,
    rotation: &Rotation<'_>,
    c: &mut SparseOperator,
    scale: f64,
) {
    let plan = RotationPlan::new(bases, rotation);
    rotate_planned(ctx, bases, a, &plan, c, scale);
}

fn rotate_planned(
    ctx: &EngineContext,
    bases: &BasisArena,
    a: &SparseOperator,
    plan: &RotationPlan<'_, '_>,
    c: &mut SparseOperator,
    scale: f64,
) {
    if scale.abs() < NEGLIGIBLE_SCALE {
        return;
    }
    let (bra_old, ket_old) = (&bases[plan.bra.old], &bases[plan.ket.old]);
    assert_operand("a", a, bra_old, ket_old);
    assert_output(c, &bases[plan.bra.new], &bases[plan.ket.new]);

    let views = c.storage_mut().split_blocks_mut();
    debug!(
        "rotate bra {} -> {}, ket {} -> {}: {} output blocks",
        plan.bra.old,
        plan.bra.new,
        plan.ket.old,
        plan.ket.new,
        views.len()
    );
    for_each_block(ctx, views, |mut view| {
        let target = view.block();
        let q = plan.bra_map.old_of_new[target.row];
        let qp = plan.ket_map.old_of_new[target.col];
        let Some(block) = a.element(q, qp) else {
            return;
        };
        let alpha = scale * a.scaling(&bra_old.quantum(q), &ket_old.quantum(qp));
        if alpha.abs() < NEGLIGIBLE_SCALE {
            return;
        }
        let (u_bra, u_ket) = (&plan.bra.transforms[q], &plan.ket.transforms[qp]);
        let mut half = Mat::<f64>::zeros(u_bra.ncols(), block.ncols());
        gemm(half.as_mut(), Accum::Replace, u_bra.transpose(), block, 1.0);
        gemm(view.as_mat_mut(), Accum::Add, half.as_ref(), u_ket.as_ref(), alpha);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::{Quantum, SymmetryMode};
    use approx::assert_relative_eq;

    #[test]
    fn test_label_map_skips_discarded() {
        let mut bases = BasisArena::new();
        let q = [Quantum::new(0, 0, 0), Quantum::new(1, 1, 0), Quantum::new(2, 0, 0)];
        let old = bases.leaf(q.to_vec(), vec![2, 2, 1]).unwrap();
        let new = bases.leaf(vec![q[0], q[2]], vec![1, 1]).unwrap();
        let transforms = [Mat::from_fn(2, 1, |_, _| 1.0), Mat::zeros(2, 0), Mat::from_fn(1, 1, |_, _| 1.0)];
        let side = RotationSide {
            old,
            new,
            transforms: &transforms,
        };
        let map = LabelMap::build(&bases, &side);
        assert_eq!(map.old_of_new, vec![0, 2]);
        assert_eq!(map.new_of_old, vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn test_plan_maps_each_side() {
        let mut bases = BasisArena::new();
        let q = [Quantum::new(0, 0, 0), Quantum::new(1, 1, 0), Quantum::new(2, 0, 0)];
        let old = bases.leaf(q.to_vec(), vec![2, 2, 1]).unwrap();
        let bra_new = bases.leaf(vec![q[0], q[2]], vec![1, 1]).unwrap();
        let ket_new = bases.leaf(vec![q[1]], vec![2]).unwrap();
        let bra_u = [Mat::from_fn(2, 1, |_, _| 1.0), Mat::zeros(2, 0), Mat::from_fn(1, 1, |_, _| 1.0)];
        let ket_u = [Mat::zeros(2, 0), Mat::from_fn(2, 2, |i, j| (i + j) as f64), Mat::zeros(1, 0)];
        let bra = RotationSide {
            old,
            new: bra_new,
            transforms: &bra_u,
        };
        let ket = RotationSide {
            old,
            new: ket_new,
            transforms: &ket_u,
        };

        let symmetric = Rotation::Symmetric(bra);
        let plan = RotationPlan::new(&bases, &symmetric);
        assert_eq!(plan.bra_map.old_of_new, vec![0, 2]);
        assert_eq!(plan.ket_map.old_of_new, vec![0, 2]);

        let asymmetric = Rotation::Asymmetric { bra, ket };
        let plan = RotationPlan::new(&bases, &asymmetric);
        assert_eq!(plan.bra_map.old_of_new, vec![0, 2]);
        assert_eq!(plan.ket_map.old_of_new, vec![1]);
        assert_eq!(plan.ket_map.new_of_old, vec![None, Some(0), None]);
        assert_eq!((plan.bra.new, plan.ket.new), (bra_new, ket_new));
    }

    #[test]
    fn test_identity_transform_keeps_values() {
        let ctx = EngineContext::builder().threads(1).build().unwrap();
        let mut bases = BasisArena::new();
        let q = vec![Quantum::new(0, 0, 0), Quantum::new(1, 1, 0)];
        let old = bases.leaf(q.clone(), vec![2, 1]).unwrap();
        let new = bases.leaf(q, vec![2, 1]).unwrap();
        let transforms = [
            Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 }),
            Mat::from_fn(1, 1, |_, _| 1.0),
        ];
        let rotation = Rotation::Symmetric(RotationSide {
            old,
            new,
            transforms: &transforms,
        });
        let mut a = SparseOperator::zeros(Quantum::new(1, 1, 0), &bases[old], &bases[old], SymmetryMode::SpinAdapted);
        a.set_element(1, 0, Mat::from_fn(1, 2, |_, j| j as f64 - 4.0).as_ref())
            .unwrap();

        let rotated = tensor_rotate(&ctx, &bases, &a, &rotation, 0.5);
        let block = rotated.element(1, 0).unwrap();
        assert_relative_eq!(block[(0, 0)], -2.0, epsilon = 1e-14);
        assert_relative_eq!(block[(0, 1)], -1.5, epsilon = 1e-14);
    }
}
