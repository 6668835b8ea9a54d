//! Dense kernels applied to single blocks.
//!
//! Parallelism happens one level up, over blocks, so every kernel here runs
//! sequentially (`Par::Seq`).

use faer::linalg::matmul::matmul;
use faer::{Accum, MatMut, MatRef, Par};

/// `dst = alpha · lhs · rhs` (`Accum::Replace`) or `dst += alpha · lhs · rhs`
/// (`Accum::Add`).
#[inline]
pub fn gemm(
    dst: MatMut<'_, f64>,
    accum: Accum,
    lhs: MatRef<'_, f64>,
    rhs: MatRef<'_, f64>,
    alpha: f64,
) {
    matmul(dst, accum, lhs, rhs, alpha, Par::Seq);
}

/// Which factor of a Kronecker product is the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityFactor {
    /// `a ⊗ I`
    Right,
    /// `I ⊗ a`
    Left,
}

/// Accumulate `alpha · (a ⊗ b)` into the window of `dst` starting at
/// `(row0, col0)`.
///
/// Rows of the product are ordered left-major: `(i, k) ↦ i · b.nrows() + k`.
pub fn kron_add(
    dst: &mut MatMut<'_, f64>,
    row0: usize,
    col0: usize,
    a: MatRef<'_, f64>,
    b: MatRef<'_, f64>,
    alpha: f64,
) {
    let (bm, bn) = (b.nrows(), b.ncols());
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            let aij = alpha * a[(i, j)];
            if aij == 0.0 {
                continue;
            }
            for l in 0..bn {
                for k in 0..bm {
                    dst[(row0 + i * bm + k, col0 + j * bn + l)] += aij * b[(k, l)];
                }
            }
        }
    }
}

/// Accumulate `alpha · (a ⊗ I_n)` or `alpha · (I_n ⊗ a)` into `dst` at
/// `(row0, col0)` without materialising the identity.
pub fn kron_identity_add(
    dst: &mut MatMut<'_, f64>,
    row0: usize,
    col0: usize,
    a: MatRef<'_, f64>,
    n: usize,
    identity: IdentityFactor,
    alpha: f64,
) {
    let (am, an) = (a.nrows(), a.ncols());
    for j in 0..an {
        for i in 0..am {
            let aij = alpha * a[(i, j)];
            if aij == 0.0 {
                continue;
            }
            for k in 0..n {
                match identity {
                    IdentityFactor::Right => dst[(row0 + i * n + k, col0 + j * n + k)] += aij,
                    IdentityFactor::Left => dst[(row0 + k * am + i, col0 + k * an + j)] += aij,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use faer::Mat;

    #[test]
    fn test_gemm_accumulates() {
        let a = Mat::from_fn(2, 3, |i, j| (i + 2 * j) as f64);
        let b = Mat::from_fn(3, 2, |i, j| (i * j) as f64 + 1.0);
        let mut c = Mat::from_fn(2, 2, |_, _| 1.0);
        gemm(c.as_mut(), Accum::Add, a.as_ref(), b.as_ref(), 2.0);
        for i in 0..2 {
            for j in 0..2 {
                let expected: f64 = (0..3).map(|k| a[(i, k)] * b[(k, j)]).sum();
                assert_relative_eq!(c[(i, j)], 1.0 + 2.0 * expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_kron_add_layout() {
        let a = Mat::from_fn(2, 1, |i, _| (i + 1) as f64);
        let b = Mat::from_fn(1, 2, |_, j| (10 * (j + 1)) as f64);
        let mut dst = Mat::<f64>::zeros(3, 3);
        kron_add(&mut dst.as_mut(), 1, 1, a.as_ref(), b.as_ref(), 1.0);
        // a ⊗ b = [[10, 20], [20, 40]] placed at (1, 1)
        assert_eq!(dst[(1, 1)], 10.0);
        assert_eq!(dst[(1, 2)], 20.0);
        assert_eq!(dst[(2, 1)], 20.0);
        assert_eq!(dst[(2, 2)], 40.0);
        assert_eq!(dst[(0, 0)], 0.0);
    }

    #[test]
    fn test_kron_identity_matches_explicit_identity() {
        let a = Mat::from_fn(2, 3, |i, j| (3 * i + j) as f64 - 2.0);
        let eye = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        for identity in [IdentityFactor::Right, IdentityFactor::Left] {
            let mut fast = Mat::<f64>::zeros(4, 6);
            let mut slow = Mat::<f64>::zeros(4, 6);
            kron_identity_add(&mut fast.as_mut(), 0, 0, a.as_ref(), 2, identity, 0.5);
            let (lhs, rhs) = match identity {
                IdentityFactor::Right => (a.as_ref(), eye.as_ref()),
                IdentityFactor::Left => (eye.as_ref(), a.as_ref()),
            };
            kron_add(&mut slow.as_mut(), 0, 0, lhs, rhs, 0.5);
            for i in 0..4 {
                for j in 0..6 {
                    assert_eq!(fast[(i, j)], slow[(i, j)]);
                }
            }
        }
    }
}
