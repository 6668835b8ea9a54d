//! Wigner 6j and 9j symbols.
//!
//! All angular momenta are passed doubled (`2j`), so half-integer spins stay
//! integral. The symbols are evaluated exactly by `wigner_symbols` and
//! rounded to `f64`; symbols whose triangle conditions fail are zero.

use wigner_symbols::{Wigner6j, Wigner9j};

use crate::quantum::triangle;

/// `(-1)^n`.
#[inline]
pub fn phase(n: i32) -> f64 {
    if n.rem_euclid(2) == 1 {
        -1.0
    } else {
        1.0
    }
}

/// Wigner 6j symbol `{a b c; d e f}`.
pub fn sixj(a: i32, b: i32, c: i32, d: i32, e: i32, f: i32) -> f64 {
    if !(triangle(a, b, c) && triangle(a, e, f) && triangle(d, b, f) && triangle(d, e, c)) {
        return 0.0;
    }
    let symbol = Wigner6j {
        tj1: a,
        tj2: b,
        tj3: c,
        tj4: d,
        tj5: e,
        tj6: f,
    };
    f64::from(symbol.value())
}

/// Wigner 9j symbol, rows `{j[0] j[1] j[2]; j[3] j[4] j[5]; j[6] j[7] j[8]}`.
pub fn ninej(j: [i32; 9]) -> f64 {
    let [j1, j2, j3, j4, j5, j6, j7, j8, j9] = j;
    let rows = triangle(j1, j2, j3) && triangle(j4, j5, j6) && triangle(j7, j8, j9);
    let cols = triangle(j1, j4, j7) && triangle(j2, j5, j8) && triangle(j3, j6, j9);
    if !(rows && cols) {
        return 0.0;
    }
    let symbol = Wigner9j {
        tj1: j1,
        tj2: j2,
        tj3: j3,
        tj4: j4,
        tj5: j5,
        tj6: j6,
        tj7: j7,
        tj8: j8,
        tj9: j9,
    };
    f64::from(symbol.value())
}

/// Unitary (normalised) 9j coefficient used to recouple a product of two
/// tensor operators.
///
/// Rows are `(ket_left, ket_right, ket_total; k_left, k_right, k_total;
/// bra_left, bra_right, bra_total)`.
pub fn ninej_normalized(j: [i32; 9]) -> f64 {
    let norm = f64::from((j[2] + 1) * (j[5] + 1) * (j[6] + 1) * (j[7] + 1)).sqrt();
    norm * ninej(j)
}

/// Racah W coefficient `W(abcd; ef)`.
pub fn racah(a: i32, b: i32, c: i32, d: i32, e: i32, f: i32) -> f64 {
    phase((a + b + c + d) / 2) * sixj(a, b, e, d, c, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sixj_known_values() {
        // {1/2 1/2 0; 1/2 1/2 0}
        assert_relative_eq!(sixj(1, 1, 0, 1, 1, 0), -0.5, epsilon = 1e-14);
        // {1 1 1; 1 1 1}
        assert_relative_eq!(sixj(2, 2, 2, 2, 2, 2), 1.0 / 6.0, epsilon = 1e-14);
    }

    #[test]
    fn test_sixj_with_zero() {
        // {a b c; b a 0} = (-1)^(a+b+c) / sqrt((2a+1)(2b+1))
        for (a, b, c) in [(1, 2, 1), (2, 2, 2), (3, 1, 2), (4, 2, 2)] {
            let expected = phase((a + b + c) / 2) / f64::from((a + 1) * (b + 1)).sqrt();
            assert_relative_eq!(sixj(a, b, c, b, a, 0), expected, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_sixj_column_symmetry() {
        let base = sixj(3, 2, 1, 2, 3, 4);
        assert_relative_eq!(sixj(2, 3, 1, 3, 2, 4), base, epsilon = 1e-13);
        assert_relative_eq!(sixj(1, 2, 3, 4, 3, 2), base, epsilon = 1e-13);
        // upper/lower exchange in two columns
        assert_relative_eq!(sixj(2, 3, 1, 3, 2, 4), sixj(2, 2, 4, 3, 3, 1), epsilon = 1e-13);
    }

    #[test]
    fn test_sixj_triangle_violation() {
        assert_eq!(sixj(1, 1, 4, 1, 1, 0), 0.0);
        assert_eq!(sixj(1, 1, 1, 1, 1, 1), 0.0);
    }

    #[test]
    fn test_ninej_known_values() {
        // {0 0 0; 1/2 0 1/2; 1/2 0 1/2}
        assert_relative_eq!(ninej([0, 0, 0, 1, 0, 1, 1, 0, 1]), 0.5, epsilon = 1e-14);
        // {0 1/2 1/2; 1/2 0 1/2; 1/2 1/2 0}
        assert_relative_eq!(ninej([0, 1, 1, 1, 0, 1, 1, 1, 0]), -0.25, epsilon = 1e-14);
        // {0 1/2 1/2; 1/2 0 1/2; 1/2 1/2 1}
        assert_relative_eq!(ninej([0, 1, 1, 1, 0, 1, 1, 1, 2]), 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_ninej_reduces_to_sixj() {
        // {a b c; d e f; g h 0} = δ(c,f) δ(g,h) (-1)^(b+c+d+g) / sqrt((2c+1)(2g+1)) {a b c; e d g}
        let (a, b, c, d, e, g) = (2, 1, 1, 1, 2, 3);
        let expected = phase((b + c + d + g) / 2) / f64::from((c + 1) * (g + 1)).sqrt()
            * sixj(a, b, c, e, d, g);
        assert_relative_eq!(ninej([a, b, c, d, e, c, g, g, 0]), expected, epsilon = 1e-13);
    }

    #[test]
    fn test_ninej_transpose_symmetry() {
        let j = [2, 1, 1, 1, 2, 3, 3, 3, 2];
        let transposed = [j[0], j[3], j[6], j[1], j[4], j[7], j[2], j[5], j[8]];
        assert_relative_eq!(ninej(j), ninej(transposed), epsilon = 1e-13);
    }

    #[test]
    fn test_normalized_identity_slot() {
        assert_relative_eq!(
            ninej_normalized([0, 0, 0, 1, 0, 1, 1, 0, 1]),
            1.0,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            ninej_normalized([0, 1, 1, 1, 0, 1, 1, 1, 0]),
            -1.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_racah_sign() {
        // W(abcd; ef) = (-1)^((a+b+c+d)/2) {a b e; d c f}
        assert_relative_eq!(racah(1, 1, 1, 1, 0, 0), sixj(1, 1, 0, 1, 1, 0), epsilon = 1e-14);
        assert_relative_eq!(racah(2, 2, 2, 2, 2, 2), sixj(2, 2, 2, 2, 2, 2), epsilon = 1e-14);
        assert_relative_eq!(racah(1, 1, 2, 2, 2, 1), -sixj(1, 1, 2, 2, 2, 1), epsilon = 1e-14);
    }
}
