//! Fermionic reordering signs.
//!
//! Each contraction that moves a fermionic operator past a fermionic factor
//! state has its own named rule. They share the same parity arithmetic but
//! are kept apart so every call site states which exchange it performs.

use crate::quantum::Quantum;

#[inline]
fn exchange(op_fermion: bool, passed: &Quantum) -> f64 {
    if op_fermion && passed.is_fermion() { -1.0 } else { 1.0 }
}

/// `I⊗a`: `a` acts on the right factor and passes the left label.
#[inline]
pub fn trace_left(a_fermion: bool, left: &Quantum) -> f64 {
    exchange(a_fermion, left)
}

/// `a⊗b`: `b` passes the ket-side left label.
#[inline]
pub fn product(b_fermion: bool, ket_left: &Quantum) -> f64 {
    exchange(b_fermion, ket_left)
}

/// Fused `(a⊗b)·ψ`: `b` passes the ket-side left label of `ψ`.
#[inline]
pub fn multiply(b_fermion: bool, ket_left: &Quantum) -> f64 {
    exchange(b_fermion, ket_left)
}

/// Fused `(I⊗a)·ψ`: `a` passes the left label of `ψ`.
#[inline]
pub fn trace_multiply_left(a_fermion: bool, left: &Quantum) -> f64 {
    exchange(a_fermion, left)
}
