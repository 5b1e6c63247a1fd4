//! Transcendental `f64` functions for the `no_std` build.
//!
//! `core` has no `exp`/`ln`/`powf` (those are std intrinsics backed by the
//! platform's libm); AdaptSize's hit-rate model needs them regardless of
//! whether `std` is enabled, so this delegates to `libm` directly. Under
//! `std` the two are numerically equivalent; using `libm` unconditionally
//! keeps one code path instead of two.

#[inline]
pub(crate) fn exp(x: f64) -> f64 {
    libm::exp(x)
}

#[inline]
pub(crate) fn exp_m1(x: f64) -> f64 {
    libm::expm1(x)
}

#[inline]
pub(crate) fn powf(x: f64, y: f64) -> f64 {
    libm::pow(x, y)
}

#[inline]
pub(crate) fn log2(x: f64) -> f64 {
    libm::log2(x)
}
