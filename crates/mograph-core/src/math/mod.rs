//! Deterministic math helpers covering scalar utilities, vectors,
//! quaternions, and seedable pseudo-random numbers.
//!
//! All operations round to `f32` so identical inputs produce identical
//! graphs and walks across runs and platforms.

mod prng;
mod quat;
mod vec3;

pub use prng::Prng;
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range using float32 rounding.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "invalid clamp range: {min} > {max}");
    value.max(min).min(max)
}

/// Linear interpolation `a + t * (b - a)` with float32 rounding.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
