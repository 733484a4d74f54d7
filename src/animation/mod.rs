//! Time-based value animation and the randomness behind it.

pub mod easing;
pub mod noise;
pub mod random;
pub mod tween;
