use std::f32::consts::PI;

/// Easing curves mapping normalized progress in `[0, 1]` to eased progress.
///
/// Every curve maps 0 to 0 and 1 to 1. The `InOut` variants are point
/// symmetric around `(0.5, 0.5)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
}

impl Easing {
    /// Input outside `[0, 1]` is clamped first.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticIn => t * t,
            Easing::QuadraticOut => t * (2.0 - t),
            Easing::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SinusoidalIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SinusoidalOut => (t * PI / 2.0).sin(),
            Easing::SinusoidalInOut => 0.5 * (1.0 - (PI * t).cos()),
            Easing::ExponentialIn => {
                if t == 0.0 {
                    0.0
                } else {
                    1024f32.powf(t - 1.0)
                }
            }
            Easing::ExponentialOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::ExponentialInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    0.5 * 1024f32.powf(2.0 * t - 1.0)
                } else {
                    0.5 * (2.0 - 2f32.powf(-10.0 * (2.0 * t - 1.0)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::QuadraticIn,
        Easing::QuadraticOut,
        Easing::QuadraticInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::SinusoidalIn,
        Easing::SinusoidalOut,
        Easing::SinusoidalInOut,
        Easing::ExponentialIn,
        Easing::ExponentialOut,
        Easing::ExponentialInOut,
    ];

    #[test]
    fn every_curve_pins_its_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-3, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{easing:?}");
        }
    }

    #[test]
    fn in_out_curves_are_point_symmetric() {
        for easing in [
            Easing::QuadraticInOut,
            Easing::CubicInOut,
            Easing::SinusoidalInOut,
        ] {
            for step in 0..=100 {
                let t = step as f32 / 100.0;
                let sum = easing.apply(t) + easing.apply(1.0 - t);
                assert!((sum - 1.0).abs() < 1e-5, "{easing:?} at {t}: {sum}");
            }
        }
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        assert_eq!(Easing::QuadraticIn.apply(-1.0), 0.0);
        assert_eq!(Easing::QuadraticIn.apply(2.0), 1.0);
    }
}
