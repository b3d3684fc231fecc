//! Easing curves.
//!
//! A curve remaps normalized progress `t` in `[0, 1]`. Every curve maps
//! `0.0` to `0.0` and `1.0` to `1.0` exactly; in between, bounce and elastic
//! curves (and cubics with control points outside `[0, 1]`) may leave the unit
//! range to produce overshoot.
//!
//! ## Built-in Curves
//!
//! - [`Curve::Linear`] - Identity
//! - [`Curve::Cubic`] - CSS-style cubic bezier, see the associated constants
//!   such as [`Curve::EASE_IN`] and [`Curve::FAST_OUT_SLOW_IN`]
//! - [`Curve::Interval`] - Runs an inner curve within a sub-range of `[0, 1]`
//! - [`Curve::Custom`] - User-defined function

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Control points of a cubic bezier from (0, 0) to (1, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

const CUBIC_ERROR_BOUND: f32 = 0.001;

impl Cubic {
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    fn evaluate(a: f32, b: f32, m: f32) -> f32 {
        3.0 * a * (1.0 - m) * (1.0 - m) * m + 3.0 * b * (1.0 - m) * m * m + m * m * m
    }

    /// Bisect on the x polynomial, then evaluate y at the found parameter.
    fn transform(&self, t: f32) -> f32 {
        let mut start = 0.0f32;
        let mut end = 1.0f32;
        loop {
            let midpoint = (start + end) / 2.0;
            let estimate = Self::evaluate(self.a, self.c, midpoint);
            if (t - estimate).abs() < CUBIC_ERROR_BOUND || end - start <= f32::EPSILON {
                return Self::evaluate(self.b, self.d, midpoint);
            }
            if estimate < t {
                start = midpoint;
            } else {
                end = midpoint;
            }
        }
    }
}

/// An easing curve.
#[derive(Clone)]
pub enum Curve {
    Linear,
    /// `1 - (1 - t)^2`
    Decelerate,
    Cubic(Cubic),
    /// 0 until `begin`, 1 after `end`, `curve` stretched in between.
    Interval {
        begin: f32,
        end: f32,
        curve: Arc<Curve>,
    },
    /// Jumps from 0 to 1 at the threshold.
    Threshold(f32),
    /// Repeats a linear ramp `count` times.
    SawTooth(u32),
    /// Mirror image of the inner curve.
    Flipped(Arc<Curve>),
    BounceIn,
    BounceOut,
    BounceInOut,
    /// Elastic curves carry their oscillation period.
    ElasticIn(f32),
    ElasticOut(f32),
    ElasticInOut(f32),
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl Curve {
    pub const LINEAR: Curve = Curve::Linear;
    pub const DECELERATE: Curve = Curve::Decelerate;
    pub const EASE: Curve = Curve::Cubic(Cubic::new(0.25, 0.1, 0.25, 1.0));
    pub const EASE_IN: Curve = Curve::Cubic(Cubic::new(0.42, 0.0, 1.0, 1.0));
    pub const EASE_IN_TO_LINEAR: Curve = Curve::Cubic(Cubic::new(0.67, 0.03, 0.65, 0.09));
    pub const EASE_IN_SINE: Curve = Curve::Cubic(Cubic::new(0.47, 0.0, 0.745, 0.715));
    pub const EASE_IN_QUAD: Curve = Curve::Cubic(Cubic::new(0.55, 0.085, 0.68, 0.53));
    pub const EASE_IN_CUBIC: Curve = Curve::Cubic(Cubic::new(0.55, 0.055, 0.675, 0.19));
    pub const EASE_IN_QUART: Curve = Curve::Cubic(Cubic::new(0.895, 0.03, 0.685, 0.22));
    pub const EASE_IN_QUINT: Curve = Curve::Cubic(Cubic::new(0.755, 0.05, 0.855, 0.06));
    pub const EASE_IN_EXPO: Curve = Curve::Cubic(Cubic::new(0.95, 0.05, 0.795, 0.035));
    pub const EASE_IN_CIRC: Curve = Curve::Cubic(Cubic::new(0.6, 0.04, 0.98, 0.335));
    pub const EASE_IN_BACK: Curve = Curve::Cubic(Cubic::new(0.6, -0.28, 0.735, 0.045));
    pub const EASE_OUT: Curve = Curve::Cubic(Cubic::new(0.0, 0.0, 0.58, 1.0));
    pub const LINEAR_TO_EASE_OUT: Curve = Curve::Cubic(Cubic::new(0.35, 0.91, 0.33, 0.97));
    pub const EASE_OUT_SINE: Curve = Curve::Cubic(Cubic::new(0.39, 0.575, 0.565, 1.0));
    pub const EASE_OUT_QUAD: Curve = Curve::Cubic(Cubic::new(0.25, 0.46, 0.45, 0.94));
    pub const EASE_OUT_CUBIC: Curve = Curve::Cubic(Cubic::new(0.215, 0.61, 0.355, 1.0));
    pub const EASE_OUT_QUART: Curve = Curve::Cubic(Cubic::new(0.165, 0.84, 0.44, 1.0));
    pub const EASE_OUT_QUINT: Curve = Curve::Cubic(Cubic::new(0.23, 1.0, 0.32, 1.0));
    pub const EASE_OUT_EXPO: Curve = Curve::Cubic(Cubic::new(0.19, 1.0, 0.22, 1.0));
    pub const EASE_OUT_CIRC: Curve = Curve::Cubic(Cubic::new(0.075, 0.82, 0.165, 1.0));
    pub const EASE_OUT_BACK: Curve = Curve::Cubic(Cubic::new(0.175, 0.885, 0.32, 1.275));
    pub const EASE_IN_OUT: Curve = Curve::Cubic(Cubic::new(0.42, 0.0, 0.58, 1.0));
    pub const EASE_IN_OUT_SINE: Curve = Curve::Cubic(Cubic::new(0.445, 0.05, 0.55, 0.95));
    pub const EASE_IN_OUT_QUAD: Curve = Curve::Cubic(Cubic::new(0.455, 0.03, 0.515, 0.955));
    pub const EASE_IN_OUT_CUBIC: Curve = Curve::Cubic(Cubic::new(0.645, 0.045, 0.355, 1.0));
    pub const EASE_IN_OUT_QUART: Curve = Curve::Cubic(Cubic::new(0.77, 0.0, 0.175, 1.0));
    pub const EASE_IN_OUT_QUINT: Curve = Curve::Cubic(Cubic::new(0.86, 0.0, 0.07, 1.0));
    pub const EASE_IN_OUT_EXPO: Curve = Curve::Cubic(Cubic::new(1.0, 0.0, 0.0, 1.0));
    pub const EASE_IN_OUT_CIRC: Curve = Curve::Cubic(Cubic::new(0.785, 0.135, 0.15, 0.86));
    pub const EASE_IN_OUT_BACK: Curve = Curve::Cubic(Cubic::new(0.68, -0.55, 0.265, 1.55));
    pub const FAST_OUT_SLOW_IN: Curve = Curve::Cubic(Cubic::new(0.4, 0.0, 0.2, 1.0));
    pub const FAST_LINEAR_TO_SLOW_EASE_IN: Curve = Curve::Cubic(Cubic::new(0.18, 1.0, 0.04, 1.0));
    pub const SLOW_MIDDLE: Curve = Curve::Cubic(Cubic::new(0.15, 0.85, 0.85, 0.15));
    pub const BOUNCE_IN: Curve = Curve::BounceIn;
    pub const BOUNCE_OUT: Curve = Curve::BounceOut;
    pub const BOUNCE_IN_OUT: Curve = Curve::BounceInOut;
    pub const ELASTIC_IN: Curve = Curve::ElasticIn(0.4);
    pub const ELASTIC_OUT: Curve = Curve::ElasticOut(0.4);
    pub const ELASTIC_IN_OUT: Curve = Curve::ElasticInOut(0.4);

    /// An [`Curve::Interval`] with a linear inner curve.
    pub fn interval(begin: f32, end: f32) -> Self {
        Self::interval_with(begin, end, Curve::Linear)
    }

    pub fn interval_with(begin: f32, end: f32, curve: Curve) -> Self {
        assert!(
            (0.0..=1.0).contains(&begin) && (0.0..=1.0).contains(&end) && begin <= end,
            "interval {}..{} must lie within [0, 1]",
            begin,
            end
        );
        Curve::Interval {
            begin,
            end,
            curve: Arc::new(curve),
        }
    }

    pub fn flipped(&self) -> Self {
        Curve::Flipped(Arc::new(self.clone()))
    }

    /// Create a custom curve from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        Curve::Custom(Arc::new(f))
    }

    /// Evaluate the curve at `t`.
    ///
    /// `t` must lie in `[0, 1]`; the endpoints are returned unchanged.
    pub fn transform(&self, t: f32) -> f32 {
        debug_assert!(
            (0.0..=1.0).contains(&t),
            "parametric value {} is outside of [0, 1] range",
            t
        );
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Curve::Linear => t,
            Curve::Decelerate => {
                let t = 1.0 - t;
                1.0 - t * t
            }
            Curve::Cubic(cubic) => cubic.transform(t),
            Curve::Interval { begin, end, curve } => {
                let t = ((t - begin) / (end - begin)).clamp(0.0, 1.0);
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    curve.transform(t)
                }
            }
            Curve::Threshold(threshold) => {
                if t < *threshold {
                    0.0
                } else {
                    1.0
                }
            }
            Curve::SawTooth(count) => {
                let t = t * *count as f32;
                t - t.trunc()
            }
            Curve::Flipped(curve) => 1.0 - curve.transform(1.0 - t),
            Curve::BounceIn => 1.0 - bounce(1.0 - t),
            Curve::BounceOut => bounce(t),
            Curve::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce(1.0 - t * 2.0)) * 0.5
                } else {
                    bounce(t * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
            Curve::ElasticIn(period) => {
                let s = period / 4.0;
                let t = t - 1.0;
                -(2.0f32.powf(10.0 * t)) * ((t - s) * (PI * 2.0) / period).sin()
            }
            Curve::ElasticOut(period) => {
                let s = period / 4.0;
                2.0f32.powf(-10.0 * t) * ((t - s) * (PI * 2.0) / period).sin() + 1.0
            }
            Curve::ElasticInOut(period) => {
                let s = period / 4.0;
                let t = 2.0 * t - 1.0;
                if t < 0.0 {
                    -0.5 * 2.0f32.powf(10.0 * t) * ((t - s) * (PI * 2.0) / period).sin()
                } else {
                    2.0f32.powf(-10.0 * t) * ((t - s) * (PI * 2.0) / period).sin() * 0.5 + 1.0
                }
            }
            Curve::Custom(f) => f(t),
        }
    }
}

impl Default for Curve {
    fn default() -> Self {
        Curve::Linear
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::Linear => write!(f, "Linear"),
            Curve::Decelerate => write!(f, "Decelerate"),
            Curve::Cubic(c) => write!(f, "Cubic({}, {}, {}, {})", c.a, c.b, c.c, c.d),
            Curve::Interval { begin, end, curve } => {
                write!(f, "Interval({}..{}, {:?})", begin, end, curve)
            }
            Curve::Threshold(threshold) => write!(f, "Threshold({})", threshold),
            Curve::SawTooth(count) => write!(f, "SawTooth({})", count),
            Curve::Flipped(curve) => write!(f, "Flipped({:?})", curve),
            Curve::BounceIn => write!(f, "BounceIn"),
            Curve::BounceOut => write!(f, "BounceOut"),
            Curve::BounceInOut => write!(f, "BounceInOut"),
            Curve::ElasticIn(period) => write!(f, "ElasticIn({})", period),
            Curve::ElasticOut(period) => write!(f, "ElasticOut({})", period),
            Curve::ElasticInOut(period) => write!(f, "ElasticInOut({})", period),
            Curve::Custom(_) => write!(f, "Custom"),
        }
    }
}

fn bounce(t: f32) -> f32 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_curves() -> Vec<Curve> {
        vec![
            Curve::LINEAR,
            Curve::DECELERATE,
            Curve::EASE,
            Curve::EASE_IN,
            Curve::EASE_OUT,
            Curve::EASE_IN_OUT,
            Curve::FAST_OUT_SLOW_IN,
            Curve::EASE_OUT_BACK,
            Curve::BOUNCE_IN,
            Curve::BOUNCE_OUT,
            Curve::BOUNCE_IN_OUT,
            Curve::ELASTIC_IN,
            Curve::ELASTIC_OUT,
            Curve::ELASTIC_IN_OUT,
            Curve::SawTooth(3),
            Curve::Threshold(0.5),
            Curve::interval(0.25, 0.75),
            Curve::EASE_IN.flipped(),
        ]
    }

    #[test]
    fn test_endpoints_are_exact() {
        for curve in standard_curves() {
            assert_eq!(curve.transform(0.0), 0.0, "{:?}", curve);
            assert_eq!(curve.transform(1.0), 1.0, "{:?}", curve);
        }
    }

    #[test]
    fn test_linear() {
        assert_eq!(Curve::Linear.transform(0.0), 0.0);
        assert_eq!(Curve::Linear.transform(0.5), 0.5);
        assert_eq!(Curve::Linear.transform(1.0), 1.0);
    }

    #[test]
    fn test_ease_in_is_slow_at_start() {
        assert!(Curve::EASE_IN.transform(0.5) < 0.5);
    }

    #[test]
    fn test_ease_out_is_fast_at_start() {
        assert!(Curve::EASE_OUT.transform(0.5) > 0.5);
    }

    #[test]
    fn test_cubic_is_close_to_reference_values() {
        // easeInOut is symmetric around the midpoint.
        let mid = Curve::EASE_IN_OUT.transform(0.5);
        assert!((mid - 0.5).abs() < 0.01, "got {}", mid);
        let fast = Curve::FAST_OUT_SLOW_IN.transform(0.5);
        assert!(fast > 0.7 && fast < 0.85, "got {}", fast);
    }

    #[test]
    fn test_overshooting_cubic_leaves_unit_range() {
        let max = (1..100)
            .map(|i| Curve::EASE_OUT_BACK.transform(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(max > 1.0);
    }

    #[test]
    fn test_interval() {
        let curve = Curve::interval(0.25, 0.75);
        assert_eq!(curve.transform(0.1), 0.0);
        assert_eq!(curve.transform(0.5), 0.5);
        assert_eq!(curve.transform(0.9), 1.0);
    }

    #[test]
    fn test_threshold_and_saw_tooth() {
        assert_eq!(Curve::Threshold(0.5).transform(0.49), 0.0);
        assert_eq!(Curve::Threshold(0.5).transform(0.5), 1.0);
        let saw = Curve::SawTooth(2);
        assert!((saw.transform(0.25) - 0.5).abs() < 1e-6);
        assert!((saw.transform(0.75) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_flipped_mirrors() {
        let flipped = Curve::EASE_IN.flipped();
        let expected = 1.0 - Curve::EASE_IN.transform(0.7);
        assert!((flipped.transform(0.3) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_bounce_out_stays_in_unit_range() {
        for i in 1..100 {
            let v = Curve::BOUNCE_OUT.transform(i as f32 / 100.0);
            assert!((0.0..=1.0).contains(&v), "got {}", v);
        }
    }

    #[test]
    fn test_custom() {
        let curve = Curve::custom(|t| t * t);
        assert_eq!(curve.transform(0.5), 0.25);
    }

    #[test]
    #[should_panic]
    fn test_interval_outside_unit_range_rejected() {
        let _ = Curve::interval(0.5, 1.5);
    }
}
