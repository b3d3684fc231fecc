//! Time-based simulations that drive an [`AnimationController`].
//!
//! [`AnimationController`]: super::AnimationController

use std::time::Duration;

use super::{AnimationDirection, Curve};

/// Thresholds below which a simulation is considered at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub distance: f64,
    pub time: f64,
    pub velocity: f64,
}

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance {
        distance: 1e-3,
        time: 1e-3,
        velocity: 1e-3,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub(crate) fn near_zero(value: f64, epsilon: f64) -> bool {
    value.abs() <= epsilon
}

/// Position and velocity as functions of time in seconds.
pub trait Simulation {
    fn x(&self, time: f64) -> f64;
    fn dx(&self, time: f64) -> f64;
    fn is_done(&self, time: f64) -> bool;

    fn tolerance(&self) -> Tolerance {
        Tolerance::DEFAULT
    }

    /// Direction of travel at `time`, for simulations that change direction
    /// on their own.
    fn direction_at(&self, _time: f64) -> Option<AnimationDirection> {
        None
    }
}

/// Moves from `begin` to `end` over a fixed duration, shaped by a curve.
#[derive(Debug, Clone)]
pub struct InterpolationSimulation {
    begin: f64,
    end: f64,
    duration: f64,
    curve: Curve,
}

impl InterpolationSimulation {
    pub fn new(begin: f64, end: f64, duration: Duration, curve: Curve) -> Self {
        let duration = duration.as_secs_f64();
        assert!(duration > 0.0, "interpolation needs a positive duration");
        Self {
            begin,
            end,
            duration,
            curve,
        }
    }
}

impl Simulation for InterpolationSimulation {
    fn x(&self, time: f64) -> f64 {
        let t = (time / self.duration).clamp(0.0, 1.0);
        if t == 0.0 {
            self.begin
        } else if t == 1.0 {
            self.end
        } else {
            self.begin + (self.end - self.begin) * self.curve.transform(t as f32) as f64
        }
    }

    fn dx(&self, time: f64) -> f64 {
        let epsilon = self.tolerance().time;
        (self.x(time + epsilon) - self.x(time - epsilon)) / (2.0 * epsilon)
    }

    fn is_done(&self, time: f64) -> bool {
        time >= self.duration
    }
}

/// Cycles between `min` and `max` forever, optionally bouncing back.
#[derive(Debug, Clone)]
pub struct RepeatingSimulation {
    min: f64,
    max: f64,
    reverse: bool,
    period: f64,
    initial_t: f64,
}

impl RepeatingSimulation {
    pub fn new(initial_value: f64, min: f64, max: f64, reverse: bool, period: Duration) -> Self {
        let period = period.as_secs_f64();
        assert!(period > 0.0, "repeat period must be positive");
        let initial_t = if max == min {
            0.0
        } else {
            ((initial_value - min) / (max - min)) * period
        };
        Self {
            min,
            max,
            reverse,
            period,
            initial_t,
        }
    }

    fn cycles(&self, time: f64) -> f64 {
        (time + self.initial_t) / self.period
    }

    fn playing_reverse(&self, time: f64) -> bool {
        self.reverse && self.cycles(time) % 2.0 >= 1.0
    }
}

impl Simulation for RepeatingSimulation {
    fn x(&self, time: f64) -> f64 {
        let t = self.cycles(time) % 1.0;
        if self.playing_reverse(time) {
            self.max + (self.min - self.max) * t
        } else {
            self.min + (self.max - self.min) * t
        }
    }

    fn dx(&self, time: f64) -> f64 {
        let speed = (self.max - self.min) / self.period;
        if self.playing_reverse(time) {
            -speed
        } else {
            speed
        }
    }

    fn is_done(&self, _time: f64) -> bool {
        false
    }

    fn direction_at(&self, time: f64) -> Option<AnimationDirection> {
        Some(if self.playing_reverse(time) {
            AnimationDirection::Reverse
        } else {
            AnimationDirection::Forward
        })
    }
}
