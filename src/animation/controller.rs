//! The animation controller.
//!
//! A controller owns a value within `[lower_bound, upper_bound]` and drives it
//! with a [`Simulation`] once per frame through a [`Ticker`]. Every run
//! returns a [`TickerFuture`] that resolves when the run reaches its end. Runs
//! that are stopped or superseded leave their future pending.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::simulation::{InterpolationSimulation, RepeatingSimulation, Simulation, Tolerance};
use super::spring::{SpringDescription, SpringSimulation};
use super::{
    notify_status, notify_values, Animation, AnimationDirection, AnimationRef, AnimationStatus,
    Curve, StatusCallback,
};
use crate::foundation::{Listenable, ListenerList, VoidCallback};
use crate::scheduler::{Ticker, TickerCallback, TickerFuture, TickerProvider};

const FLING_SPRING: SpringDescription = SpringDescription {
    mass: 1.0,
    stiffness: 500.0,
    // Critically damped: 2 * sqrt(mass * stiffness).
    damping: 44.721_359_549_995_796,
};

const FLING_OVERSHOOT: f32 = 0.01;

/// Values this close to a bound count as resting on it.
const BOUND_TOLERANCE: f32 = 1e-6;

fn at_bound(value: f32, bound: f32) -> bool {
    (value - bound).abs() < BOUND_TOLERANCE
}

const FLING_TOLERANCE: Tolerance = Tolerance {
    distance: 0.01,
    time: Tolerance::DEFAULT.time,
    velocity: f64::INFINITY,
};

/// Configures and creates an [`AnimationController`].
#[derive(Debug, Clone)]
pub struct AnimationControllerBuilder {
    value: Option<f32>,
    duration: Option<Duration>,
    reverse_duration: Option<Duration>,
    lower_bound: f32,
    upper_bound: f32,
    debug_label: Option<String>,
}

impl Default for AnimationControllerBuilder {
    fn default() -> Self {
        Self {
            value: None,
            duration: None,
            reverse_duration: None,
            lower_bound: 0.0,
            upper_bound: 1.0,
            debug_label: None,
        }
    }
}

impl AnimationControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial value; defaults to the lower bound.
    pub fn value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Duration used when running in reverse; falls back to `duration`.
    pub fn reverse_duration(mut self, duration: Duration) -> Self {
        self.reverse_duration = Some(duration);
        self
    }

    pub fn bounds(mut self, lower_bound: f32, upper_bound: f32) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    pub fn debug_label(mut self, label: impl Into<String>) -> Self {
        self.debug_label = Some(label.into());
        self
    }

    pub fn build(self, vsync: &dyn TickerProvider) -> Rc<AnimationController> {
        assert!(
            self.upper_bound >= self.lower_bound,
            "upper bound must not be below lower bound"
        );
        let label = self
            .debug_label
            .unwrap_or_else(|| "AnimationController".to_string());
        let initial = self.value.unwrap_or(self.lower_bound);
        let controller = Rc::new_cyclic(|this: &Weak<AnimationController>| {
            let ticker = vsync.create_ticker(tick_callback(this.clone()));
            AnimationController {
                state: RefCell::new(ControllerState {
                    value: 0.0,
                    status: AnimationStatus::Dismissed,
                    direction: AnimationDirection::Forward,
                    duration: self.duration,
                    reverse_duration: self.reverse_duration,
                    simulation: None,
                    last_elapsed: None,
                    last_reported_status: AnimationStatus::Dismissed,
                    disposed: false,
                }),
                lower_bound: self.lower_bound,
                upper_bound: self.upper_bound,
                debug_label: label,
                ticker: RefCell::new(Some(ticker)),
                listeners: ListenerList::new(),
                status_listeners: ListenerList::new(),
                this: this.clone(),
            }
        });
        controller.internal_set_value(initial);
        let status = controller.status();
        controller.state.borrow_mut().last_reported_status = status;
        log::debug!("{} created at {}", controller.debug_label, controller.value());
        controller
    }
}

fn tick_callback(this: Weak<AnimationController>) -> TickerCallback {
    Rc::new(move |elapsed| {
        if let Some(controller) = this.upgrade() {
            controller.tick(elapsed);
        }
    })
}

struct ControllerState {
    value: f32,
    status: AnimationStatus,
    direction: AnimationDirection,
    duration: Option<Duration>,
    reverse_duration: Option<Duration>,
    simulation: Option<Box<dyn Simulation>>,
    last_elapsed: Option<Duration>,
    last_reported_status: AnimationStatus,
    disposed: bool,
}

/// Drives an `f32` value over time.
pub struct AnimationController {
    state: RefCell<ControllerState>,
    lower_bound: f32,
    upper_bound: f32,
    debug_label: String,
    ticker: RefCell<Option<Ticker>>,
    listeners: ListenerList<dyn Fn()>,
    status_listeners: ListenerList<dyn Fn(AnimationStatus)>,
    this: Weak<AnimationController>,
}

impl AnimationController {
    pub fn builder() -> AnimationControllerBuilder {
        AnimationControllerBuilder::new()
    }

    /// A controller without bounds, for physics-driven values.
    pub fn unbounded(
        value: f32,
        duration: Option<Duration>,
        debug_label: Option<&str>,
        vsync: &dyn TickerProvider,
    ) -> Rc<Self> {
        let mut builder = Self::builder()
            .bounds(f32::NEG_INFINITY, f32::INFINITY)
            .value(value);
        builder.duration = duration;
        if let Some(label) = debug_label {
            builder = builder.debug_label(label);
        }
        builder.build(vsync)
    }

    /// This controller as a shared [`Animation`] handle.
    pub fn view(self: &Rc<Self>) -> AnimationRef<f32> {
        self.clone()
    }

    pub fn value(&self) -> f32 {
        self.state.borrow().value
    }

    pub fn status(&self) -> AnimationStatus {
        self.state.borrow().status
    }

    pub fn lower_bound(&self) -> f32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f32 {
        self.upper_bound
    }

    pub fn debug_label(&self) -> &str {
        &self.debug_label
    }

    pub fn duration(&self) -> Option<Duration> {
        self.state.borrow().duration
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        self.state.borrow_mut().duration = duration;
    }

    pub fn reverse_duration(&self) -> Option<Duration> {
        self.state.borrow().reverse_duration
    }

    pub fn set_reverse_duration(&self, duration: Option<Duration>) {
        self.state.borrow_mut().reverse_duration = duration;
    }

    /// Elapsed time of the current run as of the last tick.
    pub fn last_elapsed_duration(&self) -> Option<Duration> {
        self.state.borrow().last_elapsed
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Whether a run is in progress.
    pub fn is_animating(&self) -> bool {
        self.ticker.borrow().as_ref().is_some_and(Ticker::is_active)
    }

    /// Rate of change per second at the last tick; zero while idle.
    pub fn velocity(&self) -> f32 {
        if !self.is_animating() {
            return 0.0;
        }
        let state = self.state.borrow();
        match (&state.simulation, state.last_elapsed) {
            (Some(simulation), Some(elapsed)) => simulation.dx(elapsed.as_secs_f64()) as f32,
            _ => 0.0,
        }
    }

    /// Stop any run and jump to `value`.
    ///
    /// Listeners are notified and the status becomes `Dismissed` at the lower
    /// bound, `Completed` at the upper bound, and otherwise the running status
    /// of the current direction.
    pub fn set_value(&self, value: f32) {
        self.assert_not_disposed("set_value");
        self.stop_ticker(true);
        self.internal_set_value(value);
        self.notify_listeners();
        self.check_status_changed();
    }

    /// Jump to the lower bound.
    pub fn reset(&self) {
        self.set_value(self.lower_bound);
    }

    /// Run toward the upper bound, optionally starting from `from`.
    pub fn forward(&self, from: Option<f32>) -> TickerFuture {
        self.assert_not_disposed("forward");
        assert!(
            self.duration().is_some(),
            "{}.forward() called with no default duration",
            self.debug_label
        );
        self.state.borrow_mut().direction = AnimationDirection::Forward;
        if let Some(from) = from {
            self.set_value(from);
        }
        self.animate_to_internal(self.upper_bound, None, Curve::Linear)
    }

    /// Run toward the lower bound, optionally starting from `from`.
    pub fn reverse(&self, from: Option<f32>) -> TickerFuture {
        self.assert_not_disposed("reverse");
        {
            let state = self.state.borrow();
            assert!(
                state.duration.is_some() || state.reverse_duration.is_some(),
                "{}.reverse() called with no default duration or reverse duration",
                self.debug_label
            );
        }
        self.state.borrow_mut().direction = AnimationDirection::Reverse;
        if let Some(from) = from {
            self.set_value(from);
        }
        self.animate_to_internal(self.lower_bound, None, Curve::Linear)
    }

    /// Run forward to `target` along `curve`.
    ///
    /// Without an explicit `duration` the run takes the share of `duration`
    /// that corresponds to the distance left to cover.
    pub fn animate_to(&self, target: f32, duration: Option<Duration>, curve: Curve) -> TickerFuture {
        self.assert_not_disposed("animate_to");
        self.state.borrow_mut().direction = AnimationDirection::Forward;
        self.animate_to_internal(target, duration, curve)
    }

    /// Like [`animate_to`](Self::animate_to) but reports the reverse direction.
    pub fn animate_back(
        &self,
        target: f32,
        duration: Option<Duration>,
        curve: Curve,
    ) -> TickerFuture {
        self.assert_not_disposed("animate_back");
        self.state.borrow_mut().direction = AnimationDirection::Reverse;
        self.animate_to_internal(target, duration, curve)
    }

    fn animate_to_internal(
        &self,
        target: f32,
        duration: Option<Duration>,
        curve: Curve,
    ) -> TickerFuture {
        let (value, direction, simulation_duration) = {
            let state = self.state.borrow();
            let simulation_duration = match duration {
                Some(_) if target == state.value => Duration::ZERO,
                Some(duration) => duration,
                None => {
                    let range = self.upper_bound - self.lower_bound;
                    let remaining = if range.is_finite() && range > 0.0 {
                        (target - state.value).abs() / range
                    } else {
                        1.0
                    };
                    let directional = match state.direction {
                        AnimationDirection::Reverse => {
                            state.reverse_duration.or(state.duration)
                        }
                        AnimationDirection::Forward => state.duration,
                    };
                    let Some(directional) = directional else {
                        panic!("{} has no duration to animate with", self.debug_label);
                    };
                    directional.mul_f64(remaining as f64)
                }
            };
            (state.value, state.direction, simulation_duration)
        };

        self.stop_ticker(true);

        if simulation_duration.is_zero() {
            let target = self.clamp(target);
            {
                let mut state = self.state.borrow_mut();
                state.value = target;
                state.status = direction.terminal_status();
            }
            if value != target {
                self.notify_listeners();
            }
            self.check_status_changed();
            return TickerFuture::complete();
        }

        self.start_simulation(Box::new(InterpolationSimulation::new(
            value as f64,
            target as f64,
            simulation_duration,
            curve,
        )))
    }

    /// Run forever between `min` and `max` (default: the bounds), one pass per
    /// `period` (default: `duration`). With `reverse` every other pass runs
    /// backwards and the status follows.
    pub fn repeat(
        &self,
        min: Option<f32>,
        max: Option<f32>,
        reverse: bool,
        period: Option<Duration>,
    ) -> TickerFuture {
        self.assert_not_disposed("repeat");
        let min = min.unwrap_or(self.lower_bound);
        let max = max.unwrap_or(self.upper_bound);
        let Some(period) = period.or_else(|| self.duration()) else {
            panic!("{}.repeat() called with no period or duration", self.debug_label);
        };
        assert!(
            max >= min && min >= self.lower_bound && max <= self.upper_bound,
            "repeat range {}..{} must lie within the bounds",
            min,
            max
        );
        self.stop_ticker(true);
        let simulation = RepeatingSimulation::new(
            self.value() as f64,
            min as f64,
            max as f64,
            reverse,
            period,
        );
        self.start_simulation(Box::new(simulation))
    }

    /// Settle at a bound with a critically damped spring.
    ///
    /// A negative `velocity` flings toward the lower bound.
    pub fn fling(&self, velocity: f32) -> TickerFuture {
        self.assert_not_disposed("fling");
        let (direction, target) = if velocity < 0.0 {
            (
                AnimationDirection::Reverse,
                self.lower_bound - FLING_OVERSHOOT,
            )
        } else {
            (
                AnimationDirection::Forward,
                self.upper_bound + FLING_OVERSHOOT,
            )
        };
        self.state.borrow_mut().direction = direction;
        self.stop_ticker(true);
        let simulation = SpringSimulation::new(
            FLING_SPRING,
            self.value() as f64,
            target as f64,
            velocity as f64,
        )
        .with_tolerance(FLING_TOLERANCE);
        self.start_simulation(Box::new(simulation))
    }

    /// Drive the value with an arbitrary simulation, in the forward direction.
    pub fn animate_with(&self, simulation: impl Simulation + 'static) -> TickerFuture {
        self.assert_not_disposed("animate_with");
        self.state.borrow_mut().direction = AnimationDirection::Forward;
        self.stop_ticker(true);
        self.start_simulation(Box::new(simulation))
    }

    fn start_simulation(&self, simulation: Box<dyn Simulation>) -> TickerFuture {
        let initial = self.clamp(simulation.x(0.0) as f32);
        let status = {
            let mut state = self.state.borrow_mut();
            state.value = initial;
            state.simulation = Some(simulation);
            state.last_elapsed = Some(Duration::ZERO);
            state.status = state.direction.running_status();
            state.status
        };
        let ticker = self.ticker.borrow().clone();
        let Some(ticker) = ticker else {
            panic!("{} has no ticker", self.debug_label);
        };
        let future = ticker.start();
        log::debug!("{} started {:?} from {}", self.debug_label, status, initial);
        self.check_status_changed();
        future
    }

    /// Stop the current run. Its future is left unresolved and no status
    /// change is reported.
    pub fn stop(&self) {
        self.assert_not_disposed("stop");
        self.stop_ticker(true);
    }

    fn stop_ticker(&self, canceled: bool) {
        {
            let mut state = self.state.borrow_mut();
            state.simulation = None;
            state.last_elapsed = None;
        }
        let ticker = self.ticker.borrow().clone();
        if let Some(ticker) = ticker {
            if ticker.is_active() {
                log::debug!("{} stopped at {}", self.debug_label, self.value());
            }
            ticker.stop(canceled);
        }
    }

    /// Move the running ticker to a ticker from `vsync`, keeping its clock.
    pub fn resync(&self, vsync: &dyn TickerProvider) {
        self.assert_not_disposed("resync");
        let replacement = vsync.create_ticker(tick_callback(self.this.clone()));
        let old = self.ticker.borrow_mut().replace(replacement.clone());
        if let Some(old) = old {
            replacement.absorb_ticker(&old);
        }
    }

    /// Release the ticker and all listeners. Must be called exactly once.
    pub fn dispose(&self) {
        {
            let mut state = self.state.borrow_mut();
            assert!(
                !state.disposed,
                "{}.dispose() called more than once",
                self.debug_label
            );
            state.disposed = true;
            state.simulation = None;
        }
        let ticker = self.ticker.borrow_mut().take();
        if let Some(ticker) = ticker {
            ticker.dispose();
        }
        self.listeners.clear();
        self.status_listeners.clear();
        log::debug!("{} disposed", self.debug_label);
    }

    fn tick(&self, elapsed: Duration) {
        let done = {
            let mut state = self.state.borrow_mut();
            let seconds = elapsed.as_secs_f64();
            let (x, direction, done) = match state.simulation.as_ref() {
                Some(simulation) => (
                    simulation.x(seconds),
                    simulation.direction_at(seconds),
                    simulation.is_done(seconds),
                ),
                None => return,
            };
            state.last_elapsed = Some(elapsed);
            state.value = self.clamp(x as f32);
            if let Some(direction) = direction {
                state.direction = direction;
                state.status = direction.running_status();
            }
            if done {
                state.status = state.direction.terminal_status();
                state.simulation = None;
            }
            done
        };

        let finished = if done {
            let ticker = self.ticker.borrow().clone();
            ticker.and_then(|ticker| ticker.deactivate())
        } else {
            None
        };

        self.notify_listeners();
        self.check_status_changed();
        if let Some(future) = finished {
            log::debug!("{} finished at {}", self.debug_label, self.value());
            future.resolve();
        }
    }

    fn internal_set_value(&self, value: f32) {
        let value = self.clamp(value);
        let mut state = self.state.borrow_mut();
        state.value = value;
        state.status = if at_bound(value, self.lower_bound) {
            AnimationStatus::Dismissed
        } else if at_bound(value, self.upper_bound) {
            AnimationStatus::Completed
        } else {
            state.direction.running_status()
        };
    }

    fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.lower_bound, self.upper_bound)
    }

    fn notify_listeners(&self) {
        notify_values(&self.listeners, &self.debug_label);
    }

    fn check_status_changed(&self) {
        let status = {
            let mut state = self.state.borrow_mut();
            if state.status == state.last_reported_status {
                return;
            }
            state.last_reported_status = state.status;
            state.status
        };
        notify_status(&self.status_listeners, status, &self.debug_label);
    }

    fn assert_not_disposed(&self, method: &str) {
        assert!(
            !self.is_disposed(),
            "{}.{}() called after dispose()",
            self.debug_label,
            method
        );
    }
}

impl Listenable for AnimationController {
    fn add_listener(&self, listener: VoidCallback) {
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.listeners.remove(listener);
    }
}

impl Animation<f32> for AnimationController {
    fn value(&self) -> f32 {
        AnimationController::value(self)
    }

    fn status(&self) -> AnimationStatus {
        AnimationController::status(self)
    }

    fn add_status_listener(&self, listener: StatusCallback) {
        self.status_listeners.add(listener);
    }

    fn remove_status_listener(&self, listener: &StatusCallback) {
        self.status_listeners.remove(listener);
    }
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AnimationController")
            .field("label", &self.debug_label)
            .field("value", &state.value)
            .field("status", &state.status)
            .field("direction", &state.direction)
            .field("disposed", &state.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::scheduler::FrameScheduler;
    use std::cell::Cell;

    fn scheduler() -> FrameScheduler {
        FrameScheduler::new(&EngineConfig::default())
    }

    fn controller(scheduler: &FrameScheduler, millis: u64) -> Rc<AnimationController> {
        AnimationController::builder()
            .duration(Duration::from_millis(millis))
            .build(scheduler)
    }

    fn frame(scheduler: &FrameScheduler, millis: u64) {
        scheduler.handle_begin_frame(Duration::from_millis(millis));
        scheduler.handle_draw_frame();
    }

    fn record_statuses(controller: &AnimationController) -> Rc<RefCell<Vec<AnimationStatus>>> {
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let s = statuses.clone();
        controller.add_status_listener(Rc::new(move |status| s.borrow_mut().push(status)));
        statuses
    }

    #[test]
    fn test_initial_state() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        assert_eq!(controller.value(), 0.0);
        assert_eq!(controller.status(), AnimationStatus::Dismissed);
        assert!(!controller.is_animating());
    }

    #[test]
    fn test_forward_runs_to_completion() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let statuses = record_statuses(&controller);
        let future = controller.forward(None);

        assert_eq!(controller.status(), AnimationStatus::Forward);
        frame(&scheduler, 0);
        frame(&scheduler, 50);
        assert!((controller.value() - 0.5).abs() < 1e-6);
        frame(&scheduler, 100);

        assert_eq!(controller.value(), 1.0);
        assert_eq!(controller.status(), AnimationStatus::Completed);
        assert!(future.is_completed());
        assert!(!controller.is_animating());
        assert_eq!(
            *statuses.borrow(),
            vec![AnimationStatus::Forward, AnimationStatus::Completed]
        );
    }

    #[test]
    fn test_reverse_uses_reverse_duration() {
        let scheduler = scheduler();
        let controller = AnimationController::builder()
            .duration(Duration::from_millis(100))
            .reverse_duration(Duration::from_millis(400))
            .value(1.0)
            .build(&scheduler);
        controller.reverse(None);
        frame(&scheduler, 0);
        frame(&scheduler, 100);
        assert!((controller.value() - 0.75).abs() < 1e-6);
        assert_eq!(controller.status(), AnimationStatus::Reverse);
    }

    #[test]
    fn test_partial_forward_takes_remaining_share_of_duration() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        controller.set_value(0.5);
        controller.forward(None);
        frame(&scheduler, 0);
        frame(&scheduler, 50);
        assert_eq!(controller.value(), 1.0);
        assert_eq!(controller.status(), AnimationStatus::Completed);
    }

    #[test]
    fn test_zero_distance_completes_immediately() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        controller.set_value(1.0);
        let future = controller.forward(None);
        assert!(future.is_completed());
        assert_eq!(controller.status(), AnimationStatus::Completed);
        assert!(!controller.is_animating());
    }

    #[test]
    fn test_animate_to_same_value_with_duration_is_immediate() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let future = controller.animate_to(0.0, Some(Duration::from_secs(1)), Curve::Linear);
        assert!(future.is_completed());
        assert_eq!(controller.status(), AnimationStatus::Completed);
    }

    #[test]
    fn test_stop_keeps_status_and_leaves_future_pending() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let statuses = record_statuses(&controller);
        let future = controller.forward(None);
        frame(&scheduler, 0);
        frame(&scheduler, 30);
        controller.stop();

        frame(&scheduler, 200);
        assert!((controller.value() - 0.3).abs() < 1e-6);
        assert_eq!(controller.status(), AnimationStatus::Forward);
        assert!(future.is_canceled());
        assert_eq!(*statuses.borrow(), vec![AnimationStatus::Forward]);
    }

    #[test]
    fn test_superseded_run_future_is_canceled() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let first = controller.forward(None);
        frame(&scheduler, 0);
        let second = controller.reverse(None);
        assert!(first.is_canceled());
        assert!(second.is_pending());
    }

    #[test]
    fn test_value_listeners_fire_before_status_listeners() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        controller.add_listener(Rc::new(move || l.borrow_mut().push("value")));
        let l = log.clone();
        controller.add_status_listener(Rc::new(move |status| {
            if status == AnimationStatus::Completed {
                l.borrow_mut().push("completed");
            }
        }));
        let future = controller.forward(None);
        let l = log.clone();
        future.when_complete(move || l.borrow_mut().push("future"));

        frame(&scheduler, 0);
        frame(&scheduler, 100);
        let log = log.borrow();
        assert_eq!(&log[log.len() - 3..], &["value", "completed", "future"]);
    }

    #[test]
    fn test_set_value_clamps_and_sets_status() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        controller.set_value(2.0);
        assert_eq!(controller.value(), 1.0);
        assert_eq!(controller.status(), AnimationStatus::Completed);
        controller.set_value(-1.0);
        assert_eq!(controller.status(), AnimationStatus::Dismissed);
        controller.set_value(0.5);
        assert_eq!(controller.status(), AnimationStatus::Forward);
        controller.reverse(None);
        controller.set_value(0.5);
        assert_eq!(controller.status(), AnimationStatus::Reverse);
    }

    #[test]
    fn test_midway_value_reports_running_status() {
        let scheduler = scheduler();
        let built = AnimationController::builder()
            .duration(Duration::from_millis(100))
            .value(0.5)
            .build(&scheduler);
        assert_eq!(built.status(), AnimationStatus::Forward);

        let controller = controller(&scheduler, 100);
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let s = statuses.clone();
        controller.add_status_listener(Rc::new(move |status| s.borrow_mut().push(status)));
        controller.set_value(0.5);
        controller.set_value(1.0 - 1e-7);
        assert_eq!(*statuses.borrow(), vec![AnimationStatus::Forward, AnimationStatus::Completed]);
    }

    #[test]
    fn test_fling_settles_within_bounds() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let max_seen = Rc::new(Cell::new(0.0f32));
        let m = max_seen.clone();
        let c = Rc::downgrade(&controller);
        controller.add_listener(Rc::new(move || {
            if let Some(c) = c.upgrade() {
                m.set(m.get().max(c.value()));
            }
        }));
        let future = controller.fling(2.0);
        for i in 0..120 {
            frame(&scheduler, i * 16);
        }
        assert!(future.is_completed());
        assert_eq!(controller.value(), 1.0);
        assert!(max_seen.get() <= 1.0);
        assert_eq!(controller.status(), AnimationStatus::Completed);
    }

    #[test]
    fn test_fling_negative_goes_to_lower_bound() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        controller.set_value(1.0);
        controller.fling(-1.0);
        assert_eq!(controller.status(), AnimationStatus::Reverse);
        for i in 0..120 {
            frame(&scheduler, i * 16);
        }
        assert_eq!(controller.value(), 0.0);
        assert_eq!(controller.status(), AnimationStatus::Dismissed);
    }

    #[test]
    fn test_repeat_with_reverse_flips_status() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let statuses = record_statuses(&controller);
        controller.repeat(None, None, true, None);
        frame(&scheduler, 0);
        frame(&scheduler, 50);
        frame(&scheduler, 150);
        assert!((controller.value() - 0.5).abs() < 1e-5);
        assert_eq!(controller.status(), AnimationStatus::Reverse);
        frame(&scheduler, 250);
        assert_eq!(controller.status(), AnimationStatus::Forward);
        assert_eq!(
            *statuses.borrow(),
            vec![
                AnimationStatus::Forward,
                AnimationStatus::Reverse,
                AnimationStatus::Forward
            ]
        );
        controller.stop();
    }

    #[test]
    fn test_velocity_while_running() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 1000);
        controller.forward(None);
        frame(&scheduler, 0);
        frame(&scheduler, 500);
        assert!((controller.velocity() - 1.0).abs() < 1e-2);
        controller.stop();
        assert_eq!(controller.velocity(), 0.0);
    }

    #[test]
    fn test_unbounded_controller() {
        let scheduler = scheduler();
        let controller = AnimationController::unbounded(5.0, None, Some("free"), &scheduler);
        controller.set_value(-300.0);
        assert_eq!(controller.value(), -300.0);
        controller.animate_to(100.0, Some(Duration::from_millis(100)), Curve::Linear);
        frame(&scheduler, 0);
        frame(&scheduler, 100);
        assert_eq!(controller.value(), 100.0);
    }

    #[test]
    fn test_resync_keeps_running() {
        let scheduler = scheduler();
        let other = FrameScheduler::new(&EngineConfig::default());
        let controller = controller(&scheduler, 100);
        controller.forward(None);
        frame(&scheduler, 0);
        controller.resync(&other);
        other.handle_begin_frame(Duration::ZERO);
        other.handle_begin_frame(Duration::from_millis(40));
        assert!(controller.is_animating());
        assert!(controller.value() > 0.0);
    }

    #[test]
    #[should_panic(expected = "called after dispose")]
    fn test_forward_after_dispose_panics() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        controller.dispose();
        controller.forward(None);
    }

    #[test]
    #[should_panic(expected = "called more than once")]
    fn test_double_dispose_panics() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        controller.dispose();
        controller.dispose();
    }

    #[test]
    fn test_dispose_cancels_running_future() {
        let scheduler = scheduler();
        let controller = controller(&scheduler, 100);
        let future = controller.forward(None);
        controller.dispose();
        assert!(future.is_canceled());
        assert_eq!(scheduler.transient_callback_count(), 0);
    }
}
