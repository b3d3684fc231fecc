//! In-process frame scheduler.
//!
//! The host calls [`FrameScheduler::handle_begin_frame`] once per vsync with
//! its raw timestamp. Transient callbacks (tickers) registered for that frame
//! run first, in registration order; [`FrameScheduler::handle_draw_frame`]
//! then runs post-frame callbacks and returns the scheduler to idle.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::foundation::guard_callback;

use super::ticker::{Ticker, TickerCallback, TickerProvider};

/// Callback receiving the (dilated) frame timestamp.
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// Where the scheduler is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchedulerPhase {
    Idle,
    TransientCallbacks,
    MidFrame,
    PostFrameCallbacks,
}

struct SchedulerState {
    next_callback_id: u64,
    transient_callbacks: BTreeMap<u64, FrameCallback>,
    removed_ids: HashSet<u64>,
    post_frame_callbacks: Vec<FrameCallback>,
    phase: SchedulerPhase,
    frame_requested: bool,
    current_frame_timestamp: Option<Duration>,
    time_dilation: f32,
    epoch_start: Duration,
    first_raw_timestamp_in_epoch: Option<Duration>,
    last_raw_timestamp: Duration,
    frame_count: u64,
}

/// Shared handle to the frame scheduler.
#[derive(Clone)]
pub struct FrameScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl FrameScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState {
                next_callback_id: 0,
                transient_callbacks: BTreeMap::new(),
                removed_ids: HashSet::new(),
                post_frame_callbacks: Vec::new(),
                phase: SchedulerPhase::Idle,
                frame_requested: false,
                current_frame_timestamp: None,
                time_dilation: config.time_dilation,
                epoch_start: Duration::ZERO,
                first_raw_timestamp_in_epoch: None,
                last_raw_timestamp: Duration::ZERO,
                frame_count: 0,
            })),
        }
    }

    /// Register `callback` for the next frame. Returns an id for cancellation.
    pub fn schedule_frame_callback(&self, callback: FrameCallback) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_callback_id;
        state.next_callback_id += 1;
        state.transient_callbacks.insert(id, callback);
        state.frame_requested = true;
        id
    }

    pub fn cancel_frame_callback(&self, id: u64) {
        let mut state = self.state.borrow_mut();
        state.transient_callbacks.remove(&id);
        state.removed_ids.insert(id);
    }

    /// Register `callback` to run once at the end of the current (or next) frame.
    pub fn add_post_frame_callback(&self, callback: FrameCallback) {
        self.state.borrow_mut().post_frame_callbacks.push(callback);
    }

    pub fn transient_callback_count(&self) -> usize {
        self.state.borrow().transient_callbacks.len()
    }

    pub fn schedule_frame(&self) {
        self.state.borrow_mut().frame_requested = true;
    }

    pub fn has_scheduled_frame(&self) -> bool {
        self.state.borrow().frame_requested
    }

    /// Check if a frame has been requested and clear the flag
    pub fn take_frame_request(&self) -> bool {
        std::mem::replace(&mut self.state.borrow_mut().frame_requested, false)
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.state.borrow().phase
    }

    /// Timestamp of the frame being processed, if any.
    pub fn current_frame_timestamp(&self) -> Option<Duration> {
        self.state.borrow().current_frame_timestamp
    }

    pub fn frame_count(&self) -> u64 {
        self.state.borrow().frame_count
    }

    pub fn time_dilation(&self) -> f32 {
        self.state.borrow().time_dilation
    }

    /// Slow down (or speed up) all animations. Starts a new time epoch so the
    /// change does not make timestamps jump.
    pub fn set_time_dilation(&self, time_dilation: f32) {
        assert!(time_dilation > 0.0, "time dilation must be positive");
        let mut state = self.state.borrow_mut();
        if state.time_dilation == time_dilation {
            return;
        }
        let raw = state.last_raw_timestamp;
        state.epoch_start = adjust_for_epoch(&state, raw);
        state.first_raw_timestamp_in_epoch = None;
        state.time_dilation = time_dilation;
    }

    /// Run the transient callbacks for a frame starting at `raw_timestamp`.
    pub fn handle_begin_frame(&self, raw_timestamp: Duration) {
        let (timestamp, callbacks) = {
            let mut state = self.state.borrow_mut();
            if state.first_raw_timestamp_in_epoch.is_none() {
                state.first_raw_timestamp_in_epoch = Some(raw_timestamp);
            }
            let timestamp = adjust_for_epoch(&state, raw_timestamp);
            state.last_raw_timestamp = raw_timestamp;
            state.current_frame_timestamp = Some(timestamp);
            state.frame_requested = false;
            state.frame_count += 1;
            state.phase = SchedulerPhase::TransientCallbacks;
            state.removed_ids.clear();
            (timestamp, std::mem::take(&mut state.transient_callbacks))
        };
        log::trace!(
            "begin frame #{} at {:?} ({} callbacks)",
            self.frame_count(),
            timestamp,
            callbacks.len()
        );

        for (id, callback) in callbacks {
            if self.state.borrow().removed_ids.contains(&id) {
                continue;
            }
            guard_callback(
                "scheduler library",
                || "during a scheduler callback".to_string(),
                || callback(timestamp),
            );
        }

        self.state.borrow_mut().phase = SchedulerPhase::MidFrame;
    }

    /// Finish the frame: run post-frame callbacks and go idle.
    pub fn handle_draw_frame(&self) {
        let (timestamp, callbacks) = {
            let mut state = self.state.borrow_mut();
            state.phase = SchedulerPhase::PostFrameCallbacks;
            (
                state.current_frame_timestamp.unwrap_or_default(),
                std::mem::take(&mut state.post_frame_callbacks),
            )
        };
        for callback in callbacks {
            guard_callback(
                "scheduler library",
                || "during a post-frame callback".to_string(),
                || callback(timestamp),
            );
        }
        let mut state = self.state.borrow_mut();
        state.phase = SchedulerPhase::Idle;
        state.current_frame_timestamp = None;
    }
}

fn adjust_for_epoch(state: &SchedulerState, raw_timestamp: Duration) -> Duration {
    let since_epoch = match state.first_raw_timestamp_in_epoch {
        Some(first) => raw_timestamp.saturating_sub(first),
        None => Duration::ZERO,
    };
    state.epoch_start + since_epoch.div_f64(state.time_dilation as f64)
}

impl TickerProvider for FrameScheduler {
    fn create_ticker(&self, on_tick: TickerCallback) -> Ticker {
        Ticker::new(on_tick, self.clone(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn scheduler() -> FrameScheduler {
        FrameScheduler::new(&EngineConfig::default())
    }

    #[test]
    fn test_callbacks_run_once_with_timestamp() {
        let scheduler = scheduler();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        scheduler.schedule_frame_callback(Box::new(move |ts| s.set(Some(ts))));
        assert!(scheduler.has_scheduled_frame());

        scheduler.handle_begin_frame(Duration::from_millis(16));
        scheduler.handle_draw_frame();
        assert_eq!(seen.get(), Some(Duration::ZERO));
        assert_eq!(scheduler.transient_callback_count(), 0);
        assert!(!scheduler.has_scheduled_frame());
    }

    #[test]
    fn test_cancelled_callback_does_not_run() {
        let scheduler = scheduler();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let id = scheduler.schedule_frame_callback(Box::new(move |_| r.set(true)));
        scheduler.cancel_frame_callback(id);
        scheduler.handle_begin_frame(Duration::ZERO);
        assert!(!ran.get());
    }

    #[test]
    fn test_callback_cancelled_by_earlier_callback_in_same_frame() {
        let scheduler = scheduler();
        let ran = Rc::new(Cell::new(false));
        let victim_id = Rc::new(Cell::new(0));

        let s = scheduler.clone();
        let v = victim_id.clone();
        scheduler.schedule_frame_callback(Box::new(move |_| s.cancel_frame_callback(v.get())));
        let r = ran.clone();
        victim_id.set(scheduler.schedule_frame_callback(Box::new(move |_| r.set(true))));

        scheduler.handle_begin_frame(Duration::ZERO);
        assert!(!ran.get());
    }

    #[test]
    fn test_timestamps_are_relative_to_first_frame() {
        let scheduler = scheduler();
        let seen = Rc::new(Cell::new(None));
        scheduler.handle_begin_frame(Duration::from_secs(10));
        scheduler.handle_draw_frame();
        let s = seen.clone();
        scheduler.schedule_frame_callback(Box::new(move |ts| s.set(Some(ts))));
        scheduler.handle_begin_frame(Duration::from_millis(10_500));
        assert_eq!(seen.get(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_time_dilation_slows_timestamps() {
        let scheduler = FrameScheduler::new(&EngineConfig::new().time_dilation(2.0));
        scheduler.handle_begin_frame(Duration::ZERO);
        scheduler.handle_draw_frame();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        scheduler.schedule_frame_callback(Box::new(move |ts| s.set(Some(ts))));
        scheduler.handle_begin_frame(Duration::from_secs(1));
        assert_eq!(seen.get(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_post_frame_callbacks_and_phase() {
        let scheduler = scheduler();
        let phase = Rc::new(Cell::new(SchedulerPhase::Idle));
        let p = phase.clone();
        let s = scheduler.clone();
        scheduler.add_post_frame_callback(Box::new(move |_| p.set(s.phase())));
        scheduler.handle_begin_frame(Duration::ZERO);
        assert_eq!(scheduler.phase(), SchedulerPhase::MidFrame);
        scheduler.handle_draw_frame();
        assert_eq!(phase.get(), SchedulerPhase::PostFrameCallbacks);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }
}
