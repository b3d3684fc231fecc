//! Tickers call a callback once per frame while active.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use thiserror::Error;

use crate::foundation::guard_callback;

use super::binding::{FrameScheduler, SchedulerPhase};

/// Receives the time elapsed since the ticker started.
pub type TickerCallback = Rc<dyn Fn(Duration)>;

/// Something that can hand out [`Ticker`]s.
pub trait TickerProvider {
    fn create_ticker(&self, on_tick: TickerCallback) -> Ticker;
}

/// The ticker was stopped or disposed before the run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the ticker was canceled before the animation completed")]
pub struct TickerCanceled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FutureState {
    Pending,
    Completed,
    Canceled,
}

struct FutureInner {
    state: Cell<FutureState>,
    on_complete: RefCell<Vec<Box<dyn FnOnce()>>>,
    on_settle: RefCell<Vec<Box<dyn FnOnce()>>>,
    wakers: RefCell<Vec<Waker>>,
    cancel_wakers: RefCell<Vec<Waker>>,
}

/// Completion token for one run of a [`Ticker`].
///
/// Awaiting it resolves when the run completes normally. A canceled run
/// leaves the future pending forever; use [`TickerFuture::or_cancel`] to
/// observe cancellation as an error.
#[derive(Clone)]
pub struct TickerFuture {
    inner: Rc<FutureInner>,
}

impl TickerFuture {
    fn with_state(state: FutureState) -> Self {
        Self {
            inner: Rc::new(FutureInner {
                state: Cell::new(state),
                on_complete: RefCell::new(Vec::new()),
                on_settle: RefCell::new(Vec::new()),
                wakers: RefCell::new(Vec::new()),
                cancel_wakers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn pending() -> Self {
        Self::with_state(FutureState::Pending)
    }

    /// A future that has already completed.
    pub fn complete() -> Self {
        Self::with_state(FutureState::Completed)
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.get() == FutureState::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.inner.state.get() == FutureState::Completed
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.state.get() == FutureState::Canceled
    }

    /// Run `callback` when the run completes normally. Never runs on cancel.
    pub fn when_complete(&self, callback: impl FnOnce() + 'static) {
        match self.inner.state.get() {
            FutureState::Pending => self.inner.on_complete.borrow_mut().push(Box::new(callback)),
            FutureState::Completed => callback(),
            FutureState::Canceled => {}
        }
    }

    /// Run `callback` when the run completes or is canceled.
    pub fn when_complete_or_cancel(&self, callback: impl FnOnce() + 'static) {
        match self.inner.state.get() {
            FutureState::Pending => self.inner.on_settle.borrow_mut().push(Box::new(callback)),
            FutureState::Completed | FutureState::Canceled => callback(),
        }
    }

    /// A future that resolves with `Err(TickerCanceled)` if the run is canceled.
    pub fn or_cancel(&self) -> OrCancel {
        OrCancel {
            future: self.clone(),
        }
    }

    pub(crate) fn resolve(&self) {
        if !self.is_pending() {
            return;
        }
        self.inner.state.set(FutureState::Completed);
        self.settle(true);
    }

    pub(crate) fn cancel(&self) {
        if !self.is_pending() {
            return;
        }
        self.inner.state.set(FutureState::Canceled);
        self.settle(false);
    }

    fn settle(&self, completed: bool) {
        let wakers = if completed {
            std::mem::take(&mut *self.inner.wakers.borrow_mut())
        } else {
            Vec::new()
        };
        let cancel_wakers = std::mem::take(&mut *self.inner.cancel_wakers.borrow_mut());
        for waker in wakers.into_iter().chain(cancel_wakers) {
            waker.wake();
        }

        let on_complete = std::mem::take(&mut *self.inner.on_complete.borrow_mut());
        let on_settle = std::mem::take(&mut *self.inner.on_settle.borrow_mut());
        let callbacks = if completed {
            on_complete.into_iter().chain(on_settle).collect::<Vec<_>>()
        } else {
            on_settle
        };
        for callback in callbacks {
            guard_callback(
                "scheduler library",
                || "while resolving a ticker future".to_string(),
                callback,
            );
        }
    }
}

impl Future for TickerFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.inner.state.get() {
            FutureState::Completed => Poll::Ready(()),
            FutureState::Pending | FutureState::Canceled => {
                let mut wakers = self.inner.wakers.borrow_mut();
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

/// See [`TickerFuture::or_cancel`].
pub struct OrCancel {
    future: TickerFuture,
}

impl Future for OrCancel {
    type Output = Result<(), TickerCanceled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.future.inner.state.get() {
            FutureState::Completed => Poll::Ready(Ok(())),
            FutureState::Canceled => Poll::Ready(Err(TickerCanceled)),
            FutureState::Pending => {
                self.future
                    .inner
                    .cancel_wakers
                    .borrow_mut()
                    .push(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

struct TickerInner {
    on_tick: RefCell<Option<TickerCallback>>,
    scheduler: FrameScheduler,
    future: RefCell<Option<TickerFuture>>,
    muted: Cell<bool>,
    start_time: Cell<Option<Duration>>,
    callback_id: Cell<Option<u64>>,
    disposed: Cell<bool>,
    debug_label: Option<String>,
}

/// Calls its callback once per frame while active and not muted.
///
/// Cloning yields another handle to the same ticker.
#[derive(Clone)]
pub struct Ticker {
    inner: Rc<TickerInner>,
}

/// Non-owning handle to a [`Ticker`].
#[derive(Clone)]
pub struct WeakTicker {
    inner: Weak<TickerInner>,
}

impl WeakTicker {
    pub fn upgrade(&self) -> Option<Ticker> {
        self.inner.upgrade().map(|inner| Ticker { inner })
    }
}

impl Ticker {
    pub fn new(on_tick: TickerCallback, scheduler: FrameScheduler, debug_label: Option<String>) -> Self {
        Self {
            inner: Rc::new(TickerInner {
                on_tick: RefCell::new(Some(on_tick)),
                scheduler,
                future: RefCell::new(None),
                muted: Cell::new(false),
                start_time: Cell::new(None),
                callback_id: Cell::new(None),
                disposed: Cell::new(false),
                debug_label,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakTicker {
        WeakTicker {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn label(&self) -> &str {
        self.inner.debug_label.as_deref().unwrap_or("Ticker")
    }

    /// Whether a run is in progress (even if muted).
    pub fn is_active(&self) -> bool {
        self.inner.future.borrow().is_some()
    }

    /// Whether the callback will be called on coming frames.
    pub fn is_ticking(&self) -> bool {
        self.is_active() && !self.is_muted()
    }

    pub fn is_muted(&self) -> bool {
        self.inner.muted.get()
    }

    /// Muting keeps the clock running but stops calling the callback.
    pub fn set_muted(&self, muted: bool) {
        if self.inner.muted.get() == muted {
            return;
        }
        self.inner.muted.set(muted);
        if muted {
            self.unschedule_tick();
        } else if self.should_schedule_tick() {
            self.schedule_tick();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Start a run. Panics if the ticker is already active or disposed.
    pub fn start(&self) -> TickerFuture {
        assert!(!self.is_disposed(), "{} was started after being disposed.", self.label());
        assert!(!self.is_active(), "{} was started twice.", self.label());
        let future = TickerFuture::pending();
        *self.inner.future.borrow_mut() = Some(future.clone());
        if self.should_schedule_tick() {
            self.schedule_tick();
        }
        let phase = self.inner.scheduler.phase();
        if phase > SchedulerPhase::Idle && phase < SchedulerPhase::PostFrameCallbacks {
            self.inner
                .start_time
                .set(self.inner.scheduler.current_frame_timestamp());
        }
        if self.is_muted() {
            log::warn!("{} started while muted", self.label());
        }
        future
    }

    /// End the run. A canceled run leaves its future unresolved; otherwise
    /// the future completes.
    pub fn stop(&self, canceled: bool) {
        if let Some(future) = self.deactivate() {
            if canceled {
                future.cancel();
            } else {
                future.resolve();
            }
        }
    }

    /// End the run without settling its future; the caller settles it.
    pub(crate) fn deactivate(&self) -> Option<TickerFuture> {
        let future = self.inner.future.borrow_mut().take()?;
        self.inner.start_time.set(None);
        self.unschedule_tick();
        Some(future)
    }

    /// Take over the run (and clock) of `original`, then dispose it.
    pub fn absorb_ticker(&self, original: &Ticker) {
        assert!(!self.is_active(), "cannot absorb into an active ticker");
        let future = original.inner.future.borrow_mut().take();
        if let Some(future) = future {
            *self.inner.future.borrow_mut() = Some(future);
            self.inner.start_time.set(original.inner.start_time.get());
            if self.should_schedule_tick() {
                self.schedule_tick();
            }
            original.unschedule_tick();
        }
        original.dispose();
    }

    /// Release the ticker. An active run is canceled.
    pub fn dispose(&self) {
        if let Some(future) = self.deactivate() {
            future.cancel();
        }
        self.inner.on_tick.borrow_mut().take();
        self.inner.disposed.set(true);
    }

    fn should_schedule_tick(&self) -> bool {
        !self.is_muted() && self.is_active() && self.inner.callback_id.get().is_none()
    }

    fn schedule_tick(&self) {
        let weak = Rc::downgrade(&self.inner);
        let id = self
            .inner
            .scheduler
            .schedule_frame_callback(Box::new(move |timestamp| {
                if let Some(inner) = weak.upgrade() {
                    Ticker { inner }.tick(timestamp);
                }
            }));
        self.inner.callback_id.set(Some(id));
    }

    fn unschedule_tick(&self) {
        if let Some(id) = self.inner.callback_id.take() {
            self.inner.scheduler.cancel_frame_callback(id);
        }
    }

    fn tick(&self, timestamp: Duration) {
        self.inner.callback_id.set(None);
        let start = match self.inner.start_time.get() {
            Some(start) => start,
            None => {
                self.inner.start_time.set(Some(timestamp));
                timestamp
            }
        };
        let on_tick = self.inner.on_tick.borrow().clone();
        if let Some(on_tick) = on_tick {
            on_tick(timestamp.saturating_sub(start));
        }
        if self.should_schedule_tick() {
            self.schedule_tick();
        }
    }
}
