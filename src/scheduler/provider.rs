//! Ticker providers that track the tickers they hand out.

use std::cell::{Cell, RefCell};

use super::binding::FrameScheduler;
use super::ticker::{Ticker, TickerCallback, TickerProvider, WeakTicker};

/// Hands out any number of tickers and can mute them all at once.
pub struct TickerProviderState {
    scheduler: FrameScheduler,
    tickers: RefCell<Vec<WeakTicker>>,
    ticker_mode: Cell<bool>,
    debug_label: &'static str,
}

impl TickerProviderState {
    pub fn new(scheduler: FrameScheduler, debug_label: &'static str) -> Self {
        Self {
            scheduler,
            tickers: RefCell::new(Vec::new()),
            ticker_mode: Cell::new(true),
            debug_label,
        }
    }

    /// Enable or disable every live ticker. Disabled tickers are muted.
    pub fn set_ticker_mode(&self, enabled: bool) {
        self.ticker_mode.set(enabled);
        for ticker in self.live_tickers() {
            ticker.set_muted(!enabled);
        }
    }

    pub fn ticker_mode(&self) -> bool {
        self.ticker_mode.get()
    }

    pub fn active_ticker_count(&self) -> usize {
        self.live_tickers().iter().filter(|t| t.is_active()).count()
    }

    fn live_tickers(&self) -> Vec<Ticker> {
        let mut tickers = self.tickers.borrow_mut();
        tickers.retain(|t| t.upgrade().is_some_and(|t| !t.is_disposed()));
        tickers.iter().filter_map(WeakTicker::upgrade).collect()
    }

    /// Tickers must be disposed (or at least stopped) before their provider.
    pub fn dispose(&self) {
        let active = self.active_ticker_count();
        debug_assert!(
            active == 0,
            "{} was disposed with {} active ticker(s)",
            self.debug_label,
            active
        );
        if active > 0 {
            log::error!("{} disposed with {} active tickers", self.debug_label, active);
        }
        self.tickers.borrow_mut().clear();
    }
}

impl TickerProvider for TickerProviderState {
    fn create_ticker(&self, on_tick: TickerCallback) -> Ticker {
        let ticker = Ticker::new(
            on_tick,
            self.scheduler.clone(),
            Some(format!("created by {}", self.debug_label)),
        );
        ticker.set_muted(!self.ticker_mode.get());
        self.tickers.borrow_mut().push(ticker.downgrade());
        ticker
    }
}

/// Hands out at most one ticker.
pub struct SingleTickerProviderState {
    inner: TickerProviderState,
    created: Cell<bool>,
}

impl SingleTickerProviderState {
    pub fn new(scheduler: FrameScheduler, debug_label: &'static str) -> Self {
        Self {
            inner: TickerProviderState::new(scheduler, debug_label),
            created: Cell::new(false),
        }
    }

    pub fn set_ticker_mode(&self, enabled: bool) {
        self.inner.set_ticker_mode(enabled);
    }

    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl TickerProvider for SingleTickerProviderState {
    fn create_ticker(&self, on_tick: TickerCallback) -> Ticker {
        assert!(
            !self.created.get(),
            "{} created multiple tickers; use TickerProviderState instead",
            self.inner.debug_label
        );
        self.created.set(true);
        self.inner.create_ticker(on_tick)
    }
}
