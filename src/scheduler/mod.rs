//! Frame scheduling and tickers.

mod binding;
mod provider;
mod ticker;

pub use binding::{FrameCallback, FrameScheduler, SchedulerPhase};
pub use provider::{SingleTickerProviderState, TickerProviderState};
pub use ticker::{
    OrCancel, Ticker, TickerCallback, TickerCanceled, TickerFuture, TickerProvider, WeakTicker,
};
