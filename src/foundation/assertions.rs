//! Structured reporting for failures raised by user callbacks.
//!
//! Listener, status-listener and completion callbacks run inside the frame.
//! A panic in one of them is caught, wrapped in an [`ErrorDetails`] and sent
//! to the installed error handler; the frame then carries on with the
//! remaining callbacks.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use thiserror::Error;

/// Failure raised while running a user callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("callback panicked: {0}")]
    Panicked(String),
}

/// A reported error, attributed to the library and the activity that caught it.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub error: CallbackError,
    pub library: &'static str,
    pub context: String,
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exception caught by {} {}: {}",
            self.library, self.context, self.error
        )
    }
}

pub type ErrorHandler = Rc<dyn Fn(&ErrorDetails)>;

thread_local! {
    static ERROR_HANDLER: RefCell<Option<ErrorHandler>> = const { RefCell::new(None) };
}

/// Install the handler that receives reported errors on this thread.
///
/// Returns the previously installed handler, if any.
pub fn set_error_handler(handler: impl Fn(&ErrorDetails) + 'static) -> Option<ErrorHandler> {
    ERROR_HANDLER.with(|h| h.borrow_mut().replace(Rc::new(handler)))
}

/// Restore the default handler, which logs the error.
pub fn reset_error_handler() {
    ERROR_HANDLER.with(|h| h.borrow_mut().take());
}

/// Route an error to the installed handler, or log it.
pub fn report_error(details: ErrorDetails) {
    let handler = ERROR_HANDLER.with(|h| h.borrow().clone());
    match handler {
        Some(handler) => handler(&details),
        None => log::error!("{}", details),
    }
}

/// Run `f`, reporting a panic instead of unwinding into the caller.
///
/// Returns `None` when the callback panicked.
pub fn guard_callback<R>(
    library: &'static str,
    context: impl FnOnce() -> String,
    f: impl FnOnce() -> R,
) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            report_error(ErrorDetails {
                error: CallbackError::Panicked(panic_message(payload.as_ref())),
                library,
                context: context(),
            });
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_guard_passes_value_through() {
        let result = guard_callback("test library", || "while testing".into(), || 42);
        assert_eq!(result, Some(42));
    }

    #[test]
    fn test_guard_reports_panics() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        set_error_handler(move |details| sink.borrow_mut().push(details.clone()));

        let result: Option<()> = guard_callback("test library", || "while testing".into(), || {
            panic!("boom");
        });
        reset_error_handler();

        assert!(result.is_none());
        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].library, "test library");
        assert_eq!(reports[0].context, "while testing");
        assert_eq!(reports[0].error, CallbackError::Panicked("boom".into()));
    }

    #[test]
    fn test_display() {
        let details = ErrorDetails {
            error: CallbackError::Panicked("bad".into()),
            library: "animation library",
            context: "while notifying listeners".into(),
        };
        assert_eq!(
            details.to_string(),
            "Exception caught by animation library while notifying listeners: callback panicked: bad"
        );
    }
}
