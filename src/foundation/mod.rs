mod assertions;
mod change_notifier;

pub use assertions::{
    guard_callback, report_error, reset_error_handler, set_error_handler, CallbackError,
    ErrorDetails, ErrorHandler,
};
pub use change_notifier::{
    same_callback, ChangeNotifier, ListenerList, Listenable, MergedListenable, ValueChanged,
    ValueNotifier, VoidCallback,
};
