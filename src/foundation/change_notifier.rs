//! Push-based change notification.
//!
//! Callbacks are identified by the address of their `Rc`. Registering the
//! same `Rc` twice means it is called twice per notification. Every
//! notification iterates a snapshot of the list taken before the first call,
//! and skips entries that an earlier callback removed during the same pass.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::assertions::guard_callback;

/// A callback without arguments.
pub type VoidCallback = Rc<dyn Fn()>;

/// A callback receiving a new value.
pub type ValueChanged<T> = Rc<dyn Fn(T)>;

/// Whether two callbacks are the same registration.
pub fn same_callback<F: ?Sized>(a: &Rc<F>, b: &Rc<F>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const u8, Rc::as_ptr(b) as *const u8)
}

/// Ordered list of callbacks with snapshot-then-iterate notification.
pub struct ListenerList<F: ?Sized> {
    entries: RefCell<Vec<Rc<F>>>,
}

impl<F: ?Sized> ListenerList<F> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Rc<F>) {
        self.entries.borrow_mut().push(listener);
    }

    /// Remove one registration of `listener`. Returns whether one was found.
    pub fn remove(&self, listener: &Rc<F>) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|e| same_callback(e, listener)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, listener: &Rc<F>) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| same_callback(e, listener))
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Call every registered listener through `call`.
    ///
    /// A panicking listener is reported under `library`/`context` and does not
    /// stop delivery to the others.
    pub fn notify(&self, library: &'static str, context: &dyn Fn() -> String, call: impl Fn(&F)) {
        let snapshot: Vec<Rc<F>> = self.entries.borrow().clone();
        for listener in snapshot {
            if !self.contains(&listener) {
                continue;
            }
            guard_callback(library, context, || call(&listener));
        }
    }
}

impl<F: ?Sized> Default for ListenerList<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// An object that maintains a list of listeners.
pub trait Listenable {
    fn add_listener(&self, listener: VoidCallback);
    fn remove_listener(&self, listener: &VoidCallback);
}

/// A [`Listenable`] that notifies on demand.
pub struct ChangeNotifier {
    listeners: ListenerList<dyn Fn()>,
    disposed: Cell<bool>,
    debug_label: &'static str,
}

impl ChangeNotifier {
    pub fn new(debug_label: &'static str) -> Self {
        Self {
            listeners: ListenerList::new(),
            disposed: Cell::new(false),
            debug_label,
        }
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn notify_listeners(&self) {
        self.assert_not_disposed();
        let label = self.debug_label;
        self.listeners.notify(
            "foundation library",
            &|| format!("while dispatching notifications for {}", label),
            |listener| listener(),
        );
    }

    /// Discard all listeners. The notifier must not be used afterwards.
    pub fn dispose(&self) {
        self.assert_not_disposed();
        self.listeners.clear();
        self.disposed.set(true);
    }

    fn assert_not_disposed(&self) {
        assert!(
            !self.disposed.get(),
            "A {} was used after being disposed.",
            self.debug_label
        );
    }
}

impl Listenable for ChangeNotifier {
    fn add_listener(&self, listener: VoidCallback) {
        self.assert_not_disposed();
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.listeners.remove(listener);
    }
}

/// A [`ChangeNotifier`] holding a single value; notifies when the value changes.
pub struct ValueNotifier<T> {
    value: RefCell<T>,
    notifier: ChangeNotifier,
}

impl<T: Clone + PartialEq> ValueNotifier<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            notifier: ChangeNotifier::new("ValueNotifier"),
        }
    }

    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn set_value(&self, value: T) {
        if *self.value.borrow() == value {
            return;
        }
        *self.value.borrow_mut() = value;
        self.notifier.notify_listeners();
    }

    pub fn dispose(&self) {
        self.notifier.dispose();
    }
}

impl<T> Listenable for ValueNotifier<T> {
    fn add_listener(&self, listener: VoidCallback) {
        self.notifier.add_listener(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.notifier.remove_listener(listener);
    }
}

/// A [`Listenable`] that forwards registrations to several others.
pub struct MergedListenable {
    children: Vec<Rc<dyn Listenable>>,
}

impl MergedListenable {
    pub fn new(children: Vec<Rc<dyn Listenable>>) -> Self {
        Self { children }
    }
}

impl Listenable for MergedListenable {
    fn add_listener(&self, listener: VoidCallback) {
        for child in &self.children {
            child.add_listener(listener.clone());
        }
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        for child in &self.children {
            child.remove_listener(listener);
        }
    }
}
