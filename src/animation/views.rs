use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::{notify_status, notify_values, Animation, AnimationRef, AnimationStatus, StatusCallback};
use crate::foundation::{Listenable, ListenerList, VoidCallback};

fn same_animation(a: &AnimationRef<f32>, b: &AnimationRef<f32>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const u8, Rc::as_ptr(b) as *const u8)
}

/// Callbacks a view registers on the animations it reads from.
struct ParentHooks {
    values: VoidCallback,
    status: StatusCallback,
}

impl ParentHooks {
    fn attach<T>(&self, parent: &dyn Animation<T>) {
        parent.add_listener(self.values.clone());
        parent.add_status_listener(self.status.clone());
    }

    fn detach<T>(&self, parent: &dyn Animation<T>) {
        parent.remove_listener(&self.values);
        parent.remove_status_listener(&self.status);
    }
}

/// Stands in for another animation that can be swapped at runtime.
///
/// Without a parent the proxy rests at the last value and status it saw,
/// or at 0.0 and dismissed if it never had one.
pub struct ProxyAnimation {
    parent: RefCell<Option<AnimationRef<f32>>>,
    value: Cell<f32>,
    status: Cell<AnimationStatus>,
    listeners: ListenerList<dyn Fn()>,
    status_listeners: ListenerList<dyn Fn(AnimationStatus)>,
    // Present while anyone listens to us and a parent is set.
    hooks: RefCell<Option<ParentHooks>>,
    this: Weak<ProxyAnimation>,
}

impl ProxyAnimation {
    pub fn new(parent: Option<AnimationRef<f32>>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            parent: RefCell::new(parent),
            value: Cell::new(0.0),
            status: Cell::new(AnimationStatus::Dismissed),
            listeners: ListenerList::new(),
            status_listeners: ListenerList::new(),
            hooks: RefCell::new(None),
            this: this.clone(),
        })
    }

    pub fn parent(&self) -> Option<AnimationRef<f32>> {
        self.parent.borrow().clone()
    }

    /// Swap the animation being proxied.
    ///
    /// Listeners hear about the swap only if it changes what they observe.
    pub fn set_parent(&self, parent: Option<AnimationRef<f32>>) {
        let previous = self.parent();
        match (&previous, &parent) {
            (Some(a), Some(b)) if same_animation(a, b) => return,
            (None, None) => return,
            _ => {}
        }

        if let Some(previous) = &previous {
            self.value.set(previous.value());
            self.status.set(previous.status());
            self.unhook();
        }

        *self.parent.borrow_mut() = parent.clone();
        let parent = match parent {
            Some(parent) => parent,
            None => return,
        };
        if self.is_listening() {
            self.hook();
        }
        if self.value.get() != parent.value() {
            notify_values(&self.listeners, "ProxyAnimation");
        }
        let status = parent.status();
        if self.status.get() != status {
            notify_status(&self.status_listeners, status, "ProxyAnimation");
        }
        self.value.set(0.0);
        self.status.set(AnimationStatus::Dismissed);
    }

    fn is_listening(&self) -> bool {
        !self.listeners.is_empty() || !self.status_listeners.is_empty()
    }

    fn hook(&self) {
        if self.hooks.borrow().is_some() {
            return;
        }
        let parent = match self.parent() {
            Some(parent) => parent,
            None => return,
        };
        let this = self.this.clone();
        let values: VoidCallback = Rc::new(move || {
            if let Some(this) = this.upgrade() {
                notify_values(&this.listeners, "ProxyAnimation");
            }
        });
        let this = self.this.clone();
        let status: StatusCallback = Rc::new(move |status| {
            if let Some(this) = this.upgrade() {
                notify_status(&this.status_listeners, status, "ProxyAnimation");
            }
        });
        let hooks = ParentHooks { values, status };
        hooks.attach(&*parent);
        *self.hooks.borrow_mut() = Some(hooks);
    }

    fn unhook(&self) {
        let hooks = self.hooks.borrow_mut().take();
        if let (Some(hooks), Some(parent)) = (hooks, self.parent()) {
            hooks.detach(&*parent);
        }
    }

    fn unhook_if_idle(&self) {
        if !self.is_listening() {
            self.unhook();
        }
    }
}

impl Listenable for ProxyAnimation {
    fn add_listener(&self, listener: VoidCallback) {
        self.listeners.add(listener);
        self.hook();
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.listeners.remove(listener);
        self.unhook_if_idle();
    }
}

impl Animation<f32> for ProxyAnimation {
    fn value(&self) -> f32 {
        match self.parent() {
            Some(parent) => parent.value(),
            None => self.value.get(),
        }
    }

    fn status(&self) -> AnimationStatus {
        match self.parent() {
            Some(parent) => parent.status(),
            None => self.status.get(),
        }
    }

    fn add_status_listener(&self, listener: StatusCallback) {
        self.status_listeners.add(listener);
        self.hook();
    }

    fn remove_status_listener(&self, listener: &StatusCallback) {
        self.status_listeners.remove(listener);
        self.unhook_if_idle();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HopMode {
    /// Hop once the next train drops to the current one.
    Minimize,
    /// Hop once the next train rises to the current one.
    Maximize,
}

/// Follows one animation until a second one crosses it, then follows the
/// second for good.
///
/// Unlike the other views this one listens to its trains from the start;
/// call [`TrainHoppingAnimation::dispose`] to let go of them.
pub struct TrainHoppingAnimation {
    current: RefCell<AnimationRef<f32>>,
    next: RefCell<Option<AnimationRef<f32>>>,
    mode: Cell<HopMode>,
    last_status: Cell<Option<AnimationStatus>>,
    last_value: Cell<Option<f32>>,
    on_switched_train: RefCell<Option<VoidCallback>>,
    listeners: ListenerList<dyn Fn()>,
    status_listeners: ListenerList<dyn Fn(AnimationStatus)>,
    hooks: ParentHooks,
}

impl TrainHoppingAnimation {
    pub fn new(
        mut current: AnimationRef<f32>,
        mut next: Option<AnimationRef<f32>>,
        on_switched_train: Option<VoidCallback>,
    ) -> Rc<Self> {
        let mut mode = HopMode::Minimize;
        if let Some(candidate) = next.clone() {
            if current.value() > candidate.value() {
                mode = HopMode::Maximize;
            } else if current.value() == candidate.value() {
                current = candidate;
                next = None;
            }
        }

        let animation = Rc::new_cyclic(|this: &Weak<TrainHoppingAnimation>| {
            let weak = this.clone();
            let values: VoidCallback = Rc::new(move || {
                if let Some(this) = weak.upgrade() {
                    this.value_changed();
                }
            });
            let weak = this.clone();
            let status: StatusCallback = Rc::new(move |status| {
                if let Some(this) = weak.upgrade() {
                    this.status_changed(status);
                }
            });
            Self {
                current: RefCell::new(current.clone()),
                next: RefCell::new(next.clone()),
                mode: Cell::new(mode),
                last_status: Cell::new(Some(current.status())),
                last_value: Cell::new(Some(current.value())),
                on_switched_train: RefCell::new(on_switched_train),
                listeners: ListenerList::new(),
                status_listeners: ListenerList::new(),
                hooks: ParentHooks { values, status },
            }
        });

        animation.hooks.attach(&*current);
        if let Some(next) = &next {
            next.add_listener(animation.hooks.values.clone());
        }
        animation
    }

    /// The train currently being followed.
    pub fn current_train(&self) -> AnimationRef<f32> {
        self.current.borrow().clone()
    }

    /// Whether a hop is still pending.
    pub fn has_next_train(&self) -> bool {
        self.next.borrow().is_some()
    }

    pub fn set_on_switched_train(&self, callback: Option<VoidCallback>) {
        *self.on_switched_train.borrow_mut() = callback;
    }

    /// Stop listening to both trains. The view keeps reading the current one.
    pub fn dispose(&self) {
        self.hooks.detach(&*self.current_train());
        let next = self.next.borrow_mut().take();
        if let Some(next) = next {
            next.remove_listener(&self.hooks.values);
        }
    }

    fn status_changed(&self, status: AnimationStatus) {
        if self.last_status.get() != Some(status) {
            self.last_status.set(Some(status));
            notify_status(&self.status_listeners, status, "TrainHoppingAnimation");
        }
    }

    fn value_changed(&self) {
        let next = self.next.borrow().clone();
        let hop = match next {
            Some(next) => {
                let current = self.current_train();
                let hop = match self.mode.get() {
                    HopMode::Minimize => next.value() <= current.value(),
                    HopMode::Maximize => next.value() >= current.value(),
                };
                if hop {
                    self.hop_to(current, next);
                }
                hop
            }
            None => false,
        };

        let value = self.value();
        if self.last_value.get() != Some(value) {
            self.last_value.set(Some(value));
            notify_values(&self.listeners, "TrainHoppingAnimation");
        }

        if hop {
            log::debug!("TrainHoppingAnimation switched train at {value:.3}");
            let callback = self.on_switched_train.borrow().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    fn hop_to(&self, previous: AnimationRef<f32>, next: AnimationRef<f32>) {
        self.hooks.detach(&*previous);
        *self.next.borrow_mut() = None;
        *self.current.borrow_mut() = next.clone();
        // The value hook is already on the new train.
        next.add_status_listener(self.hooks.status.clone());
        self.status_changed(next.status());
    }
}

impl Listenable for TrainHoppingAnimation {
    fn add_listener(&self, listener: VoidCallback) {
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.listeners.remove(listener);
    }
}

impl Animation<f32> for TrainHoppingAnimation {
    fn value(&self) -> f32 {
        self.current_train().value()
    }

    fn status(&self) -> AnimationStatus {
        self.current_train().status()
    }

    fn add_status_listener(&self, listener: StatusCallback) {
        self.status_listeners.add(listener);
    }

    fn remove_status_listener(&self, listener: &StatusCallback) {
        self.status_listeners.remove(listener);
    }
}

/// Combines two animations into one value.
///
/// The status is the second animation's while it runs, the first's
/// otherwise. Listeners hear about changes to the combined value and status
/// only.
pub struct CompoundAnimation<T> {
    first: AnimationRef<T>,
    next: AnimationRef<T>,
    combine: Box<dyn Fn(T, T) -> T>,
    label: &'static str,
    last_value: RefCell<Option<T>>,
    last_status: Cell<AnimationStatus>,
    listeners: ListenerList<dyn Fn()>,
    status_listeners: ListenerList<dyn Fn(AnimationStatus)>,
    hooks: RefCell<Option<ParentHooks>>,
    this: Weak<CompoundAnimation<T>>,
}

impl<T: Clone + PartialEq + 'static> CompoundAnimation<T> {
    pub fn new(
        first: AnimationRef<T>,
        next: AnimationRef<T>,
        combine: impl Fn(T, T) -> T + 'static,
    ) -> Rc<Self> {
        Self::labeled(first, next, "CompoundAnimation", combine)
    }

    fn labeled(
        first: AnimationRef<T>,
        next: AnimationRef<T>,
        label: &'static str,
        combine: impl Fn(T, T) -> T + 'static,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            first,
            next,
            combine: Box::new(combine),
            label,
            last_value: RefCell::new(None),
            last_status: Cell::new(AnimationStatus::Dismissed),
            listeners: ListenerList::new(),
            status_listeners: ListenerList::new(),
            hooks: RefCell::new(None),
            this: this.clone(),
        })
    }

    pub fn first(&self) -> &AnimationRef<T> {
        &self.first
    }

    pub fn next(&self) -> &AnimationRef<T> {
        &self.next
    }

    fn is_listening(&self) -> bool {
        !self.listeners.is_empty() || !self.status_listeners.is_empty()
    }

    fn hook(&self) {
        if self.hooks.borrow().is_some() {
            return;
        }
        *self.last_value.borrow_mut() = Some(self.value());
        self.last_status.set(self.status());

        let this = self.this.clone();
        let values: VoidCallback = Rc::new(move || {
            if let Some(this) = this.upgrade() {
                this.maybe_notify_values();
            }
        });
        let this = self.this.clone();
        let status: StatusCallback = Rc::new(move |_| {
            if let Some(this) = this.upgrade() {
                this.maybe_notify_status();
            }
        });
        let hooks = ParentHooks { values, status };
        hooks.attach(&*self.first);
        hooks.attach(&*self.next);
        *self.hooks.borrow_mut() = Some(hooks);
    }

    fn unhook_if_idle(&self) {
        if self.is_listening() {
            return;
        }
        let hooks = self.hooks.borrow_mut().take();
        if let Some(hooks) = hooks {
            hooks.detach(&*self.first);
            hooks.detach(&*self.next);
        }
    }

    fn maybe_notify_values(&self) {
        let value = self.value();
        if self.last_value.borrow().as_ref() == Some(&value) {
            return;
        }
        *self.last_value.borrow_mut() = Some(value);
        notify_values(&self.listeners, self.label);
    }

    fn maybe_notify_status(&self) {
        let status = self.status();
        if status != self.last_status.get() {
            self.last_status.set(status);
            notify_status(&self.status_listeners, status, self.label);
        }
    }
}

impl CompoundAnimation<f32> {
    /// Average of the two values.
    pub fn mean(left: AnimationRef<f32>, right: AnimationRef<f32>) -> Rc<Self> {
        Self::labeled(left, right, "AnimationMean", |a, b| (a + b) / 2.0)
    }

    /// Larger of the two values.
    pub fn max(left: AnimationRef<f32>, right: AnimationRef<f32>) -> Rc<Self> {
        Self::labeled(left, right, "AnimationMax", f32::max)
    }

    /// Smaller of the two values.
    pub fn min(left: AnimationRef<f32>, right: AnimationRef<f32>) -> Rc<Self> {
        Self::labeled(left, right, "AnimationMin", f32::min)
    }
}

impl<T: Clone + PartialEq + 'static> Listenable for CompoundAnimation<T> {
    fn add_listener(&self, listener: VoidCallback) {
        self.listeners.add(listener);
        self.hook();
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.listeners.remove(listener);
        self.unhook_if_idle();
    }
}

impl<T: Clone + PartialEq + 'static> Animation<T> for CompoundAnimation<T> {
    fn value(&self) -> T {
        (self.combine)(self.first.value(), self.next.value())
    }

    fn status(&self) -> AnimationStatus {
        let next = self.next.status();
        if next.is_animating() {
            next
        } else {
            self.first.status()
        }
    }

    fn add_status_listener(&self, listener: StatusCallback) {
        self.status_listeners.add(listener);
        self.hook();
    }

    fn remove_status_listener(&self, listener: &StatusCallback) {
        self.status_listeners.remove(listener);
        self.unhook_if_idle();
    }
}
