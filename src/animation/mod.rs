//! Animation engine: controllers, tweens, curves and simulations.
//!
//! An [`Animation`] is a value that changes over time plus a coarse
//! [`AnimationStatus`]. Controllers produce animations from ticks;
//! [`CurvedAnimation`], [`ReverseAnimation`] and tweens driven through
//! [`AnimatableExt::animate`] are read-through views that never cache.
//! [`ProxyAnimation`], [`TrainHoppingAnimation`] and [`CompoundAnimation`]
//! switch between or combine other animations.

mod controller;
mod curved;
mod curves;
mod lerp;
mod simulation;
mod spring;
mod tween;
mod views;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::{Listenable, ListenerList, VoidCallback};

pub use controller::{AnimationController, AnimationControllerBuilder};
pub use curved::CurvedAnimation;
pub use curves::{Cubic, Curve};
pub use lerp::Lerp;
pub use simulation::{InterpolationSimulation, RepeatingSimulation, Simulation, Tolerance};
pub use spring::{SpringDescription, SpringSimulation, SpringType};
pub use tween::{
    AnimatableExt, Animatable, AnimatedEvaluation, Chained, ConstantTween, CurveTween, IntTween,
    ReverseTween, StepTween, Tween, TweenSequence, TweenSequenceItem,
};
pub use views::{CompoundAnimation, ProxyAnimation, TrainHoppingAnimation};

/// Coarse state of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationStatus {
    /// Stopped at the beginning.
    Dismissed,
    /// Running from beginning to end.
    Forward,
    /// Running from end to beginning.
    Reverse,
    /// Stopped at the end.
    Completed,
}

impl AnimationStatus {
    pub fn is_animating(self) -> bool {
        matches!(self, AnimationStatus::Forward | AnimationStatus::Reverse)
    }

    /// The status seen through a [`ReverseAnimation`].
    pub fn reversed(self) -> Self {
        match self {
            AnimationStatus::Forward => AnimationStatus::Reverse,
            AnimationStatus::Reverse => AnimationStatus::Forward,
            AnimationStatus::Completed => AnimationStatus::Dismissed,
            AnimationStatus::Dismissed => AnimationStatus::Completed,
        }
    }
}

/// Direction a controller is currently driving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationDirection {
    Forward,
    Reverse,
}

impl AnimationDirection {
    fn running_status(self) -> AnimationStatus {
        match self {
            AnimationDirection::Forward => AnimationStatus::Forward,
            AnimationDirection::Reverse => AnimationStatus::Reverse,
        }
    }

    fn terminal_status(self) -> AnimationStatus {
        match self {
            AnimationDirection::Forward => AnimationStatus::Completed,
            AnimationDirection::Reverse => AnimationStatus::Dismissed,
        }
    }
}

pub type StatusCallback = Rc<dyn Fn(AnimationStatus)>;

/// A value of type `T` that changes over time.
///
/// Value listeners (from [`Listenable`]) fire whenever the value changes;
/// status listeners fire when the status changes.
pub trait Animation<T>: Listenable {
    fn value(&self) -> T;
    fn status(&self) -> AnimationStatus;
    fn add_status_listener(&self, listener: StatusCallback);
    fn remove_status_listener(&self, listener: &StatusCallback);

    fn is_dismissed(&self) -> bool {
        self.status() == AnimationStatus::Dismissed
    }

    fn is_completed(&self) -> bool {
        self.status() == AnimationStatus::Completed
    }
}

/// Shared handle to any animation.
pub type AnimationRef<T> = Rc<dyn Animation<T>>;

/// Extension on animation handles.
pub trait AnimationExt {
    /// Live view of `animatable` evaluated at this animation's value.
    fn drive<T, A>(&self, animatable: A) -> Rc<AnimatedEvaluation<T, A>>
    where
        A: Animatable<T> + 'static,
        T: 'static;
}

impl AnimationExt for AnimationRef<f32> {
    fn drive<T, A>(&self, animatable: A) -> Rc<AnimatedEvaluation<T, A>>
    where
        A: Animatable<T> + 'static,
        T: 'static,
    {
        animatable.animate(self.clone())
    }
}

pub(crate) const ANIMATION_LIBRARY: &str = "animation library";

pub(crate) fn notify_status(
    listeners: &ListenerList<dyn Fn(AnimationStatus)>,
    status: AnimationStatus,
    label: &str,
) {
    listeners.notify(
        ANIMATION_LIBRARY,
        &|| format!("while notifying status listeners for {}", label),
        |listener| listener(status),
    );
}

pub(crate) fn notify_values(listeners: &ListenerList<dyn Fn()>, label: &str) {
    listeners.notify(
        ANIMATION_LIBRARY,
        &|| format!("while notifying listeners for {}", label),
        |listener| listener(),
    );
}

/// An animation that is stopped at a particular value.
pub struct AlwaysStoppedAnimation<T> {
    value: T,
    status: AnimationStatus,
}

impl<T: Clone> AlwaysStoppedAnimation<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            status: AnimationStatus::Forward,
        }
    }
}

/// An animation that is always complete, at value 1.0.
pub fn always_complete() -> AnimationRef<f32> {
    Rc::new(AlwaysStoppedAnimation {
        value: 1.0,
        status: AnimationStatus::Completed,
    })
}

/// An animation that is always dismissed, at value 0.0.
pub fn always_dismissed() -> AnimationRef<f32> {
    Rc::new(AlwaysStoppedAnimation {
        value: 0.0,
        status: AnimationStatus::Dismissed,
    })
}

impl<T> Listenable for AlwaysStoppedAnimation<T> {
    fn add_listener(&self, _listener: VoidCallback) {}
    fn remove_listener(&self, _listener: &VoidCallback) {}
}

impl<T: Clone> Animation<T> for AlwaysStoppedAnimation<T> {
    fn value(&self) -> T {
        self.value.clone()
    }

    fn status(&self) -> AnimationStatus {
        self.status
    }

    fn add_status_listener(&self, _listener: StatusCallback) {}
    fn remove_status_listener(&self, _listener: &StatusCallback) {}
}

/// Runs its parent backwards: value `1 - parent`, status mirrored.
pub struct ReverseAnimation {
    parent: AnimationRef<f32>,
    status_listeners: ListenerList<dyn Fn(AnimationStatus)>,
    // Installed on the parent while anyone listens to our status.
    parent_hook: RefCell<Option<StatusCallback>>,
    this: Weak<ReverseAnimation>,
}

impl ReverseAnimation {
    pub fn new(parent: AnimationRef<f32>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            parent,
            status_listeners: ListenerList::new(),
            parent_hook: RefCell::new(None),
            this: this.clone(),
        })
    }

    pub fn parent(&self) -> &AnimationRef<f32> {
        &self.parent
    }

    fn parent_status_changed(&self, status: AnimationStatus) {
        notify_status(&self.status_listeners, status.reversed(), "ReverseAnimation");
    }
}

impl Listenable for ReverseAnimation {
    fn add_listener(&self, listener: VoidCallback) {
        self.parent.add_listener(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.parent.remove_listener(listener);
    }
}

impl Animation<f32> for ReverseAnimation {
    fn value(&self) -> f32 {
        1.0 - self.parent.value()
    }

    fn status(&self) -> AnimationStatus {
        self.parent.status().reversed()
    }

    fn add_status_listener(&self, listener: StatusCallback) {
        self.status_listeners.add(listener);
        if self.parent_hook.borrow().is_some() {
            return;
        }
        let this = self.this.clone();
        let hook: StatusCallback = Rc::new(move |status| {
            if let Some(this) = this.upgrade() {
                this.parent_status_changed(status);
            }
        });
        self.parent.add_status_listener(hook.clone());
        *self.parent_hook.borrow_mut() = Some(hook);
    }

    fn remove_status_listener(&self, listener: &StatusCallback) {
        self.status_listeners.remove(listener);
        if !self.status_listeners.is_empty() {
            return;
        }
        let hook = self.parent_hook.borrow_mut().take();
        if let Some(hook) = hook {
            self.parent.remove_status_listener(&hook);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_always_stopped() {
        let animation = AlwaysStoppedAnimation::new(0.25f32);
        assert_eq!(animation.value(), 0.25);
        assert_eq!(animation.status(), AnimationStatus::Forward);
        assert!(always_complete().is_completed());
        assert_eq!(always_complete().value(), 1.0);
        assert!(always_dismissed().is_dismissed());
    }

    #[test]
    fn test_status_reversed() {
        assert_eq!(
            AnimationStatus::Completed.reversed(),
            AnimationStatus::Dismissed
        );
        assert_eq!(AnimationStatus::Forward.reversed(), AnimationStatus::Reverse);
        assert!(AnimationStatus::Reverse.is_animating());
        assert!(!AnimationStatus::Completed.is_animating());
    }

    #[test]
    fn test_reverse_animation_mirrors_parent() {
        let reversed = ReverseAnimation::new(always_complete());
        assert_eq!(reversed.value(), 0.0);
        assert_eq!(reversed.status(), AnimationStatus::Dismissed);
    }

    #[test]
    fn test_drive_reads_through() {
        let parent: AnimationRef<f32> = Rc::new(AlwaysStoppedAnimation::new(0.5f32));
        let driven = parent.drive(Tween::new(10.0f32, 20.0));
        assert_eq!(driven.value(), 15.0);
    }

    #[test]
    fn test_reverse_animation_unhooks_when_last_status_listener_leaves() {
        let reversed = ReverseAnimation::new(always_dismissed());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let listener: StatusCallback = Rc::new(move |_| c.set(c.get() + 1));
        reversed.add_status_listener(listener.clone());
        assert!(reversed.parent_hook.borrow().is_some());
        reversed.remove_status_listener(&listener);
        assert!(reversed.parent_hook.borrow().is_none());
    }
}
