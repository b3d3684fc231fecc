use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{Animation, AnimationRef, AnimationStatus, Curve, StatusCallback};
use crate::foundation::{Listenable, VoidCallback};

/// Applies a [`Curve`] to a parent animation.
///
/// While the parent runs in reverse, `reverse_curve` (if any) is used instead.
/// The direction is latched when a run starts, so reversing midway keeps the
/// curve that the run started with until the parent settles.
pub struct CurvedAnimation {
    parent: AnimationRef<f32>,
    curve: RefCell<Curve>,
    reverse_curve: RefCell<Option<Curve>>,
    curve_direction: Rc<Cell<Option<AnimationStatus>>>,
    direction_listener: StatusCallback,
}

impl CurvedAnimation {
    pub fn new(parent: AnimationRef<f32>, curve: Curve) -> Rc<Self> {
        Self::with_reverse_curve(parent, curve, None)
    }

    pub fn with_reverse_curve(
        parent: AnimationRef<f32>,
        curve: Curve,
        reverse_curve: Option<Curve>,
    ) -> Rc<Self> {
        let curve_direction = Rc::new(Cell::new(None));
        update_curve_direction(&curve_direction, parent.status());

        let direction = curve_direction.clone();
        let direction_listener: StatusCallback =
            Rc::new(move |status| update_curve_direction(&direction, status));
        parent.add_status_listener(direction_listener.clone());

        Rc::new(Self {
            parent,
            curve: RefCell::new(curve),
            reverse_curve: RefCell::new(reverse_curve),
            curve_direction,
            direction_listener,
        })
    }

    pub fn parent(&self) -> &AnimationRef<f32> {
        &self.parent
    }

    pub fn curve(&self) -> Curve {
        self.curve.borrow().clone()
    }

    pub fn set_curve(&self, curve: Curve) {
        *self.curve.borrow_mut() = curve;
    }

    pub fn reverse_curve(&self) -> Option<Curve> {
        self.reverse_curve.borrow().clone()
    }

    pub fn set_reverse_curve(&self, curve: Option<Curve>) {
        *self.reverse_curve.borrow_mut() = curve;
    }

    fn use_forward_curve(&self) -> bool {
        self.reverse_curve.borrow().is_none()
            || self
                .curve_direction
                .get()
                .unwrap_or_else(|| self.parent.status())
                != AnimationStatus::Reverse
    }
}

fn update_curve_direction(direction: &Cell<Option<AnimationStatus>>, status: AnimationStatus) {
    match status {
        AnimationStatus::Dismissed | AnimationStatus::Completed => direction.set(None),
        AnimationStatus::Forward | AnimationStatus::Reverse => {
            if direction.get().is_none() {
                direction.set(Some(status));
            }
        }
    }
}

impl Drop for CurvedAnimation {
    fn drop(&mut self) {
        self.parent.remove_status_listener(&self.direction_listener);
    }
}

impl Listenable for CurvedAnimation {
    fn add_listener(&self, listener: VoidCallback) {
        self.parent.add_listener(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.parent.remove_listener(listener);
    }
}

impl Animation<f32> for CurvedAnimation {
    fn value(&self) -> f32 {
        let t = self.parent.value();
        if t == 0.0 || t == 1.0 {
            return t;
        }
        if self.use_forward_curve() {
            self.curve.borrow().transform(t)
        } else {
            match self.reverse_curve.borrow().as_ref() {
                Some(curve) => curve.transform(t),
                None => t,
            }
        }
    }

    fn status(&self) -> AnimationStatus {
        self.parent.status()
    }

    fn add_status_listener(&self, listener: StatusCallback) {
        self.parent.add_status_listener(listener);
    }

    fn remove_status_listener(&self, listener: &StatusCallback) {
        self.parent.remove_status_listener(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AlwaysStoppedAnimation;

    #[test]
    fn test_endpoints_pass_through() {
        let complete: AnimationRef<f32> = Rc::new(AlwaysStoppedAnimation::new(1.0f32));
        let curved = CurvedAnimation::new(complete, Curve::BOUNCE_IN);
        assert_eq!(curved.value(), 1.0);
    }

    #[test]
    fn test_forward_curve_applied() {
        let parent: AnimationRef<f32> = Rc::new(AlwaysStoppedAnimation::new(0.5f32));
        let curved = CurvedAnimation::new(parent, Curve::custom(|t| t * t));
        assert_eq!(curved.value(), 0.25);
    }

    #[test]
    fn test_curve_can_be_replaced() {
        let parent: AnimationRef<f32> = Rc::new(AlwaysStoppedAnimation::new(0.5f32));
        let curved = CurvedAnimation::new(parent, Curve::Linear);
        assert_eq!(curved.value(), 0.5);
        curved.set_curve(Curve::custom(|t| t / 2.0));
        assert_eq!(curved.value(), 0.25);
    }
}
