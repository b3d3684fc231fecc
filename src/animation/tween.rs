//! Pure value mappings from animation progress.

use std::marker::PhantomData;
use std::rc::Rc;

use super::{Animation, AnimationRef, AnimationStatus, Curve, Lerp, StatusCallback};
use crate::foundation::{Listenable, VoidCallback};

/// Maps a progress value `t` to a `T`.
pub trait Animatable<T> {
    fn transform(&self, t: f32) -> T;

    /// Evaluate at the current value of `animation`.
    fn evaluate(&self, animation: &dyn Animation<f32>) -> T {
        self.transform(animation.value())
    }
}

/// Composition helpers available on every [`Animatable`].
pub trait AnimatableExt<T>: Animatable<T> + Sized {
    /// Feed the output of `parent` into this animatable.
    ///
    /// `parent` runs first: `tween.chain(curve)` applies the curve, then the tween.
    fn chain<P: Animatable<f32>>(self, parent: P) -> Chained<P, Self> {
        Chained {
            parent,
            outer: self,
        }
    }

    /// Live view of this animatable driven by `parent`.
    fn animate(self, parent: AnimationRef<f32>) -> Rc<AnimatedEvaluation<T, Self>>
    where
        Self: 'static,
        T: 'static,
    {
        Rc::new(AnimatedEvaluation {
            parent,
            animatable: self,
            _marker: PhantomData,
        })
    }
}

impl<T, A: Animatable<T>> AnimatableExt<T> for A {}

impl<T, A: Animatable<T> + ?Sized> Animatable<T> for Box<A> {
    fn transform(&self, t: f32) -> T {
        (**self).transform(t)
    }
}

/// Two animatables run in sequence; see [`AnimatableExt::chain`].
#[derive(Debug, Clone)]
pub struct Chained<P, A> {
    parent: P,
    outer: A,
}

impl<T, P: Animatable<f32>, A: Animatable<T>> Animatable<T> for Chained<P, A> {
    fn transform(&self, t: f32) -> T {
        self.outer.transform(self.parent.transform(t))
    }
}

/// Interpolates linearly between `begin` and `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T> {
    pub begin: T,
    pub end: T,
}

impl<T: Lerp> Tween<T> {
    pub fn new(begin: T, end: T) -> Self {
        Self { begin, end }
    }

    /// Value at `t`. Unclamped, so overshooting curves extrapolate.
    pub fn lerp(&self, t: f32) -> T {
        T::lerp(&self.begin, &self.end, t)
    }
}

impl<T: Lerp> Animatable<T> for Tween<T> {
    fn transform(&self, t: f32) -> T {
        if t == 0.0 {
            return self.begin.clone();
        }
        if t == 1.0 {
            return self.end.clone();
        }
        self.lerp(t)
    }
}

/// A tween evaluated from `end` to `begin`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseTween<T> {
    pub parent: Tween<T>,
}

impl<T: Lerp> ReverseTween<T> {
    pub fn new(parent: Tween<T>) -> Self {
        Self { parent }
    }
}

impl<T: Lerp> Animatable<T> for ReverseTween<T> {
    fn transform(&self, t: f32) -> T {
        self.parent.transform(1.0 - t)
    }
}

/// Always yields the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantTween<T> {
    pub value: T,
}

impl<T: Clone> ConstantTween<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone> Animatable<T> for ConstantTween<T> {
    fn transform(&self, _t: f32) -> T {
        self.value.clone()
    }
}

/// Integer tween that rounds to the nearest integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntTween {
    pub begin: i32,
    pub end: i32,
}

impl IntTween {
    pub fn new(begin: i32, end: i32) -> Self {
        Self { begin, end }
    }
}

impl Animatable<i32> for IntTween {
    fn transform(&self, t: f32) -> i32 {
        if t == 0.0 {
            return self.begin;
        }
        if t == 1.0 {
            return self.end;
        }
        (self.begin as f32 + (self.end - self.begin) as f32 * t).round() as i32
    }
}

/// Integer tween that floors, so each step is held for an equal share of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTween {
    pub begin: i32,
    pub end: i32,
}

impl StepTween {
    pub fn new(begin: i32, end: i32) -> Self {
        Self { begin, end }
    }
}

impl Animatable<i32> for StepTween {
    fn transform(&self, t: f32) -> i32 {
        if t == 0.0 {
            return self.begin;
        }
        if t == 1.0 {
            return self.end;
        }
        (self.begin as f32 + (self.end - self.begin) as f32 * t).floor() as i32
    }
}

/// Applies a [`Curve`] to the progress value.
#[derive(Debug, Clone)]
pub struct CurveTween {
    pub curve: Curve,
}

impl CurveTween {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }
}

impl Animatable<f32> for CurveTween {
    fn transform(&self, t: f32) -> f32 {
        if t == 0.0 || t == 1.0 {
            return t;
        }
        self.curve.transform(t)
    }
}

/// One weighted segment of a [`TweenSequence`].
pub struct TweenSequenceItem<T> {
    pub tween: Box<dyn Animatable<T>>,
    pub weight: f32,
}

impl<T> TweenSequenceItem<T> {
    pub fn new(tween: impl Animatable<T> + 'static, weight: f32) -> Self {
        assert!(weight > 0.0, "tween sequence weights must be positive");
        Self {
            tween: Box::new(tween),
            weight,
        }
    }
}

/// Runs several animatables back to back, each for a share of `[0, 1]`
/// proportional to its weight.
pub struct TweenSequence<T> {
    items: Vec<TweenSequenceItem<T>>,
    intervals: Vec<(f32, f32)>,
}

impl<T> TweenSequence<T> {
    pub fn new(items: Vec<TweenSequenceItem<T>>) -> Self {
        assert!(!items.is_empty(), "a tween sequence needs at least one item");
        let total: f32 = items.iter().map(|item| item.weight).sum();
        let mut start = 0.0;
        let intervals = items
            .iter()
            .map(|item| {
                let end = start + item.weight / total;
                let interval = (start, end);
                start = end;
                interval
            })
            .collect();
        Self { items, intervals }
    }
}

impl<T> Animatable<T> for TweenSequence<T> {
    fn transform(&self, t: f32) -> T {
        let last = self.items.len() - 1;
        if t >= 1.0 {
            return self.items[last].tween.transform(1.0);
        }
        let index = self
            .intervals
            .iter()
            .position(|&(start, end)| t >= start && t < end)
            .unwrap_or(if t < 0.0 { 0 } else { last });
        let (start, end) = self.intervals[index];
        let local = (t - start) / (end - start);
        self.items[index].tween.transform(local)
    }
}

/// An animatable evaluated against a live parent animation.
///
/// Every read re-evaluates; nothing is cached between reads.
pub struct AnimatedEvaluation<T, A> {
    parent: AnimationRef<f32>,
    animatable: A,
    _marker: PhantomData<fn() -> T>,
}

impl<T, A> AnimatedEvaluation<T, A> {
    pub fn parent(&self) -> &AnimationRef<f32> {
        &self.parent
    }

    pub fn animatable(&self) -> &A {
        &self.animatable
    }
}

impl<T, A> Listenable for AnimatedEvaluation<T, A> {
    fn add_listener(&self, listener: VoidCallback) {
        self.parent.add_listener(listener);
    }

    fn remove_listener(&self, listener: &VoidCallback) {
        self.parent.remove_listener(listener);
    }
}

impl<T, A: Animatable<T>> Animation<T> for AnimatedEvaluation<T, A> {
    fn value(&self) -> T {
        self.animatable.evaluate(&*self.parent)
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
    use crate::geometry::Color;

    #[test]
    fn test_tween_endpoints_are_exact() {
        let tween = Tween::new(Color::rgb(0.1, 0.2, 0.3), Color::rgb(0.9, 0.8, 0.7));
        assert_eq!(tween.transform(0.0), tween.begin);
        assert_eq!(tween.transform(1.0), tween.end);
    }

    #[test]
    fn test_tween_extrapolates() {
        let tween = Tween::new(0.0f32, 100.0);
        assert_eq!(tween.transform(1.5), 150.0);
        assert_eq!(tween.transform(-0.5), -50.0);
    }

    #[test]
    fn test_chain_applies_parent_first() {
        // Threshold first, then tween: only 0 or 100 can come out.
        let chained = Tween::new(0.0f32, 100.0).chain(CurveTween::new(Curve::Threshold(0.5)));
        assert_eq!(chained.transform(0.25), 0.0);
        assert_eq!(chained.transform(0.75), 100.0);
    }

    #[test]
    fn test_linear_chain_steps() {
        let chained = Tween::new(0.0f32, 100.0).chain(CurveTween::new(Curve::Linear));
        let outputs: Vec<f32> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|&t| chained.transform(t))
            .collect();
        assert_eq!(outputs, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn test_reverse_and_constant_tween() {
        let reverse = ReverseTween::new(Tween::new(0.0f32, 10.0));
        assert_eq!(reverse.transform(0.0), 10.0);
        assert_eq!(reverse.transform(1.0), 0.0);
        assert_eq!(ConstantTween::new(7).transform(0.3), 7);
    }

    #[test]
    fn test_int_and_step_tween() {
        assert_eq!(IntTween::new(0, 10).transform(0.44), 4);
        assert_eq!(IntTween::new(0, 10).transform(0.46), 5);
        assert_eq!(StepTween::new(0, 10).transform(0.46), 4);
        assert_eq!(StepTween::new(0, 10).transform(1.0), 10);
    }

    #[test]
    fn test_tween_sequence() {
        let sequence = TweenSequence::new(vec![
            TweenSequenceItem::new(Tween::new(0.0f32, 1.0), 1.0),
            TweenSequenceItem::new(ConstantTween::new(1.0f32), 1.0),
            TweenSequenceItem::new(Tween::new(1.0f32, 0.0), 2.0),
        ]);
        assert_eq!(sequence.transform(0.0), 0.0);
        assert_eq!(sequence.transform(0.125), 0.5);
        assert_eq!(sequence.transform(0.3), 1.0);
        assert_eq!(sequence.transform(0.75), 0.5);
        assert_eq!(sequence.transform(1.0), 0.0);
    }

    #[test]
    fn test_animated_evaluation_follows_parent() {
        let parent: AnimationRef<f32> = Rc::new(AlwaysStoppedAnimation::new(0.25f32));
        let evaluation = Tween::new(0.0f32, 8.0).animate(parent);
        assert_eq!(evaluation.value(), 2.0);
        assert_eq!(evaluation.status(), AnimationStatus::Forward);
    }
}
