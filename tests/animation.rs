use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};
use std::time::Duration;

use kinetic::prelude::*;

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

fn scheduler() -> FrameScheduler {
    init_logging();
    FrameScheduler::new(&EngineConfig::default())
}

fn frame(scheduler: &FrameScheduler, millis: u64) {
    scheduler.handle_begin_frame(Duration::from_millis(millis));
    scheduler.handle_draw_frame();
}

fn poll_once(future: &mut TickerFuture) -> Poll<()> {
    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);
    Pin::new(future).poll(&mut cx)
}

#[test]
fn test_tween_follows_controller() {
    let scheduler = scheduler();
    let controller = AnimationController::builder()
        .duration(Duration::from_millis(100))
        .build(&scheduler);
    let tweened = controller.view().drive(Tween::new(0.0f32, 100.0));

    controller.forward(None);
    let mut seen = Vec::new();
    for millis in [0, 25, 50, 75, 100] {
        frame(&scheduler, millis);
        seen.push(tweened.value());
    }

    for (value, expected) in seen.iter().zip([0.0, 25.0, 50.0, 75.0, 100.0]) {
        assert!((value - expected).abs() < 1e-3, "{} != {}", value, expected);
    }
    assert_eq!(tweened.status(), AnimationStatus::Completed);
}

#[test]
fn test_forward_completes_without_leaving_bounds() {
    let scheduler = scheduler();
    let controller = AnimationController::builder()
        .duration(Duration::from_millis(100))
        .build(&scheduler);
    let values = Rc::new(RefCell::new(Vec::new()));
    let v = values.clone();
    let c = controller.clone();
    controller.add_listener(Rc::new(move || v.borrow_mut().push(c.value())));

    controller.forward(None);
    for millis in (0..=160).step_by(16) {
        frame(&scheduler, millis);
    }

    assert_eq!(controller.status(), AnimationStatus::Completed);
    assert_eq!(controller.value(), 1.0);
    assert!(values.borrow().iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(values.borrow().windows(2).all(|w| w[0] <= w[1]));
    assert!(!controller.is_animating());
}

#[test]
fn test_stop_reports_no_terminal_status() {
    let scheduler = scheduler();
    let controller = AnimationController::builder()
        .duration(Duration::from_millis(100))
        .build(&scheduler);
    let statuses = Rc::new(RefCell::new(Vec::new()));
    let s = statuses.clone();
    controller.add_status_listener(Rc::new(move |status| s.borrow_mut().push(status)));

    let future = controller.forward(None);
    frame(&scheduler, 0);
    frame(&scheduler, 40);
    controller.stop();
    frame(&scheduler, 200);

    assert!((controller.value() - 0.4).abs() < 1e-6);
    assert_eq!(controller.status(), AnimationStatus::Forward);
    assert_eq!(*statuses.borrow(), vec![AnimationStatus::Forward]);
    assert!(future.is_canceled());
}

#[test]
fn test_superseded_future_never_resolves() {
    let scheduler = scheduler();
    let controller = AnimationController::builder()
        .duration(Duration::from_millis(100))
        .build(&scheduler);

    let mut forward = controller.forward(None);
    frame(&scheduler, 0);
    frame(&scheduler, 30);
    let mut reverse = controller.reverse(None);
    for millis in (30..=300).step_by(30) {
        frame(&scheduler, millis);
    }

    assert_eq!(controller.status(), AnimationStatus::Dismissed);
    assert_eq!(poll_once(&mut reverse), Poll::Ready(()));
    assert_eq!(poll_once(&mut forward), Poll::Pending);
    assert!(forward.is_canceled());
}

#[test]
fn test_curved_animation_uses_reverse_curve_backwards() {
    let scheduler = scheduler();
    let controller = AnimationController::builder()
        .duration(Duration::from_millis(100))
        .value(1.0)
        .build(&scheduler);
    let curved = CurvedAnimation::with_reverse_curve(controller.view(), Curve::EASE_IN, Some(Curve::EASE_OUT));

    controller.reverse(None);
    frame(&scheduler, 0);
    frame(&scheduler, 50);

    let expected = Curve::EASE_OUT.transform(controller.value());
    assert!((curved.value() - expected).abs() < 1e-6);
    // Evaluating the curve leaves the parent untouched.
    assert!((controller.value() - 0.5).abs() < 1e-6);
}
