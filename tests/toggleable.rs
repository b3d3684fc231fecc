use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use kinetic::prelude::*;
use kinetic::rendering::{DrawCommand, PictureRecorder};

/// A toggle mounted as the root of a pipeline, plus everything it reported.
struct Harness {
    driver: FrameDriver,
    toggle: RenderId,
    reported: Rc<RefCell<Vec<Option<bool>>>>,
    now: u64,
}

impl Harness {
    fn new(build: impl FnOnce(Option<ValueChanged<Option<bool>>>, &FrameScheduler) -> RenderToggleable) -> Self {
        Self::with_callback(true, build)
    }

    fn with_callback(
        interactive: bool,
        build: impl FnOnce(Option<ValueChanged<Option<bool>>>, &FrameScheduler) -> RenderToggleable,
    ) -> Self {
        init_logging();
        let config = EngineConfig::default();
        let scheduler = FrameScheduler::new(&config);
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = reported.clone();
        let on_changed: Option<ValueChanged<Option<bool>>> = if interactive {
            Some(Rc::new(move |value| sink.borrow_mut().push(value)))
        } else {
            None
        };

        let mut pipeline = PipelineOwner::new(config);
        pipeline.set_root_constraints(BoxConstraints::loose(Size::new(200.0, 200.0)));
        let toggle = pipeline.set_root(Box::new(build(on_changed, &scheduler)));
        let mut harness = Self {
            driver: FrameDriver::new(scheduler, pipeline),
            toggle,
            reported,
            now: 0,
        };
        harness.pump();
        harness
    }

    /// Draw one frame 16ms after the previous one.
    fn pump(&mut self) -> PictureRecorder {
        let mut canvas = PictureRecorder::new();
        self.driver.draw_frame(Duration::from_millis(self.now), &mut canvas);
        self.now += 16;
        canvas
    }

    /// Draw frames until nothing is animating.
    fn settle(&mut self) {
        for _ in 0..100 {
            if !self.driver.needs_frame() {
                return;
            }
            self.pump();
        }
        panic!("animations never settled");
    }

    fn send(&mut self, event: PointerEvent) {
        self.driver.pipeline_mut().dispatch_pointer_event(&event);
    }

    fn tap(&mut self, position: Offset) {
        self.send(PointerEvent::Down { pointer: 1, position });
        self.send(PointerEvent::Up { pointer: 1, position });
    }

    fn object(&self) -> &RenderToggleable {
        self.driver
            .pipeline()
            .object::<RenderToggleable>(self.toggle)
            .unwrap()
    }

    /// Feed a reported value back, as an owner would.
    fn apply(&mut self, value: Option<bool>) {
        self.driver
            .pipeline_mut()
            .update::<RenderToggleable, _>(self.toggle, |toggle| toggle.set_value(value));
    }

    fn reported(&self) -> Vec<Option<bool>> {
        self.reported.borrow().clone()
    }
}

const CENTER: Offset = Offset::new(20.0, 20.0);

#[test]
fn test_checkbox_lays_out_at_its_fixed_size() {
    let harness = Harness::new(|on_changed, vsync| RenderToggleable::checkbox(Some(false), false, on_changed, vsync));
    let tree = harness.driver.pipeline().tree();
    assert_eq!(tree.size(harness.toggle), Size::new(40.0, 40.0));
}

#[test]
fn test_tristate_taps_cycle_through_values() {
    let mut harness =
        Harness::new(|on_changed, vsync| RenderToggleable::checkbox(Some(false), true, on_changed, vsync));

    let mut expected = Vec::new();
    for next in [Some(true), None, Some(false), Some(true)] {
        harness.tap(CENTER);
        expected.push(next);
        assert_eq!(harness.reported(), expected);

        harness.apply(next);
        harness.settle();
        assert_eq!(harness.object().value(), next);
    }
    // Settling a tristate toggle never reports on its own.
    assert_eq!(harness.reported(), expected);
}

#[test]
fn test_tristate_position_alternates_direction() {
    let mut harness =
        Harness::new(|on_changed, vsync| RenderToggleable::checkbox(Some(false), true, on_changed, vsync));

    harness.apply(Some(true));
    harness.settle();
    assert_eq!(harness.object().position_controller().status(), AnimationStatus::Completed);

    harness.apply(None);
    harness.settle();
    assert_eq!(harness.object().position_controller().status(), AnimationStatus::Dismissed);

    harness.apply(Some(false));
    harness.settle();
    assert_eq!(harness.object().position_controller().status(), AnimationStatus::Completed);
}

#[test]
fn test_switch_reports_position_that_disagrees_with_value() {
    let mut harness = Harness::new(|on_changed, vsync| RenderToggleable::switch(false, on_changed, vsync));

    // Something other than a tap drives the thumb all the way over.
    harness.object().position_controller().forward(None);
    harness.settle();

    assert_eq!(harness.reported(), vec![Some(true)]);
    assert_eq!(harness.object().value(), Some(false));
}

#[test]
fn test_partially_moved_switch_does_not_report() {
    let mut harness = Harness::new(|on_changed, vsync| RenderToggleable::switch(false, on_changed, vsync));

    harness.object().position_controller().set_value(0.5);
    harness.pump();
    // Attach last drove the thumb toward "off".
    assert_eq!(harness.object().position_controller().status(), AnimationStatus::Reverse);
    assert!(harness.reported().is_empty());

    harness.object().position_controller().set_value(1.0);
    assert_eq!(harness.reported(), vec![Some(true)]);
}

#[test]
fn test_moving_past_slop_cancels_the_tap() {
    let mut harness =
        Harness::new(|on_changed, vsync| RenderToggleable::checkbox(Some(false), false, on_changed, vsync));

    harness.send(PointerEvent::Down {
        pointer: 1,
        position: CENTER,
    });
    harness.pump();
    harness.pump();
    harness.send(PointerEvent::Move {
        pointer: 1,
        position: CENTER + Offset::new(19.0, 0.0),
    });
    harness.send(PointerEvent::Up {
        pointer: 1,
        position: CENTER + Offset::new(19.0, 0.0),
    });

    assert!(harness.reported().is_empty());
    assert_eq!(harness.object().reaction_controller().status(), AnimationStatus::Reverse);
}

#[test]
fn test_small_movement_still_taps() {
    let mut harness =
        Harness::new(|on_changed, vsync| RenderToggleable::checkbox(Some(true), false, on_changed, vsync));

    harness.send(PointerEvent::Down {
        pointer: 1,
        position: CENTER,
    });
    harness.send(PointerEvent::Move {
        pointer: 1,
        position: CENTER + Offset::new(5.0, 5.0),
    });
    harness.send(PointerEvent::Up {
        pointer: 1,
        position: CENTER + Offset::new(5.0, 5.0),
    });

    assert_eq!(harness.reported(), vec![Some(false)]);
}

#[test]
fn test_press_paints_radial_reaction() {
    let mut harness =
        Harness::new(|on_changed, vsync| RenderToggleable::checkbox(Some(false), false, on_changed, vsync));

    harness.send(PointerEvent::Down {
        pointer: 1,
        position: CENTER,
    });
    harness.pump();
    let canvas = harness.pump();

    assert_eq!(harness.object().reaction_controller().status(), AnimationStatus::Forward);
    let reaction = canvas
        .commands()
        .iter()
        .any(|command| matches!(command, DrawCommand::Circle { .. }));
    assert!(reaction, "expected the reaction circle in {:?}", canvas.commands());
}

#[test]
fn test_non_interactive_toggle_ignores_taps() {
    let mut harness = Harness::with_callback(false, |on_changed, vsync| {
        RenderToggleable::checkbox(Some(false), false, on_changed, vsync)
    });

    harness.tap(CENTER);
    harness.pump();

    assert!(!harness.object().is_interactive());
    assert!(harness.reported().is_empty());
    assert_eq!(harness.object().reaction_controller().status(), AnimationStatus::Dismissed);
}

#[test]
fn test_removing_toggle_disposes_controllers() {
    let mut harness = Harness::new(|on_changed, vsync| RenderToggleable::switch(true, on_changed, vsync));
    let position = harness.object().position_controller().clone();
    let reaction = harness.object().reaction_controller().clone();

    assert!(harness.driver.pipeline_mut().remove(harness.toggle));

    assert!(position.is_disposed());
    assert!(reaction.is_disposed());
    assert!(!harness.driver.needs_frame());
}
