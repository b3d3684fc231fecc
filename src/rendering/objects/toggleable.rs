//! Checkbox and switch render objects.
//!
//! A toggle owns two independent controllers: the position controller moves
//! the visual state between off (0) and on (1), the reaction controller drives
//! the radial highlight shown while the toggle is pressed. They only meet in
//! `paint`.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::animation::{
    Animatable, Animation, AnimationController, AnimationStatus, CurvedAnimation, Curve, Lerp,
    StatusCallback, Tween,
};
use crate::foundation::{guard_callback, Listenable, MergedListenable, ValueChanged, VoidCallback};
use crate::geometry::{Color, Offset, RRect, Rect, Size};
use crate::rendering::canvas::{Canvas, Paint, Path};
use crate::rendering::constraints::BoxConstraints;
use crate::rendering::events::{PointerEvent, PointerId};
use crate::rendering::invalidation::RenderHandle;
use crate::rendering::object::{LayoutContext, PaintingContext, RenderObject};
use crate::scheduler::TickerProvider;

pub const TOGGLE_DURATION: Duration = Duration::from_millis(200);
pub const RADIAL_REACTION_DURATION: Duration = Duration::from_millis(100);
pub const RADIAL_REACTION_RADIUS: f32 = 20.0;
pub const RADIAL_REACTION_ALPHA: u8 = 0x1F;
/// Distance a pointer may travel before a tap is canceled.
pub const TOUCH_SLOP: f32 = 18.0;

const CHECKBOX_EDGE: f32 = 18.0;
const CHECKBOX_RADIUS: f32 = 1.0;
const CHECKBOX_STROKE: f32 = 2.0;

const TRACK_HEIGHT: f32 = 14.0;
const TRACK_WIDTH: f32 = 33.0;
const TRACK_RADIUS: f32 = TRACK_HEIGHT / 2.0;
const THUMB_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleableKind {
    Checkbox,
    Switch,
}

impl ToggleableKind {
    pub fn size(self) -> Size {
        match self {
            ToggleableKind::Checkbox => Size::square(2.0 * RADIAL_REACTION_RADIUS),
            ToggleableKind::Switch => Size::new(
                TRACK_WIDTH - 2.0 * TRACK_RADIUS + 2.0 * RADIAL_REACTION_RADIUS,
                2.0 * RADIAL_REACTION_RADIUS,
            ),
        }
    }
}

/// The value a completed tap reports.
///
/// `false -> true`, `true -> None` when tristate (else `false`), `None -> false`.
pub fn next_value(value: Option<bool>, tristate: bool) -> Option<bool> {
    match value {
        Some(false) => Some(true),
        Some(true) if tristate => None,
        Some(true) | None => Some(false),
    }
}

/// State read by the position status listener as well as the object.
struct ToggleState {
    value: Cell<Option<bool>>,
    tristate: Cell<bool>,
    on_changed: RefCell<Option<ValueChanged<Option<bool>>>>,
}

impl ToggleState {
    fn is_interactive(&self) -> bool {
        self.on_changed.borrow().is_some()
    }

    fn report(&self, value: Option<bool>) {
        let Some(on_changed) = self.on_changed.borrow().clone() else {
            return;
        };
        guard_callback(
            "rendering library",
            || format!("while reporting a toggle change to {:?}", value),
            || on_changed(value),
        );
    }

    // A non-tristate toggle that finishes moving against its value reports
    // the position it settled at.
    fn position_status_changed(&self, status: AnimationStatus) {
        if !self.is_interactive() || self.tristate.get() {
            return;
        }
        let value = self.value.get();
        if status == AnimationStatus::Completed && value == Some(false) {
            self.report(Some(true));
        } else if status == AnimationStatus::Dismissed && value != Some(false) {
            self.report(Some(false));
        }
    }
}

/// A checkbox or switch.
///
/// The owner feeds the new value back with [`set_value`](Self::set_value)
/// after `on_changed` reports it.
pub struct RenderToggleable {
    kind: ToggleableKind,
    state: Rc<ToggleState>,
    /// Value before the last change, for checkbox transitions
    old_value: Option<bool>,
    active_color: Color,
    inactive_color: Color,
    check_color: Color,
    active_track_color: Color,
    inactive_track_color: Color,
    position_controller: Rc<AnimationController>,
    position: Rc<CurvedAnimation>,
    reaction_controller: Rc<AnimationController>,
    reaction: Rc<CurvedAnimation>,
    position_status_listener: StatusCallback,
    repaint: MergedListenable,
    repaint_listener: Option<VoidCallback>,
    handle: Option<RenderHandle>,
    tap_pointer: Option<PointerId>,
    down_position: Option<Offset>,
}

impl RenderToggleable {
    pub fn new(
        kind: ToggleableKind,
        value: Option<bool>,
        tristate: bool,
        on_changed: Option<ValueChanged<Option<bool>>>,
        vsync: &dyn TickerProvider,
    ) -> Self {
        debug_assert!(tristate || value.is_some(), "only a tristate toggle can be None");

        let position_controller = AnimationController::builder()
            .duration(TOGGLE_DURATION)
            .value(if value == Some(false) { 0.0 } else { 1.0 })
            .debug_label("toggle position")
            .build(vsync);
        let position = CurvedAnimation::new(position_controller.view(), Curve::LINEAR);

        let reaction_controller = AnimationController::builder()
            .duration(RADIAL_REACTION_DURATION)
            .debug_label("toggle reaction")
            .build(vsync);
        let reaction = CurvedAnimation::new(reaction_controller.view(), Curve::FAST_OUT_SLOW_IN);

        let state = Rc::new(ToggleState {
            value: Cell::new(value),
            tristate: Cell::new(tristate),
            on_changed: RefCell::new(on_changed),
        });
        let listener_state = state.clone();
        let position_status_listener: StatusCallback =
            Rc::new(move |status| listener_state.position_status_changed(status));
        position.add_status_listener(position_status_listener.clone());

        let repaint = MergedListenable::new(vec![
            position.clone() as Rc<dyn Listenable>,
            reaction.clone() as Rc<dyn Listenable>,
        ]);

        Self {
            kind,
            state,
            old_value: value,
            active_color: Color::from_hex(0x2196F3),
            inactive_color: Color::rgba(0.0, 0.0, 0.0, 0.54),
            check_color: Color::WHITE,
            active_track_color: Color::from_hex(0x2196F3).with_alpha(0x80),
            inactive_track_color: Color::rgba(0.0, 0.0, 0.0, 0.38),
            position_controller,
            position,
            reaction_controller,
            reaction,
            position_status_listener,
            repaint,
            repaint_listener: None,
            handle: None,
            tap_pointer: None,
            down_position: None,
        }
    }

    pub fn checkbox(
        value: Option<bool>,
        tristate: bool,
        on_changed: Option<ValueChanged<Option<bool>>>,
        vsync: &dyn TickerProvider,
    ) -> Self {
        Self::new(ToggleableKind::Checkbox, value, tristate, on_changed, vsync)
    }

    pub fn switch(value: bool, on_changed: Option<ValueChanged<Option<bool>>>, vsync: &dyn TickerProvider) -> Self {
        Self::new(ToggleableKind::Switch, Some(value), false, on_changed, vsync)
    }

    pub fn active_color(mut self, color: Color) -> Self {
        self.active_color = color;
        self
    }

    pub fn inactive_color(mut self, color: Color) -> Self {
        self.inactive_color = color;
        self
    }

    pub fn check_color(mut self, color: Color) -> Self {
        self.check_color = color;
        self
    }

    pub fn track_colors(mut self, active: Color, inactive: Color) -> Self {
        self.active_track_color = active;
        self.inactive_track_color = inactive;
        self
    }

    pub fn kind(&self) -> ToggleableKind {
        self.kind
    }

    pub fn value(&self) -> Option<bool> {
        self.state.value.get()
    }

    /// Animate toward a new value.
    pub fn set_value(&mut self, value: Option<bool>) {
        debug_assert!(self.tristate() || value.is_some(), "only a tristate toggle can be None");
        let current = self.state.value.get();
        if value == current {
            return;
        }
        self.old_value = current;
        self.state.value.set(value);
        self.position.set_curve(Curve::EASE_IN);
        self.position.set_reverse_curve(Some(Curve::EASE_OUT));

        if self.tristate() {
            match self.position_controller.status() {
                AnimationStatus::Forward | AnimationStatus::Completed => {
                    self.position_controller.reverse(None);
                }
                AnimationStatus::Dismissed | AnimationStatus::Reverse => {
                    self.position_controller.forward(None);
                }
            }
        } else if value == Some(true) {
            self.position_controller.forward(None);
        } else {
            self.position_controller.reverse(None);
        }
    }

    pub fn tristate(&self) -> bool {
        self.state.tristate.get()
    }

    pub fn set_tristate(&mut self, tristate: bool) {
        self.state.tristate.set(tristate);
    }

    pub fn is_interactive(&self) -> bool {
        self.state.is_interactive()
    }

    pub fn set_on_changed(&mut self, on_changed: Option<ValueChanged<Option<bool>>>) {
        let was_interactive = self.is_interactive();
        *self.state.on_changed.borrow_mut() = on_changed;
        if was_interactive != self.is_interactive() {
            self.mark_needs_paint();
        }
    }

    pub fn set_active_color(&mut self, color: Color) {
        if self.active_color != color {
            self.active_color = color;
            self.mark_needs_paint();
        }
    }

    pub fn set_inactive_color(&mut self, color: Color) {
        if self.inactive_color != color {
            self.inactive_color = color;
            self.mark_needs_paint();
        }
    }

    pub fn position_controller(&self) -> &Rc<AnimationController> {
        &self.position_controller
    }

    pub fn reaction_controller(&self) -> &Rc<AnimationController> {
        &self.reaction_controller
    }

    pub fn position(&self) -> &Rc<CurvedAnimation> {
        &self.position
    }

    /// Move both controllers to another ticker provider.
    pub fn resync(&self, vsync: &dyn TickerProvider) {
        self.position_controller.resync(vsync);
        self.reaction_controller.resync(vsync);
    }

    fn mark_needs_paint(&self) {
        if let Some(handle) = &self.handle {
            handle.mark_needs_paint();
        }
    }

    fn handle_tap_down(&mut self, local: Offset) {
        self.down_position = Some(local);
        self.reaction_controller.forward(None);
    }

    fn handle_tap_up(&mut self) {
        self.down_position = None;
        self.reaction_controller.reverse(None);
    }

    fn handle_tap(&self) {
        if !self.is_interactive() {
            return;
        }
        self.state.report(next_value(self.value(), self.tristate()));
    }

    fn handle_tap_cancel(&mut self) {
        self.tap_pointer = None;
        self.down_position = None;
        self.reaction_controller.reverse(None);
    }

    fn paint_radial_reaction(&self, canvas: &mut dyn Canvas, offset: Offset, origin: Offset) {
        if self.reaction.is_dismissed() {
            return;
        }
        let t = self.reaction.value();
        let paint = Paint::fill(self.active_color.with_alpha(RADIAL_REACTION_ALPHA));
        let center = Offset::lerp(&self.down_position.unwrap_or(origin), &origin, t);
        let radius = Tween::new(0.0, RADIAL_REACTION_RADIUS).transform(t);
        canvas.draw_circle(center + offset, radius, &paint);
    }

    fn paint_checkbox(&self, canvas: &mut dyn Canvas, offset: Offset, size: Size) {
        self.paint_radial_reaction(canvas, offset, size.center(Offset::ZERO));

        let origin = offset
            + Offset::new(
                (size.width - CHECKBOX_EDGE) / 2.0,
                (size.height - CHECKBOX_EDGE) / 2.0,
            );
        let status = self.position.status();
        let t_normalized = match status {
            AnimationStatus::Forward | AnimationStatus::Completed => self.position.value(),
            AnimationStatus::Reverse | AnimationStatus::Dismissed => 1.0 - self.position.value(),
        };
        let value = self.value();
        let old_value = self.old_value;

        if old_value == Some(false) || value == Some(false) {
            let t = if value == Some(false) { 1.0 - t_normalized } else { t_normalized };
            let outer = checkbox_outer_rect(origin, t);
            let color = self.checkbox_color_at(t);
            if t <= 0.5 {
                // Border thickens until the box is filled
                let border = (CHECKBOX_STROKE + outer.rect.width * t).min(outer.rect.width / 2.0);
                canvas.draw_rrect(outer, &Paint::stroke(color, border));
            } else {
                canvas.draw_rrect(outer, &Paint::fill(color));
                let shrink = (t - 0.5) * 2.0;
                if old_value.is_none() || value.is_none() {
                    self.draw_dash(canvas, origin, shrink);
                } else {
                    self.draw_check(canvas, origin, shrink);
                }
            }
        } else {
            // Between checked and indeterminate
            let outer = checkbox_outer_rect(origin, 1.0);
            canvas.draw_rrect(outer, &Paint::fill(self.checkbox_color_at(1.0)));
            if t_normalized <= 0.5 {
                let shrink = 1.0 - t_normalized * 2.0;
                if old_value == Some(true) {
                    self.draw_check(canvas, origin, shrink);
                } else {
                    self.draw_dash(canvas, origin, shrink);
                }
            } else {
                let expand = (t_normalized - 0.5) * 2.0;
                if value == Some(true) {
                    self.draw_check(canvas, origin, expand);
                } else {
                    self.draw_dash(canvas, origin, expand);
                }
            }
        }
    }

    fn checkbox_color_at(&self, t: f32) -> Color {
        if !self.is_interactive() {
            self.inactive_color
        } else if t >= 0.25 {
            self.active_color
        } else {
            Color::lerp(&self.inactive_color, &self.active_color, t * 4.0)
        }
    }

    fn draw_check(&self, canvas: &mut dyn Canvas, origin: Offset, t: f32) {
        let start = Offset::new(CHECKBOX_EDGE * 0.15, CHECKBOX_EDGE * 0.45);
        let mid = Offset::new(CHECKBOX_EDGE * 0.4, CHECKBOX_EDGE * 0.7);
        let end = Offset::new(CHECKBOX_EDGE * 0.85, CHECKBOX_EDGE * 0.25);
        let path = if t < 0.5 {
            let draw_mid = Offset::lerp(&start, &mid, t * 2.0);
            Path::new().move_to(origin + start).line_to(origin + draw_mid)
        } else {
            let draw_end = Offset::lerp(&mid, &end, (t - 0.5) * 2.0);
            Path::new()
                .move_to(origin + start)
                .line_to(origin + mid)
                .line_to(origin + draw_end)
        };
        canvas.draw_path(&path, &Paint::stroke(self.check_color, CHECKBOX_STROKE));
    }

    fn draw_dash(&self, canvas: &mut dyn Canvas, origin: Offset, t: f32) {
        let start = Offset::new(CHECKBOX_EDGE * 0.2, CHECKBOX_EDGE * 0.5);
        let mid = Offset::new(CHECKBOX_EDGE * 0.5, CHECKBOX_EDGE * 0.5);
        let end = Offset::new(CHECKBOX_EDGE * 0.8, CHECKBOX_EDGE * 0.5);
        let draw_start = Offset::lerp(&start, &mid, 1.0 - t);
        let draw_end = Offset::lerp(&mid, &end, t);
        canvas.draw_line(
            origin + draw_start,
            origin + draw_end,
            &Paint::stroke(self.check_color, CHECKBOX_STROKE),
        );
    }

    fn paint_switch(&self, canvas: &mut dyn Canvas, offset: Offset, size: Size) {
        let enabled = self.is_interactive();
        let current = self.position.value();

        let (track_color, thumb_color) = if enabled {
            (
                Color::lerp(&self.inactive_track_color, &self.active_track_color, current),
                Color::lerp(&self.inactive_color, &self.active_color, current),
            )
        } else {
            (self.inactive_track_color, self.inactive_color)
        };

        let track_padding = RADIAL_REACTION_RADIUS - TRACK_RADIUS;
        let track = Rect::new(
            offset.dx + track_padding,
            offset.dy + (size.height - TRACK_HEIGHT) / 2.0,
            size.width - 2.0 * track_padding,
            TRACK_HEIGHT,
        );
        canvas.draw_rrect(RRect::new(track, TRACK_RADIUS), &Paint::fill(track_color));

        let inner_length = size.width - 2.0 * RADIAL_REACTION_RADIUS;
        let thumb = Offset::new(RADIAL_REACTION_RADIUS + current * inner_length, size.height / 2.0);
        self.paint_radial_reaction(canvas, offset, thumb);

        let inset = 1.0 - (current - 0.5).abs() * 2.0;
        canvas.draw_circle(thumb + offset, THUMB_RADIUS - inset, &Paint::fill(thumb_color));
    }
}

fn checkbox_outer_rect(origin: Offset, t: f32) -> RRect {
    let inset = 1.0 - (t - 0.5).abs() * 2.0;
    let size = CHECKBOX_EDGE - inset * CHECKBOX_STROKE;
    let rect = Rect::new(origin.dx + inset, origin.dy + inset, size, size);
    RRect::new(rect, CHECKBOX_RADIUS)
}

impl RenderObject for RenderToggleable {
    fn perform_layout(&mut self, _cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        BoxConstraints::tight(self.kind.size())
            .enforce(constraints)
            .constrain(Size::ZERO)
    }

    fn paint(&self, cx: &mut PaintingContext, offset: Offset) {
        let size = cx.size();
        let canvas = cx.canvas();
        match self.kind {
            ToggleableKind::Checkbox => self.paint_checkbox(canvas, offset, size),
            ToggleableKind::Switch => self.paint_switch(canvas, offset, size),
        }
    }

    fn hit_test_self(&self, _position: Offset, _size: Size) -> bool {
        true
    }

    fn handle_event(&mut self, event: &PointerEvent, local: Offset) {
        match *event {
            PointerEvent::Down { pointer, .. } => {
                if self.is_interactive() && self.tap_pointer.is_none() {
                    self.tap_pointer = Some(pointer);
                    self.handle_tap_down(local);
                }
            }
            PointerEvent::Move { pointer, .. } => {
                if self.tap_pointer != Some(pointer) {
                    return;
                }
                let moved = self
                    .down_position
                    .map(|down| (local - down).distance() > TOUCH_SLOP)
                    .unwrap_or(false);
                if moved {
                    self.handle_tap_cancel();
                }
            }
            PointerEvent::Up { pointer, .. } => {
                if self.tap_pointer == Some(pointer) {
                    self.tap_pointer = None;
                    self.handle_tap_up();
                    self.handle_tap();
                }
            }
            PointerEvent::Cancel { pointer, .. } => {
                if self.tap_pointer == Some(pointer) {
                    self.handle_tap_cancel();
                }
            }
        }
    }

    fn attach(&mut self, handle: RenderHandle) {
        let repaint_handle = handle.clone();
        let listener: VoidCallback = Rc::new(move || repaint_handle.mark_needs_paint());
        self.repaint.add_listener(listener.clone());
        self.repaint_listener = Some(listener);
        self.handle = Some(handle);

        if self.value() == Some(false) {
            self.position_controller.reverse(None);
        } else {
            self.position_controller.forward(None);
        }
        if self.is_interactive() {
            match self.reaction_controller.status() {
                AnimationStatus::Forward => {
                    self.reaction_controller.forward(None);
                }
                AnimationStatus::Reverse => {
                    self.reaction_controller.reverse(None);
                }
                AnimationStatus::Dismissed | AnimationStatus::Completed => {}
            }
        }
    }

    fn detach(&mut self) {
        self.position_controller.stop();
        self.reaction_controller.stop();
        if let Some(listener) = self.repaint_listener.take() {
            self.repaint.remove_listener(&listener);
        }
        self.handle = None;
        self.tap_pointer = None;
        self.down_position = None;
    }

    fn dispose(&mut self) {
        self.position.remove_status_listener(&self.position_status_listener);
        self.position_controller.dispose();
        self.reaction_controller.dispose();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::scheduler::FrameScheduler;

    #[test]
    fn test_next_value() {
        assert_eq!(next_value(Some(false), false), Some(true));
        assert_eq!(next_value(Some(true), false), Some(false));
        assert_eq!(next_value(Some(false), true), Some(true));
        assert_eq!(next_value(Some(true), true), None);
        assert_eq!(next_value(None, true), Some(false));
    }

    #[test]
    fn test_kind_sizes() {
        assert_eq!(ToggleableKind::Checkbox.size(), Size::new(40.0, 40.0));
        assert_eq!(ToggleableKind::Switch.size(), Size::new(59.0, 40.0));
    }

    #[test]
    fn test_initial_position_follows_value() {
        let scheduler = FrameScheduler::new(&EngineConfig::default());
        let off = RenderToggleable::checkbox(Some(false), false, None, &scheduler);
        assert_eq!(off.position_controller().value(), 0.0);
        let indeterminate = RenderToggleable::checkbox(None, true, None, &scheduler);
        assert_eq!(indeterminate.position_controller().value(), 1.0);
    }

    #[test]
    fn test_set_value_switches_curves_and_direction() {
        let scheduler = FrameScheduler::new(&EngineConfig::default());
        let mut toggle = RenderToggleable::switch(false, None, &scheduler);
        toggle.set_value(Some(true));

        assert_eq!(toggle.position().curve().transform(0.3), Curve::EASE_IN.transform(0.3));
        assert_eq!(
            toggle.position().reverse_curve().map(|curve| curve.transform(0.3)),
            Some(Curve::EASE_OUT.transform(0.3))
        );
        assert_eq!(toggle.position_controller().status(), AnimationStatus::Forward);

        toggle.set_value(Some(false));
        assert_eq!(toggle.position_controller().status(), AnimationStatus::Reverse);
    }

    #[test]
    fn test_tristate_set_value_alternates_direction() {
        let scheduler = FrameScheduler::new(&EngineConfig::default());
        let mut toggle = RenderToggleable::checkbox(Some(true), true, None, &scheduler);
        // Completed at 1.0, so the next change runs backwards.
        toggle.set_value(None);
        assert_eq!(toggle.position_controller().status(), AnimationStatus::Reverse);
        toggle.set_value(Some(false));
        assert_eq!(toggle.position_controller().status(), AnimationStatus::Forward);
    }

    #[test]
    fn test_non_interactive_ignores_taps() {
        let scheduler = FrameScheduler::new(&EngineConfig::default());
        let mut toggle = RenderToggleable::checkbox(Some(false), false, None, &scheduler);
        toggle.handle_event(
            &PointerEvent::Down {
                pointer: 1,
                position: Offset::new(5.0, 5.0),
            },
            Offset::new(5.0, 5.0),
        );
        assert_eq!(toggle.reaction_controller().status(), AnimationStatus::Dismissed);
    }
}
