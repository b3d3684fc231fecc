//! Single-child render objects.
//!
//! Each of these lays out its first child (if any) and ignores the rest.

use std::any::Any;

use crate::animation::AnimationRef;
use crate::foundation::{Listenable, VoidCallback};
use crate::geometry::{Color, EdgeInsets, Offset, Rect, Size};
use crate::rendering::canvas::Paint;
use crate::rendering::constraints::BoxConstraints;
use crate::rendering::hit_test::HitTestContext;
use crate::rendering::invalidation::RenderHandle;
use crate::rendering::object::{hit_test_box, LayoutContext, PaintingContext, RenderObject};

/// Imposes additional constraints on its child.
pub struct RenderConstrainedBox {
    additional_constraints: BoxConstraints,
    handle: Option<RenderHandle>,
}

impl RenderConstrainedBox {
    pub fn new(additional_constraints: BoxConstraints) -> Self {
        Self {
            additional_constraints,
            handle: None,
        }
    }

    pub fn additional_constraints(&self) -> BoxConstraints {
        self.additional_constraints
    }

    pub fn set_additional_constraints(&mut self, constraints: BoxConstraints) {
        if self.additional_constraints == constraints {
            return;
        }
        self.additional_constraints = constraints;
        if let Some(handle) = &self.handle {
            handle.mark_needs_layout();
        }
    }
}

impl RenderObject for RenderConstrainedBox {
    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        let inner = self.additional_constraints.enforce(constraints);
        match cx.children().first() {
            Some(&child) => {
                let size = cx.layout_child(child, inner, true);
                cx.set_child_offset(child, Offset::ZERO);
                size
            }
            None => inner.constrain(Size::ZERO),
        }
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.handle = Some(handle);
    }

    fn detach(&mut self) {
        self.handle = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fills its area with a color, then paints its child on top.
///
/// Without a child it is as big as the constraints allow.
pub struct RenderColoredBox {
    color: Color,
    handle: Option<RenderHandle>,
}

impl RenderColoredBox {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            handle: None,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        if self.color == color {
            return;
        }
        self.color = color;
        if let Some(handle) = &self.handle {
            handle.mark_needs_paint();
        }
    }
}

impl RenderObject for RenderColoredBox {
    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        match cx.children().first() {
            Some(&child) => {
                let size = cx.layout_child(child, constraints, true);
                cx.set_child_offset(child, Offset::ZERO);
                size
            }
            None => {
                let width = if constraints.has_bounded_width() { constraints.max_width } else { 0.0 };
                let height = if constraints.has_bounded_height() { constraints.max_height } else { 0.0 };
                constraints.constrain(Size::new(width, height))
            }
        }
    }

    fn paint(&self, cx: &mut PaintingContext, offset: Offset) {
        let size = cx.size();
        if !size.is_empty() {
            cx.canvas()
                .draw_rect(Rect::from_offset_size(offset, size), &Paint::fill(self.color));
        }
        cx.paint_children(offset);
    }

    fn hit_test_self(&self, _position: Offset, _size: Size) -> bool {
        true
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.handle = Some(handle);
    }

    fn detach(&mut self) {
        self.handle = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Insets its child by `padding`.
pub struct RenderPadding {
    padding: EdgeInsets,
    handle: Option<RenderHandle>,
}

impl RenderPadding {
    pub fn new(padding: EdgeInsets) -> Self {
        Self {
            padding,
            handle: None,
        }
    }

    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    pub fn set_padding(&mut self, padding: EdgeInsets) {
        if self.padding == padding {
            return;
        }
        self.padding = padding;
        if let Some(handle) = &self.handle {
            handle.mark_needs_layout();
        }
    }
}

impl RenderObject for RenderPadding {
    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        let horizontal = self.padding.horizontal();
        let vertical = self.padding.vertical();
        match cx.children().first() {
            Some(&child) => {
                let child_size = cx.layout_child(child, constraints.deflate(self.padding), true);
                cx.set_child_offset(child, self.padding.top_left());
                constraints.constrain(Size::new(
                    child_size.width + horizontal,
                    child_size.height + vertical,
                ))
            }
            None => constraints.constrain(Size::new(horizontal, vertical)),
        }
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.handle = Some(handle);
    }

    fn detach(&mut self) {
        self.handle = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Grows to at least `min_size` and centers its child, so small controls
/// get a larger tap target.
pub struct RenderInputPadding {
    min_size: Size,
    handle: Option<RenderHandle>,
}

impl RenderInputPadding {
    pub fn new(min_size: Size) -> Self {
        Self {
            min_size,
            handle: None,
        }
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn set_min_size(&mut self, min_size: Size) {
        if self.min_size == min_size {
            return;
        }
        self.min_size = min_size;
        if let Some(handle) = &self.handle {
            handle.mark_needs_layout();
        }
    }
}

impl RenderObject for RenderInputPadding {
    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        let Some(&child) = cx.children().first() else {
            return constraints.constrain(Size::ZERO);
        };
        let child_size = cx.layout_child(child, constraints, true);
        let size = constraints.constrain(Size::new(
            child_size.width.max(self.min_size.width),
            child_size.height.max(self.min_size.height),
        ));
        cx.set_child_offset(
            child,
            Offset::new(
                (size.width - child_size.width) / 2.0,
                (size.height - child_size.height) / 2.0,
            ),
        );
        size
    }

    /// A miss in the padded area falls back to the child's own hit test at
    /// the unconverted position. The child is never reported as hit when its
    /// own test fails.
    fn hit_test(&self, cx: &mut HitTestContext, position: Offset) -> bool {
        if hit_test_box(self, cx, position) {
            return true;
        }
        match cx.children().first() {
            Some(&child) => cx.hit_test_child_at(child, position),
            None => false,
        }
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.handle = Some(handle);
    }

    fn detach(&mut self) {
        self.handle = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Paints its child with the opacity driven by an animation.
///
/// Only repaints when the animation ticks; layout is never affected.
pub struct RenderAnimatedOpacity {
    opacity: AnimationRef<f32>,
    listener: Option<VoidCallback>,
}

impl RenderAnimatedOpacity {
    pub fn new(opacity: AnimationRef<f32>) -> Self {
        Self {
            opacity,
            listener: None,
        }
    }

    /// Current alpha in `0..=255`.
    pub fn alpha(&self) -> u8 {
        (self.opacity.value().clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl RenderObject for RenderAnimatedOpacity {
    fn is_repaint_boundary(&self) -> bool {
        true
    }

    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        match cx.children().first() {
            Some(&child) => {
                let size = cx.layout_child(child, constraints, true);
                cx.set_child_offset(child, Offset::ZERO);
                size
            }
            None => constraints.smallest(),
        }
    }

    fn paint(&self, cx: &mut PaintingContext, offset: Offset) {
        match self.alpha() {
            0 => {}
            255 => cx.paint_children(offset),
            alpha => cx.push_opacity(alpha, |cx| cx.paint_children(offset)),
        }
    }

    fn attach(&mut self, handle: RenderHandle) {
        let listener: VoidCallback = std::rc::Rc::new(move || handle.mark_needs_paint());
        self.opacity.add_listener(listener.clone());
        self.listener = Some(listener);
    }

    fn detach(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.opacity.remove_listener(&listener);
        }
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

    #[test]
    fn test_alpha_rounds_opacity() {
        use crate::animation::AlwaysStoppedAnimation;
        use std::rc::Rc;

        let half = RenderAnimatedOpacity::new(Rc::new(AlwaysStoppedAnimation::new(0.5f32)));
        assert_eq!(half.alpha(), 128);
        let over = RenderAnimatedOpacity::new(Rc::new(AlwaysStoppedAnimation::new(1.5f32)));
        assert_eq!(over.alpha(), 255);
    }

    #[test]
    fn test_setters_ignore_equal_values() {
        let mut padding = RenderPadding::new(EdgeInsets::all(4.0));
        padding.set_padding(EdgeInsets::all(4.0));
        assert_eq!(padding.padding(), EdgeInsets::all(4.0));

        let mut colored = RenderColoredBox::new(Color::BLACK);
        colored.set_color(Color::WHITE);
        assert_eq!(colored.color(), Color::WHITE);
    }
}
