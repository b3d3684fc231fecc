use std::any::Any;

use crate::geometry::{Offset, Size};

use super::canvas::{Canvas, PictureRecorder};
use super::constraints::BoxConstraints;
use super::events::PointerEvent;
use super::hit_test::HitTestContext;
use super::invalidation::RenderHandle;
use super::tree::{RenderId, RenderTree};

/// A node of the render tree.
///
/// Constraints go down through [`perform_layout`](Self::perform_layout),
/// sizes come back up. Children are laid out, positioned and painted through
/// the context handed to each pass; the tree owns the children.
pub trait RenderObject: Any {
    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The size depends only on the incoming constraints.
    ///
    /// Such objects are sized by [`compute_dry_size`](Self::compute_dry_size)
    /// before `perform_layout` runs and are always relayout boundaries.
    fn sized_by_parent(&self) -> bool {
        false
    }

    /// Paint into a separately cached picture.
    fn is_repaint_boundary(&self) -> bool {
        false
    }

    fn compute_dry_size(&self, constraints: BoxConstraints) -> Size {
        constraints.smallest()
    }

    /// Lay out children and return a size that satisfies `constraints`.
    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size;

    /// Paint this object at `offset` (in the coordinate space of the
    /// enclosing repaint boundary).
    fn paint(&self, cx: &mut PaintingContext, offset: Offset) {
        cx.paint_children(offset);
    }

    /// Add this object (and any hit descendants) to the result if `position`,
    /// in local coordinates, hits it.
    fn hit_test(&self, cx: &mut HitTestContext, position: Offset) -> bool {
        hit_test_box(self, cx, position)
    }

    fn hit_test_self(&self, _position: Offset, _size: Size) -> bool {
        false
    }

    /// Children are tested back to front; the first hit wins.
    fn hit_test_children(&self, cx: &mut HitTestContext, position: Offset) -> bool {
        cx.hit_test_children(position)
    }

    /// Pointer event routed along the hit-test path. `local` is the event
    /// position in this object's coordinate space.
    fn handle_event(&mut self, _event: &PointerEvent, _local: Offset) {}

    /// Called once the object is in the tree.
    fn attach(&mut self, _handle: RenderHandle) {}

    /// Called before the object leaves the tree.
    fn detach(&mut self) {}

    /// Release owned resources; called after `detach`.
    fn dispose(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The standard box hit test: inside the size, and either a child or the
/// object itself is hit.
///
/// Overrides of [`RenderObject::hit_test`] call this to defer to the default.
pub fn hit_test_box<T: RenderObject + ?Sized>(object: &T, cx: &mut HitTestContext, position: Offset) -> bool {
    if !cx.size().contains(position) {
        return false;
    }
    if object.hit_test_children(cx, position) || object.hit_test_self(position, cx.size()) {
        cx.add(position);
        return true;
    }
    false
}

/// Mutable view of the tree during one object's `perform_layout`.
pub struct LayoutContext<'a> {
    tree: &'a mut RenderTree,
    id: RenderId,
}

impl<'a> LayoutContext<'a> {
    pub(crate) fn new(tree: &'a mut RenderTree, id: RenderId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn children(&self) -> Vec<RenderId> {
        self.tree.children(self.id).to_vec()
    }

    /// Lay out `child` and return its size.
    ///
    /// With `parent_uses_size == false` the child becomes a relayout
    /// boundary and its size should not influence this object's layout.
    pub fn layout_child(
        &mut self,
        child: RenderId,
        constraints: BoxConstraints,
        parent_uses_size: bool,
    ) -> Size {
        debug_assert_eq!(
            self.tree.parent(child),
            Some(self.id),
            "{:?} is not a child of {:?}",
            child,
            self.id
        );
        self.tree.layout(child, constraints, parent_uses_size);
        self.tree.try_size(child).unwrap_or_default()
    }

    pub fn set_child_offset(&mut self, child: RenderId, offset: Offset) {
        self.tree.set_offset(child, offset);
    }

    pub fn child_size(&self, child: RenderId) -> Size {
        self.tree.size(child)
    }
}

/// Recording state for painting one repaint boundary.
pub struct PaintingContext<'a> {
    tree: &'a RenderTree,
    recorder: &'a mut PictureRecorder,
    current: RenderId,
    painted: Vec<RenderId>,
}

impl<'a> PaintingContext<'a> {
    pub(crate) fn new(tree: &'a RenderTree, recorder: &'a mut PictureRecorder, boundary: RenderId) -> Self {
        Self {
            tree,
            recorder,
            current: boundary,
            painted: Vec::new(),
        }
    }

    /// Paint the boundary itself at its own origin.
    pub(crate) fn paint_boundary(&mut self) {
        let boundary = self.current;
        self.paint_node(boundary, Offset::ZERO);
    }

    /// Objects painted into this picture, the boundary included.
    pub(crate) fn into_painted(self) -> Vec<RenderId> {
        self.painted
    }

    pub fn canvas(&mut self) -> &mut dyn Canvas {
        &mut *self.recorder
    }

    /// Size of the object currently painting.
    pub fn size(&self) -> Size {
        self.tree.try_size(self.current).unwrap_or_default()
    }

    pub fn id(&self) -> RenderId {
        self.current
    }

    /// Paint `child` relative to its parent's paint `offset`.
    ///
    /// A child repaint boundary is referenced as a layer instead of being
    /// painted into this picture.
    pub fn paint_child(&mut self, child: RenderId, offset: Offset) {
        let child_offset = offset + self.tree.offset(child);
        if self.tree.is_repaint_boundary(child) {
            self.recorder.add_layer(child, child_offset);
        } else {
            self.paint_node(child, child_offset);
        }
    }

    pub fn paint_children(&mut self, offset: Offset) {
        let children = self.tree.children(self.current).to_vec();
        for child in children {
            self.paint_child(child, offset);
        }
    }

    /// Run `paint` inside a group composited with `alpha`.
    pub fn push_opacity(&mut self, alpha: u8, paint: impl FnOnce(&mut Self)) {
        self.recorder.save_layer_alpha(alpha);
        paint(self);
        self.recorder.restore();
    }

    fn paint_node(&mut self, id: RenderId, offset: Offset) {
        let tree = self.tree;
        let Some(object) = tree.object(id) else {
            return;
        };
        if tree.config().debug_print_layouts {
            log::trace!("paint {} {:?} at {:?}", object.debug_name(), id, offset);
        }
        let previous = std::mem::replace(&mut self.current, id);
        object.paint(self, offset);
        self.current = previous;
        self.painted.push(id);
    }
}
