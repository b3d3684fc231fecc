//! Arena-based render object storage.
//!
//! The tree stores every render object with its layout metadata using a
//! sparse-set architecture with generational indices.
//!
//! ## Key Features
//!
//! - **Generational Indices**: RenderId contains index + generation so a
//!   stale id never refers to an object allocated later in the same slot.
//!
//! - **Dense Storage**: Nodes are stored contiguously; the sparse map gives
//!   O(1) lookup from a stable RenderId to the dense position.
//!
//! - **Swap-Remove**: O(1) removal without creating holes in dense storage.
//!
//! - **Partial Layout**: When an object is marked dirty, the flag bubbles up
//!   to the nearest relayout boundary, which is added to the layout queue.
//!   Paint invalidation bubbles to the nearest repaint boundary in the same way.

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::geometry::{Offset, Size};

use super::canvas::{Picture, PictureRecorder};
use super::constraints::BoxConstraints;
use super::invalidation::DirtyFlags;
use super::object::{LayoutContext, PaintingContext, RenderObject};
use super::stats::{LayoutReasons, LayoutStats};

/// Unique identifier for a render object in the tree.
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after removal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct RenderId {
    index: u32,
    generation: u32,
}

impl RenderId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Entry in the sparse map, pointing to a dense array slot.
///
/// Freed slots keep their generation so the next allocation can bump it.
struct SparseEntry {
    dense_index: Option<usize>,
    generation: u32,
}

struct Node {
    object: Box<dyn RenderObject>,
    parent: Option<RenderId>,
    children: Vec<RenderId>,
    depth: usize,
    flags: DirtyFlags,
    /// Unset until the first layout
    relayout_boundary: Option<RenderId>,
    repaint_boundary: bool,
    /// Constraints from the last layout
    constraints: Option<BoxConstraints>,
    /// Unset before the first layout and while `perform_layout` runs
    size: Option<Size>,
    /// Position within the parent, set by the parent during layout
    offset: Offset,
    /// Cached picture, for repaint boundaries
    layer: Option<Picture>,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// Stand-in stored while an object is extracted for a mutable call.
struct Placeholder;

impl RenderObject for Placeholder {
    fn perform_layout(&mut self, _cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        constraints.smallest()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Central storage for render objects and their layout/paint state.
pub struct RenderTree {
    dense: Vec<Node>,
    sparse: Vec<SparseEntry>,
    free_indices: Vec<u32>,
    /// Relayout boundaries that need layout
    layout_queue: HashSet<RenderId>,
    /// Repaint boundaries that need paint
    paint_queue: HashSet<RenderId>,
    config: EngineConfig,
    stats: LayoutStats,
}

impl RenderTree {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            layout_queue: HashSet::new(),
            paint_queue: HashSet::new(),
            config,
            stats: LayoutStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut LayoutStats {
        &mut self.stats
    }

    /// Store `object` as the last child of `parent` (or as a root).
    ///
    /// The new node needs layout. Roots are always repaint boundaries.
    pub fn insert(&mut self, parent: Option<RenderId>, object: Box<dyn RenderObject>) -> RenderId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            // Reuse a freed slot with the next generation
            let generation = self.sparse[idx as usize].generation.wrapping_add(1);
            (idx, generation)
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(SparseEntry {
                dense_index: None,
                generation: 0,
            });
            (idx, 0)
        };
        let id = RenderId::new(sparse_index, generation);

        let depth = match parent.and_then(|p| self.get_dense_index(p)) {
            Some(parent_dense) => {
                self.dense[parent_dense].children.push(id);
                self.dense[parent_dense].depth + 1
            }
            None => 0,
        };

        let repaint_boundary = parent.is_none() || object.is_repaint_boundary();
        let dense_index = self.dense.len();
        self.dense.push(Node {
            object,
            parent,
            children: Vec::new(),
            depth,
            flags: DirtyFlags::NEEDS_LAYOUT,
            relayout_boundary: None,
            repaint_boundary,
            constraints: None,
            size: None,
            offset: Offset::ZERO,
            layer: None,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = SparseEntry {
            dense_index: Some(dense_index),
            generation,
        };
        id
    }

    /// Remove `id` and all its descendants, returning the objects in
    /// post-order (children before parents).
    pub fn remove_subtree(&mut self, id: RenderId) -> Vec<(RenderId, Box<dyn RenderObject>)> {
        let mut order = Vec::new();
        self.collect_post_order(id, &mut order);

        if let Some(parent) = self.parent(id) {
            if let Some(parent_dense) = self.get_dense_index(parent) {
                self.dense[parent_dense].children.retain(|&c| c != id);
            }
        }

        order
            .into_iter()
            .filter_map(|node_id| self.remove_node(node_id).map(|object| (node_id, object)))
            .collect()
    }

    fn collect_post_order(&self, id: RenderId, out: &mut Vec<RenderId>) {
        for &child in self.children(id) {
            self.collect_post_order(child, out);
        }
        if self.contains(id) {
            out.push(id);
        }
    }

    fn remove_node(&mut self, id: RenderId) -> Option<Box<dyn RenderObject>> {
        let dense_index = self.get_dense_index(id)?;
        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        // Fix up the moved node's sparse entry
        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            self.sparse[moved_sparse_idx as usize].dense_index = Some(dense_index);
        }

        self.sparse[id.index as usize].dense_index = None;
        self.free_indices.push(id.index);
        self.layout_queue.remove(&id);
        self.paint_queue.remove(&id);
        Some(removed.object)
    }

    /// Get the dense array index for a RenderId, validating generation.
    fn get_dense_index(&self, id: RenderId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.dense_index)
    }

    fn node(&self, id: RenderId) -> Option<&Node> {
        self.get_dense_index(id).map(|idx| &self.dense[idx])
    }

    fn node_mut(&mut self, id: RenderId) -> Option<&mut Node> {
        self.get_dense_index(id).map(move |idx| &mut self.dense[idx])
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.get_dense_index(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn object(&self, id: RenderId) -> Option<&dyn RenderObject> {
        self.node(id).map(|node| &*node.object)
    }

    pub fn object_mut(&mut self, id: RenderId) -> Option<&mut dyn RenderObject> {
        match self.node_mut(id) {
            Some(node) => Some(&mut *node.object),
            None => None,
        }
    }

    /// Mutate an object while also holding the tree.
    ///
    /// The object is temporarily extracted during the closure execution.
    /// Returns `None` if the id is stale.
    pub fn with_object_mut<R>(
        &mut self,
        id: RenderId,
        f: impl FnOnce(&mut dyn RenderObject, &mut RenderTree) -> R,
    ) -> Option<R> {
        let dense_index = self.get_dense_index(id)?;
        let mut object = std::mem::replace(&mut self.dense[dense_index].object, Box::new(Placeholder));
        let result = f(&mut *object, self);
        if let Some(idx) = self.get_dense_index(id) {
            self.dense[idx].object = object;
        }
        Some(result)
    }

    pub fn parent(&self, id: RenderId) -> Option<RenderId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: RenderId) -> &[RenderId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn depth(&self, id: RenderId) -> usize {
        self.node(id).map(|node| node.depth).unwrap_or(0)
    }

    pub fn flags(&self, id: RenderId) -> DirtyFlags {
        self.node(id).map(|node| node.flags).unwrap_or_default()
    }

    pub fn needs_layout(&self, id: RenderId) -> bool {
        self.flags(id).contains(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn needs_paint(&self, id: RenderId) -> bool {
        self.flags(id).contains(DirtyFlags::NEEDS_PAINT)
    }

    pub fn relayout_boundary(&self, id: RenderId) -> Option<RenderId> {
        self.node(id).and_then(|node| node.relayout_boundary)
    }

    pub fn is_relayout_boundary(&self, id: RenderId) -> bool {
        self.relayout_boundary(id) == Some(id)
    }

    pub fn is_repaint_boundary(&self, id: RenderId) -> bool {
        self.node(id).is_some_and(|node| node.repaint_boundary)
    }

    pub fn constraints(&self, id: RenderId) -> Option<BoxConstraints> {
        self.node(id).and_then(|node| node.constraints)
    }

    /// The size from the last layout, if there is one.
    pub fn try_size(&self, id: RenderId) -> Option<Size> {
        self.node(id).and_then(|node| node.size)
    }

    /// The size from the last layout.
    ///
    /// Reading a size before layout, or an object's own size during its
    /// `perform_layout`, is a contract violation.
    pub fn size(&self, id: RenderId) -> Size {
        let size = self.try_size(id);
        debug_assert!(
            size.is_some(),
            "size of {:?} read before it was laid out (or during its own layout)",
            id
        );
        size.unwrap_or_default()
    }

    pub fn offset(&self, id: RenderId) -> Offset {
        self.node(id).map(|node| node.offset).unwrap_or_default()
    }

    pub fn set_offset(&mut self, id: RenderId, offset: Offset) {
        if let Some(node) = self.node_mut(id) {
            node.offset = offset;
        }
    }

    /// Offset from the root's origin.
    pub fn global_offset(&self, id: RenderId) -> Offset {
        let mut offset = Offset::ZERO;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            offset = offset + node.offset;
            current = node.parent;
        }
        offset
    }

    pub fn layer(&self, id: RenderId) -> Option<&Picture> {
        self.node(id).and_then(|node| node.layer.as_ref())
    }

    /// Lay out `id` with `constraints`.
    ///
    /// The object becomes its own relayout boundary when its parent does not
    /// use its size, when it is sized by its parent, when the constraints are
    /// tight, or when it is the root. Layout is skipped when the object is
    /// clean and both constraints and boundary are unchanged.
    pub fn layout(&mut self, id: RenderId, constraints: BoxConstraints, parent_uses_size: bool) {
        let Some(node) = self.node(id) else {
            log::warn!("layout requested for unknown render object {:?}", id);
            return;
        };
        debug_assert!(
            constraints.is_normalized(),
            "{:?} laid out with non-normalized constraints {:?}",
            id,
            constraints
        );

        let sized_by_parent = node.object.sized_by_parent();
        let is_boundary =
            !parent_uses_size || sized_by_parent || constraints.is_tight() || node.parent.is_none();
        let boundary = if is_boundary {
            id
        } else {
            node.parent
                .and_then(|parent| self.relayout_boundary(parent))
                .unwrap_or(id)
        };

        let had_boundary = node.relayout_boundary.is_some();
        let reasons = LayoutReasons {
            constraints_changed: node.constraints != Some(constraints),
            marked_dirty: node.flags.contains(DirtyFlags::NEEDS_LAYOUT),
            boundary_changed: node.relayout_boundary != Some(boundary),
        };
        if !reasons.constraints_changed && !reasons.marked_dirty && !reasons.boundary_changed {
            self.stats.record_layout_skipped();
            return;
        }

        if had_boundary && reasons.boundary_changed {
            self.clean_child_relayout_boundaries(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.constraints = Some(constraints);
            node.relayout_boundary = Some(boundary);
        }
        self.stats.record_layout_executed(reasons);
        self.run_layout(id, constraints);
    }

    /// Re-run layout of a dirty relayout boundary with its last constraints.
    pub fn layout_without_resize(&mut self, id: RenderId) {
        let Some(constraints) = self.constraints(id) else {
            return;
        };
        if !self.needs_layout(id) {
            return;
        }
        self.stats.record_layout_executed(LayoutReasons {
            marked_dirty: true,
            ..Default::default()
        });
        self.run_layout(id, constraints);
    }

    fn run_layout(&mut self, id: RenderId, constraints: BoxConstraints) {
        let Some(node) = self.node(id) else {
            return;
        };
        let name = node.object.debug_name();
        let dry_size = if node.object.sized_by_parent() {
            Some(node.object.compute_dry_size(constraints))
        } else {
            None
        };
        if self.config.debug_print_layouts {
            log::trace!("layout {} {:?} with {:?}", name, id, constraints);
        }
        if let Some(node) = self.node_mut(id) {
            node.size = dry_size;
        }

        let laid_out = self.with_object_mut(id, |object, tree| {
            let mut cx = LayoutContext::new(tree, id);
            object.perform_layout(&mut cx, constraints)
        });
        let Some(laid_out) = laid_out else {
            return;
        };
        let size = dry_size.unwrap_or(laid_out);
        if self.config.debug_check_constraints {
            debug_assert!(
                constraints.is_satisfied_by(size),
                "{} {:?} chose size {:?} that does not satisfy {:?}",
                name,
                id,
                size,
                constraints
            );
        }

        if let Some(node) = self.node_mut(id) {
            node.size = Some(size);
            node.flags.remove(DirtyFlags::NEEDS_LAYOUT);
        }
        self.mark_needs_paint(id);
    }

    fn clean_child_relayout_boundaries(&mut self, id: RenderId) {
        let children = self.children(id).to_vec();
        for child in children {
            let Some(node) = self.node_mut(child) else {
                continue;
            };
            if node.relayout_boundary != Some(child) {
                node.relayout_boundary = None;
                node.flags.insert(DirtyFlags::NEEDS_LAYOUT);
                self.clean_child_relayout_boundaries(child);
            }
        }
    }

    /// Mark `id` as needing layout.
    ///
    /// The dirty flag bubbles up to the nearest relayout boundary, which is
    /// added to the layout queue. Stops early at an already dirty node since
    /// its boundary must already be queued.
    pub fn mark_needs_layout(&mut self, id: RenderId) {
        if self.config.debug_print_mark_needs_layout {
            log::trace!("mark_needs_layout {:?}", id);
        }
        let mut current = id;
        loop {
            let Some(node) = self.node_mut(current) else {
                return;
            };
            if node.flags.contains(DirtyFlags::NEEDS_LAYOUT) {
                return;
            }
            node.flags.insert(DirtyFlags::NEEDS_LAYOUT);
            if node.relayout_boundary == Some(current) {
                self.layout_queue.insert(current);
                return;
            }
            match node.parent {
                Some(parent) => current = parent,
                None => {
                    self.layout_queue.insert(current);
                    return;
                }
            }
        }
    }

    /// Mark `id` as needing paint; bubbles up to the nearest repaint boundary.
    pub fn mark_needs_paint(&mut self, id: RenderId) {
        if self.config.debug_print_mark_needs_paint {
            log::trace!("mark_needs_paint {:?}", id);
        }
        let mut current = id;
        loop {
            let Some(node) = self.node_mut(current) else {
                return;
            };
            if node.flags.contains(DirtyFlags::NEEDS_PAINT) {
                return;
            }
            node.flags.insert(DirtyFlags::NEEDS_PAINT);
            if node.repaint_boundary {
                self.paint_queue.insert(current);
                return;
            }
            match node.parent {
                Some(parent) => current = parent,
                None => {
                    self.paint_queue.insert(current);
                    return;
                }
            }
        }
    }

    /// Queue a node for layout without touching its ancestors.
    pub(crate) fn schedule_layout(&mut self, id: RenderId) {
        if let Some(node) = self.node_mut(id) {
            node.flags.insert(DirtyFlags::NEEDS_LAYOUT);
            self.layout_queue.insert(id);
        }
    }

    /// Queued relayout boundaries, shallowest first. Clears the queue.
    pub fn take_layout_queue(&mut self) -> Vec<RenderId> {
        let mut queue: Vec<RenderId> = self.layout_queue.drain().collect();
        queue.sort_by_key(|&id| (self.depth(id), id));
        queue
    }

    /// Queued repaint boundaries, deepest first. Clears the queue.
    pub fn take_paint_queue(&mut self) -> Vec<RenderId> {
        let mut queue: Vec<RenderId> = self.paint_queue.drain().collect();
        queue.sort_by_key(|&id| (std::cmp::Reverse(self.depth(id)), id));
        queue
    }

    pub fn has_pending_layout(&self) -> bool {
        !self.layout_queue.is_empty()
    }

    pub fn has_pending_paint(&self) -> bool {
        !self.paint_queue.is_empty()
    }

    /// Record a fresh picture for the repaint boundary `id`.
    pub fn repaint(&mut self, id: RenderId) {
        let mut recorder = PictureRecorder::new();
        let painted = {
            let mut cx = PaintingContext::new(self, &mut recorder, id);
            cx.paint_boundary();
            cx.into_painted()
        };
        for painted_id in painted {
            if let Some(node) = self.node_mut(painted_id) {
                node.flags.remove(DirtyFlags::NEEDS_PAINT);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.layer = Some(recorder.finish());
        }
        self.stats.record_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    struct Leaf;

    impl RenderObject for Leaf {
        fn perform_layout(&mut self, _cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
            constraints.biggest()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn tree() -> RenderTree {
        RenderTree::new(EngineConfig::default())
    }

    #[test]
    fn test_tree_insert_remove() {
        let mut tree = tree();
        let id = tree.insert(None, Box::new(Leaf));
        assert!(tree.contains(id));
        assert!(tree.is_repaint_boundary(id));
        assert!(tree.needs_layout(id));

        let removed = tree.remove_subtree(id);
        assert_eq!(removed.len(), 1);
        assert!(!tree.contains(id));
    }

    #[test]
    fn test_tree_generational_index() {
        let mut tree = tree();
        let id1 = tree.insert(None, Box::new(Leaf));
        tree.remove_subtree(id1);
        let id2 = tree.insert(None, Box::new(Leaf));

        assert!(!tree.contains(id1));
        assert!(tree.contains(id2));
        assert_eq!(id1.index, id2.index);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn test_tree_parent_child_depth() {
        let mut tree = tree();
        let root = tree.insert(None, Box::new(Leaf));
        let child = tree.insert(Some(root), Box::new(Leaf));
        let grandchild = tree.insert(Some(child), Box::new(Leaf));

        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.children(root), &[child]);
        assert_eq!(tree.depth(grandchild), 2);
        assert!(!tree.is_repaint_boundary(child));
    }

    #[test]
    fn test_remove_subtree_is_post_order() {
        let mut tree = tree();
        let root = tree.insert(None, Box::new(Leaf));
        let child = tree.insert(Some(root), Box::new(Leaf));
        let grandchild = tree.insert(Some(child), Box::new(Leaf));
        let sibling = tree.insert(Some(root), Box::new(Leaf));

        let removed: Vec<RenderId> = tree.remove_subtree(child).into_iter().map(|(id, _)| id).collect();
        assert_eq!(removed, vec![grandchild, child]);
        assert_eq!(tree.children(root), &[sibling]);
        assert!(tree.contains(sibling));
    }

    #[test]
    fn test_tree_swap_remove_fixup() {
        let mut tree = tree();
        let id1 = tree.insert(None, Box::new(Leaf));
        let id2 = tree.insert(None, Box::new(Leaf));
        let id3 = tree.insert(None, Box::new(Leaf));

        tree.remove_subtree(id1);

        assert!(!tree.contains(id1));
        assert!(tree.object(id2).is_some());
        assert!(tree.object(id3).is_some());
    }

    #[test]
    fn test_dirty_propagation_stops_at_relayout_boundary() {
        let mut tree = tree();
        let root = tree.insert(None, Box::new(Leaf));
        let boundary = tree.insert(Some(root), Box::new(Leaf));
        let leaf = tree.insert(Some(boundary), Box::new(Leaf));

        // Simulate a completed layout: all clean, boundary is its own boundary.
        for (id, relayout_boundary) in [(root, root), (boundary, boundary), (leaf, boundary)] {
            let node = tree.node_mut(id).unwrap();
            node.flags = DirtyFlags::empty();
            node.relayout_boundary = Some(relayout_boundary);
        }

        tree.mark_needs_layout(leaf);

        assert!(tree.needs_layout(leaf));
        assert!(tree.needs_layout(boundary));
        assert!(!tree.needs_layout(root));
        assert_eq!(tree.take_layout_queue(), vec![boundary]);

        // Already dirty: stops early without queueing again.
        tree.mark_needs_layout(leaf);
        assert!(!tree.has_pending_layout());
    }

    #[test]
    fn test_paint_propagation_stops_at_repaint_boundary() {
        let mut tree = tree();
        let root = tree.insert(None, Box::new(Leaf));
        let child = tree.insert(Some(root), Box::new(Leaf));

        tree.mark_needs_paint(child);
        assert!(tree.needs_paint(child));
        assert!(tree.needs_paint(root));
        assert_eq!(tree.take_paint_queue(), vec![root]);
    }

    #[test]
    fn test_layout_skips_clean_node_with_same_constraints() {
        let mut tree = tree();
        let root = tree.insert(None, Box::new(Leaf));
        let constraints = BoxConstraints::tight(Size::new(10.0, 10.0));

        tree.layout(root, constraints, false);
        assert_eq!(tree.size(root), Size::new(10.0, 10.0));
        assert!(!tree.needs_layout(root));
        assert_eq!(tree.stats().layouts_executed, 1);

        tree.layout(root, constraints, false);
        assert_eq!(tree.stats().layouts_skipped, 1);
    }

    #[test]
    fn test_with_object_mut_restores_object() {
        let mut tree = tree();
        let id = tree.insert(None, Box::new(Leaf));
        let is_leaf = tree.with_object_mut(id, |object, tree| {
            assert!(tree.object(id).unwrap().as_any().downcast_ref::<Leaf>().is_none());
            object.as_any().downcast_ref::<Leaf>().is_some()
        });
        assert_eq!(is_leaf, Some(true));
        assert!(tree.object(id).unwrap().as_any().downcast_ref::<Leaf>().is_some());
    }
}
