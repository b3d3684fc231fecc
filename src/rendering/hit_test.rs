use crate::geometry::{Offset, Size};

use super::tree::{RenderId, RenderTree};

/// One object on a hit-test path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestEntry {
    pub id: RenderId,
    /// The hit position in the object's own coordinate space
    pub local_position: Offset,
}

/// Objects hit by a position, deepest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTestResult {
    path: Vec<HitTestEntry>,
}

impl HitTestResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: HitTestEntry) {
        self.path.push(entry);
    }

    pub fn path(&self) -> &[HitTestEntry] {
        &self.path
    }

    pub fn ids(&self) -> Vec<RenderId> {
        self.path.iter().map(|entry| entry.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.path.iter().any(|entry| entry.id == id)
    }
}

/// State handed to [`RenderObject::hit_test`](super::RenderObject::hit_test).
pub struct HitTestContext<'a> {
    tree: &'a RenderTree,
    id: RenderId,
    result: &'a mut HitTestResult,
}

impl<'a> HitTestContext<'a> {
    pub(crate) fn new(tree: &'a RenderTree, id: RenderId, result: &'a mut HitTestResult) -> Self {
        Self { tree, id, result }
    }

    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.tree.try_size(self.id).unwrap_or_default()
    }

    pub fn children(&self) -> &'a [RenderId] {
        self.tree.children(self.id)
    }

    /// Record the current object as hit at `position`.
    pub fn add(&mut self, position: Offset) {
        self.result.add(HitTestEntry {
            id: self.id,
            local_position: position,
        });
    }

    /// Hit test `child` with `position` given in the current object's space.
    pub fn hit_test_child(&mut self, child: RenderId, position: Offset) -> bool {
        let local = position - self.tree.offset(child);
        self.hit_test_child_at(child, local)
    }

    /// Hit test `child` with `local` already in the child's own space.
    pub fn hit_test_child_at(&mut self, child: RenderId, local: Offset) -> bool {
        let tree = self.tree;
        let Some(object) = tree.object(child) else {
            return false;
        };
        let previous = std::mem::replace(&mut self.id, child);
        let hit = object.hit_test(self, local);
        self.id = previous;
        hit
    }

    /// Test children from last to first, stopping at the first hit.
    pub fn hit_test_children(&mut self, position: Offset) -> bool {
        let children = self.children();
        children
            .iter()
            .rev()
            .any(|&child| self.hit_test_child(child, position))
    }
}

impl RenderTree {
    /// Hit test the subtree rooted at `root` with `position` in its space.
    pub fn hit_test(&self, root: RenderId, position: Offset) -> HitTestResult {
        let mut result = HitTestResult::new();
        if let Some(object) = self.object(root) {
            let mut cx = HitTestContext::new(self, root, &mut result);
            object.hit_test(&mut cx, position);
        }
        result
    }
}
