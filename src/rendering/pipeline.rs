//! Pipeline owner: the render tree plus the per-frame flush phases.
//!
//! A frame runs `flush_jobs` (apply invalidations queued by render objects),
//! `flush_layout` (dirty relayout boundaries, shallowest first),
//! `flush_paint` (dirty repaint boundaries, deepest first) and finally
//! `composite`, which replays the cached pictures onto the host canvas.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::geometry::Offset;

use super::canvas::{Canvas, DrawCommand};
use super::constraints::BoxConstraints;
use super::events::{PointerEvent, PointerId};
use super::hit_test::HitTestResult;
use super::invalidation::{JobQueue, JobType, RenderHandle};
use super::object::RenderObject;
use super::stats::LayoutStats;
use super::tree::{RenderId, RenderTree};

/// One object on a captured pointer path.
#[derive(Debug, Clone, Copy)]
struct PointerTarget {
    id: RenderId,
    /// How far the hit position stood from the object's geometric local
    /// position at pointer down. Zero unless a parent redirected the hit.
    delta: Offset,
}

pub struct PipelineOwner {
    tree: RenderTree,
    root: Option<RenderId>,
    root_constraints: BoxConstraints,
    queue: JobQueue,
    /// Hit-test path captured at pointer down, deepest first
    pointer_paths: HashMap<PointerId, Vec<PointerTarget>>,
}

impl PipelineOwner {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tree: RenderTree::new(config),
            root: None,
            root_constraints: BoxConstraints::default(),
            queue: JobQueue::new(),
            pointer_paths: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn root(&self) -> Option<RenderId> {
        self.root
    }

    /// Install `object` as the root, removing any previous root subtree.
    pub fn set_root(&mut self, object: Box<dyn RenderObject>) -> RenderId {
        if let Some(previous) = self.root.take() {
            self.remove(previous);
        }
        let id = self.tree.insert(None, object);
        self.attach(id);
        self.tree.schedule_layout(id);
        self.root = Some(id);
        log::debug!("set root {:?}", id);
        id
    }

    pub fn root_constraints(&self) -> BoxConstraints {
        self.root_constraints
    }

    /// Constraints the root is laid out with, usually tight to the surface.
    pub fn set_root_constraints(&mut self, constraints: BoxConstraints) {
        if self.root_constraints == constraints {
            return;
        }
        self.root_constraints = constraints;
        if let Some(root) = self.root {
            self.tree.schedule_layout(root);
        }
    }

    /// Append `object` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in the tree.
    pub fn insert(&mut self, parent: RenderId, object: Box<dyn RenderObject>) -> RenderId {
        assert!(
            self.tree.contains(parent),
            "insert under {:?}, which is not in the tree",
            parent
        );
        let id = self.tree.insert(Some(parent), object);
        self.attach(id);
        self.tree.mark_needs_layout(parent);
        log::debug!("inserted {:?} under {:?}", id, parent);
        id
    }

    fn attach(&mut self, id: RenderId) {
        let handle = RenderHandle::new(id, self.queue.clone());
        if let Some(object) = self.tree.object_mut(id) {
            object.attach(handle);
        }
    }

    /// Detach and dispose `id` and its whole subtree.
    ///
    /// Returns false if `id` is not in the tree.
    pub fn remove(&mut self, id: RenderId) -> bool {
        if !self.tree.contains(id) {
            log::warn!("remove requested for unknown render object {:?}", id);
            return false;
        }
        let parent = self.tree.parent(id);
        if self.root == Some(id) {
            self.root = None;
        }

        let removed = self.tree.remove_subtree(id);
        for (removed_id, mut object) in removed {
            object.detach();
            object.dispose();
            log::debug!("removed {} {:?}", object.debug_name(), removed_id);
        }
        let tree = &self.tree;
        for path in self.pointer_paths.values_mut() {
            path.retain(|target| tree.contains(target.id));
        }

        if let Some(parent) = parent {
            self.tree.mark_needs_layout(parent);
        }
        true
    }

    /// Mutate the object `id` in place. Its identity is preserved; setters on
    /// the object invalidate it through its [`RenderHandle`].
    ///
    /// Returns `None` if the id is stale or the object is not a `T`.
    pub fn update<T: RenderObject, R>(&mut self, id: RenderId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let object = self.tree.object_mut(id)?;
        object.as_any_mut().downcast_mut::<T>().map(f)
    }

    pub fn object<T: RenderObject>(&self, id: RenderId) -> Option<&T> {
        self.tree.object(id)?.as_any().downcast_ref::<T>()
    }

    pub fn mark_needs_layout(&mut self, id: RenderId) {
        self.tree.mark_needs_layout(id);
    }

    pub fn mark_needs_paint(&mut self, id: RenderId) {
        self.tree.mark_needs_paint(id);
    }

    /// Apply invalidations that render objects queued through their handles.
    pub fn flush_jobs(&mut self) {
        self.queue.take_frame_request();
        for job in self.queue.drain_pending_jobs() {
            match job.job_type {
                JobType::Layout => self.tree.mark_needs_layout(job.id),
                JobType::Paint => self.tree.mark_needs_paint(job.id),
            }
        }
    }

    /// Lay out every dirty relayout boundary, shallowest first.
    ///
    /// Repeats until no boundary is queued, so invalidations raised during
    /// layout are handled in the same flush.
    pub fn flush_layout(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        loop {
            let dirty = self.tree.take_layout_queue();
            if dirty.is_empty() {
                break;
            }
            for id in dirty {
                if !self.tree.needs_layout(id) {
                    continue;
                }
                if id == root {
                    self.tree.layout(root, self.root_constraints, false);
                } else {
                    self.tree.layout_without_resize(id);
                }
            }
        }
    }

    /// Re-record the picture of every dirty repaint boundary, deepest first.
    pub fn flush_paint(&mut self) {
        for id in self.tree.take_paint_queue() {
            if !self.tree.needs_paint(id) {
                continue;
            }
            if self.tree.needs_layout(id) {
                log::trace!("skipping paint of {:?}, which still needs layout", id);
                continue;
            }
            self.tree.repaint(id);
        }
    }

    /// Replay the root picture onto `canvas`, splicing in child layers.
    pub fn composite(&self, canvas: &mut dyn Canvas) {
        if let Some(root) = self.root {
            self.composite_layer(root, canvas);
        }
    }

    fn composite_layer(&self, id: RenderId, canvas: &mut dyn Canvas) {
        let Some(picture) = self.tree.layer(id) else {
            return;
        };
        for command in picture.commands() {
            match command {
                DrawCommand::Layer { id: child, offset } => {
                    canvas.save();
                    canvas.translate(*offset);
                    self.composite_layer(*child, canvas);
                    canvas.restore();
                }
                command => command.apply(canvas),
            }
        }
    }

    /// Hit test from the root with `position` in root coordinates.
    pub fn hit_test(&self, position: Offset) -> HitTestResult {
        match self.root {
            Some(root) => self.tree.hit_test(root, position),
            None => HitTestResult::new(),
        }
    }

    /// Deliver `event` along the path hit at pointer down.
    ///
    /// Each object receives the position converted into its own space. An
    /// object hit through a redirected position keeps the same correction
    /// for the rest of the gesture.
    pub fn dispatch_pointer_event(&mut self, event: &PointerEvent) {
        let pointer = event.pointer();
        if let PointerEvent::Down { position, .. } = event {
            let tree = &self.tree;
            let path = self
                .hit_test(*position)
                .path()
                .iter()
                .map(|entry| PointerTarget {
                    id: entry.id,
                    delta: entry.local_position - (*position - tree.global_offset(entry.id)),
                })
                .collect();
            self.pointer_paths.insert(pointer, path);
        }

        let path = match self.pointer_paths.get(&pointer) {
            Some(path) => path.clone(),
            None => return,
        };
        for PointerTarget { id, delta } in path {
            let local = event.position() - self.tree.global_offset(id) + delta;
            if let Some(object) = self.tree.object_mut(id) {
                object.handle_event(event, local);
            }
        }

        if event.is_terminal() {
            self.pointer_paths.remove(&pointer);
        }
    }

    /// Whether anything is waiting for the next frame.
    pub fn needs_frame(&self) -> bool {
        self.queue.has_pending_jobs() || self.tree.has_pending_layout() || self.tree.has_pending_paint()
    }

    pub fn stats(&self) -> &LayoutStats {
        self.tree.stats()
    }

    pub fn reset_stats(&mut self) {
        self.tree.stats_mut().reset();
    }
}
