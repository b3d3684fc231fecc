//! Deferred invalidation.
//!
//! Render objects are owned by the tree and cannot reach it from listener
//! callbacks, so they push jobs through a [`RenderHandle`] instead. The
//! pipeline drains the queue at the start of each frame and applies the
//! jobs to the tree. Duplicate jobs are coalesced.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use bitflags::bitflags;

use super::tree::RenderId;

bitflags! {
    /// Per-node dirty state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// Size or child positions may change
        const NEEDS_LAYOUT = 0b01;
        /// Visual appearance changed
        const NEEDS_PAINT  = 0b10;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobType {
    Layout,
    Paint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Job {
    pub id: RenderId,
    pub job_type: JobType,
}

#[derive(Default)]
struct QueueState {
    pending: HashSet<Job>,
    frame_requested: bool,
}

/// Shared queue of pending invalidation jobs.
#[derive(Clone, Default)]
pub struct JobQueue {
    state: Rc<RefCell<QueueState>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicate jobs (same id and type) are ignored.
    pub fn push_job(&self, id: RenderId, job_type: JobType) {
        let mut state = self.state.borrow_mut();
        state.pending.insert(Job { id, job_type });
        state.frame_requested = true;
    }

    pub fn drain_pending_jobs(&self) -> Vec<Job> {
        std::mem::take(&mut self.state.borrow_mut().pending)
            .into_iter()
            .collect()
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    /// Check if a frame has been requested and clear the flag
    pub fn take_frame_request(&self) -> bool {
        std::mem::replace(&mut self.state.borrow_mut().frame_requested, false)
    }
}

/// Lets a render object invalidate itself from outside a pipeline pass.
#[derive(Clone)]
pub struct RenderHandle {
    id: RenderId,
    queue: JobQueue,
}

impl RenderHandle {
    pub(crate) fn new(id: RenderId, queue: JobQueue) -> Self {
        Self { id, queue }
    }

    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn mark_needs_layout(&self) {
        self.queue.push_job(self.id, JobType::Layout);
    }

    pub fn mark_needs_paint(&self) {
        self.queue.push_job(self.id, JobType::Paint);
    }
}

impl std::fmt::Debug for RenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RenderHandle").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_are_deduplicated() {
        let queue = JobQueue::new();
        let handle = RenderHandle::new(RenderId::new(1, 0), queue.clone());
        handle.mark_needs_paint();
        handle.mark_needs_paint();
        handle.mark_needs_layout();

        let jobs = queue.drain_pending_jobs();
        assert_eq!(jobs.len(), 2);
        assert!(!queue.has_pending_jobs());
        assert!(queue.take_frame_request());
        assert!(!queue.take_frame_request());
    }

    #[test]
    fn test_dirty_flags() {
        let mut flags = DirtyFlags::NEEDS_LAYOUT;
        flags |= DirtyFlags::NEEDS_PAINT;
        assert!(flags.contains(DirtyFlags::NEEDS_LAYOUT | DirtyFlags::NEEDS_PAINT));
        flags.remove(DirtyFlags::NEEDS_LAYOUT);
        assert_eq!(flags, DirtyFlags::NEEDS_PAINT);
    }
}
