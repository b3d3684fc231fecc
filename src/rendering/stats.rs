//! Layout statistics for debugging and performance analysis.
//!
//! The pipeline owner accumulates one [`LayoutStats`] until it is reset.
//! [`FrameDriver`](super::FrameDriver) logs the counters at `trace` level
//! after every frame, keeps a copy and resets them, so each frame starts
//! from zero.

/// Why a layout was executed (can be multiple).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayoutReasons {
    pub constraints_changed: bool,
    pub marked_dirty: bool,
    pub boundary_changed: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayoutStats {
    /// Layouts skipped because the node was clean with equal constraints
    pub layouts_skipped: u64,
    /// Layouts that ran `perform_layout`
    pub layouts_executed: u64,
    /// Primary (first) reason, mutually exclusive
    pub primary_constraints: u64,
    pub primary_dirty: u64,
    pub primary_boundary: u64,
    /// Repaint boundaries whose picture was re-recorded
    pub repaints: u64,
}

impl LayoutStats {
    pub fn record_layout_skipped(&mut self) {
        self.layouts_skipped += 1;
    }

    /// Record an executed layout, tracking the primary reason.
    pub fn record_layout_executed(&mut self, reasons: LayoutReasons) {
        self.layouts_executed += 1;
        if reasons.constraints_changed {
            self.primary_constraints += 1;
        } else if reasons.marked_dirty {
            self.primary_dirty += 1;
        } else if reasons.boundary_changed {
            self.primary_boundary += 1;
        }
    }

    pub fn record_repaint(&mut self) {
        self.repaints += 1;
    }

    pub fn total_calls(&self) -> u64 {
        self.layouts_skipped + self.layouts_executed
    }

    pub fn skip_rate(&self) -> f64 {
        match self.total_calls() {
            0 => 0.0,
            total => self.layouts_skipped as f64 / total as f64 * 100.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn log(&self) {
        log::trace!(
            "[Layout Stats] calls={} skipped={} executed={} skip_rate={:.1}% repaints={}",
            self.total_calls(),
            self.layouts_skipped,
            self.layouts_executed,
            self.skip_rate(),
            self.repaints
        );
        if self.layouts_executed > 0 {
            log::trace!(
                "  primary: constraints={} dirty={} boundary={}",
                self.primary_constraints,
                self.primary_dirty,
                self.primary_boundary
            );
        }
    }
}
