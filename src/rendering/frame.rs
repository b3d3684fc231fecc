use std::time::Duration;

use crate::scheduler::FrameScheduler;

use super::canvas::Canvas;
use super::pipeline::PipelineOwner;
use super::stats::LayoutStats;

/// Runs whole frames: ticks, invalidations, layout, paint, composite.
pub struct FrameDriver {
    scheduler: FrameScheduler,
    pipeline: PipelineOwner,
    last_frame: LayoutStats,
}

impl FrameDriver {
    pub fn new(scheduler: FrameScheduler, pipeline: PipelineOwner) -> Self {
        Self {
            scheduler,
            pipeline,
            last_frame: LayoutStats::default(),
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn pipeline(&self) -> &PipelineOwner {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PipelineOwner {
        &mut self.pipeline
    }

    /// Counters of the most recently drawn frame.
    pub fn last_frame_stats(&self) -> &LayoutStats {
        &self.last_frame
    }

    /// Produce one frame at the host's `raw_timestamp` onto `canvas`.
    pub fn draw_frame(&mut self, raw_timestamp: Duration, canvas: &mut dyn Canvas) {
        self.scheduler.handle_begin_frame(raw_timestamp);

        self.pipeline.flush_jobs();
        self.pipeline.flush_layout();
        self.pipeline.flush_paint();
        self.pipeline.composite(canvas);
        self.pipeline.stats().log();
        self.last_frame = *self.pipeline.stats();
        self.pipeline.reset_stats();

        self.scheduler.handle_draw_frame();
    }

    /// Whether a ticker or a dirty render object wants another frame.
    pub fn needs_frame(&self) -> bool {
        self.scheduler.transient_callback_count() > 0
            || self.scheduler.has_scheduled_frame()
            || self.pipeline.needs_frame()
    }
}
