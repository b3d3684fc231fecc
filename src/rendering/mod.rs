//! The render-object protocol.
//!
//! Render objects live in a [`RenderTree`] arena owned by a
//! [`PipelineOwner`]. Layout passes [`BoxConstraints`] down and sizes back
//! up; paint records each repaint boundary into a cached [`Picture`]; the
//! [`FrameDriver`] runs both once per frame after the tickers.

pub mod canvas;
pub mod constraints;
pub mod events;
pub mod frame;
pub mod hit_test;
pub mod invalidation;
pub mod object;
pub mod objects;
pub mod pipeline;
pub mod stats;
pub mod tree;

pub use canvas::{Canvas, DrawCommand, Paint, PaintStyle, Path, PathVerb, Picture, PictureRecorder};
pub use constraints::BoxConstraints;
pub use events::{PointerEvent, PointerId};
pub use frame::FrameDriver;
pub use hit_test::{HitTestContext, HitTestEntry, HitTestResult};
pub use invalidation::{DirtyFlags, Job, JobQueue, JobType, RenderHandle};
pub use object::{hit_test_box, LayoutContext, PaintingContext, RenderObject};
pub use pipeline::PipelineOwner;
pub use stats::{LayoutReasons, LayoutStats};
pub use tree::{RenderId, RenderTree};
