pub mod animation;
pub mod config;
pub mod foundation;
pub mod geometry;
pub mod rendering;
pub mod scheduler;

pub use config::EngineConfig;

pub mod prelude {
    pub use crate::animation::{
        always_complete, always_dismissed, AlwaysStoppedAnimation, Animatable, AnimatableExt,
        Animation, AnimationController, AnimationExt, AnimationRef, AnimationStatus,
        CompoundAnimation, Curve, CurveTween, CurvedAnimation, Lerp, ProxyAnimation,
        ReverseAnimation, TrainHoppingAnimation, Tween,
    };
    pub use crate::foundation::{
        ChangeNotifier, Listenable, MergedListenable, ValueChanged, ValueNotifier, VoidCallback,
    };
    pub use crate::geometry::{Color, EdgeInsets, Offset, RRect, Rect, Size};
    pub use crate::rendering::objects::{
        Axis, CrossAxisAlignment, MainAxisAlignment, RenderAnimatedOpacity, RenderColoredBox,
        RenderConstrainedBox, RenderFlex, RenderInputPadding, RenderPadding, RenderToggleable,
        ToggleableKind,
    };
    pub use crate::rendering::{
        BoxConstraints, Canvas, FrameDriver, PipelineOwner, PointerEvent, RenderId, RenderObject,
    };
    pub use crate::scheduler::{FrameScheduler, Ticker, TickerFuture, TickerProvider};
    pub use crate::{init_logging, EngineConfig};
}

/// Install `env_logger` as the `log` backend, honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    if env_logger::try_init().is_err() {
        log::debug!("logger already initialized");
    }
}
