//! Concrete render objects.

mod flex;
mod proxy;
mod toggleable;

pub use flex::{Axis, CrossAxisAlignment, MainAxisAlignment, RenderFlex};
pub use proxy::{
    RenderAnimatedOpacity, RenderColoredBox, RenderConstrainedBox, RenderInputPadding, RenderPadding,
};
pub use toggleable::{
    next_value, RenderToggleable, ToggleableKind, RADIAL_REACTION_ALPHA, RADIAL_REACTION_DURATION,
    RADIAL_REACTION_RADIUS, TOGGLE_DURATION, TOUCH_SLOP,
};
