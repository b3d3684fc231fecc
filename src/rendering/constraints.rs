use crate::geometry::{EdgeInsets, Size};

/// Immutable layout constraints for box render objects.
///
/// A size satisfies the constraints when
/// `min_width <= width <= max_width` and `min_height <= height <= max_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraints {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl BoxConstraints {
    pub const fn new(min_width: f32, max_width: f32, min_height: f32, max_height: f32) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    pub fn tight(size: Size) -> Self {
        Self::new(size.width, size.width, size.height, size.height)
    }

    /// Tight in the given dimensions, unconstrained in the others.
    pub fn tight_for(width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            min_width: width.unwrap_or(0.0),
            max_width: width.unwrap_or(f32::INFINITY),
            min_height: height.unwrap_or(0.0),
            max_height: height.unwrap_or(f32::INFINITY),
        }
    }

    pub fn loose(size: Size) -> Self {
        Self::new(0.0, size.width, 0.0, size.height)
    }

    /// Tight constraints that expand to fill whatever is not given.
    pub fn expand(width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            min_width: width.unwrap_or(f32::INFINITY),
            max_width: width.unwrap_or(f32::INFINITY),
            min_height: height.unwrap_or(f32::INFINITY),
            max_height: height.unwrap_or(f32::INFINITY),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0.0, f32::INFINITY, 0.0, f32::INFINITY)
    }

    pub fn constrain_width(&self, width: f32) -> f32 {
        width.max(self.min_width).min(self.max_width)
    }

    pub fn constrain_height(&self, height: f32) -> f32 {
        height.max(self.min_height).min(self.max_height)
    }

    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            self.constrain_width(size.width),
            self.constrain_height(size.height),
        )
    }

    /// Constraints that respect `self` while staying as close as possible to
    /// `constraints`.
    pub fn enforce(&self, constraints: BoxConstraints) -> Self {
        Self {
            min_width: self
                .min_width
                .clamp(constraints.min_width, constraints.max_width),
            max_width: self
                .max_width
                .clamp(constraints.min_width, constraints.max_width),
            min_height: self
                .min_height
                .clamp(constraints.min_height, constraints.max_height),
            max_height: self
                .max_height
                .clamp(constraints.min_height, constraints.max_height),
        }
    }

    /// Shrink by `insets`, never below zero.
    pub fn deflate(&self, insets: EdgeInsets) -> Self {
        let horizontal = insets.horizontal();
        let vertical = insets.vertical();
        let min_width = (self.min_width - horizontal).max(0.0);
        let min_height = (self.min_height - vertical).max(0.0);
        Self {
            min_width,
            max_width: min_width.max(self.max_width - horizontal),
            min_height,
            max_height: min_height.max(self.max_height - vertical),
        }
    }

    /// Same maximums, zero minimums.
    pub fn loosen(&self) -> Self {
        Self::new(0.0, self.max_width, 0.0, self.max_height)
    }

    /// Tighten to `width`/`height` where given, within these constraints.
    pub fn tighten(&self, width: Option<f32>, height: Option<f32>) -> Self {
        let width = width.map(|w| self.constrain_width(w));
        let height = height.map(|h| self.constrain_height(h));
        Self {
            min_width: width.unwrap_or(self.min_width),
            max_width: width.unwrap_or(self.max_width),
            min_height: height.unwrap_or(self.min_height),
            max_height: height.unwrap_or(self.max_height),
        }
    }

    pub fn biggest(&self) -> Size {
        self.constrain(Size::new(f32::INFINITY, f32::INFINITY))
    }

    pub fn smallest(&self) -> Size {
        self.constrain(Size::ZERO)
    }

    pub fn max_size(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    pub fn has_tight_width(&self) -> bool {
        self.min_width >= self.max_width
    }

    pub fn has_tight_height(&self) -> bool {
        self.min_height >= self.max_height
    }

    pub fn is_tight(&self) -> bool {
        self.has_tight_width() && self.has_tight_height()
    }

    pub fn has_bounded_width(&self) -> bool {
        self.max_width < f32::INFINITY
    }

    pub fn has_bounded_height(&self) -> bool {
        self.max_height < f32::INFINITY
    }

    pub fn is_satisfied_by(&self, size: Size) -> bool {
        self.min_width <= size.width
            && size.width <= self.max_width
            && self.min_height <= size.height
            && size.height <= self.max_height
    }

    pub fn is_normalized(&self) -> bool {
        self.min_width >= 0.0
            && self.min_width <= self.max_width
            && self.min_height >= 0.0
            && self.min_height <= self.max_height
    }
}

impl Default for BoxConstraints {
    fn default() -> Self {
        Self::unbounded()
    }
}
