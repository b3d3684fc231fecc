//! Plain value types shared by animation, layout and paint.

use std::ops::{Add, Mul, Neg, Sub};

/// A 2D offset (a point, or a translation).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset::new(0.0, 0.0);

    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn distance(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

impl Add for Offset {
    type Output = Offset;
    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl Sub for Offset {
    type Output = Offset;
    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Neg for Offset {
    type Output = Offset;
    fn neg(self) -> Offset {
        Offset::new(-self.dx, -self.dy)
    }
}

impl Mul<f32> for Offset {
    type Output = Offset;
    fn mul(self, rhs: f32) -> Offset {
        Offset::new(self.dx * rhs, self.dy * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn square(dimension: f32) -> Self {
        Self::new(dimension, dimension)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether `position`, relative to the top-left corner, lies inside.
    pub fn contains(&self, position: Offset) -> bool {
        position.dx >= 0.0
            && position.dx < self.width
            && position.dy >= 0.0
            && position.dy < self.height
    }

    /// The center of a rectangle of this size placed at `origin`.
    pub fn center(&self, origin: Offset) -> Offset {
        Offset::new(origin.dx + self.width / 2.0, origin.dy + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_offset_size(offset: Offset, size: Size) -> Self {
        Self::new(offset.dx, offset.dy, size.width, size.height)
    }

    pub fn from_center(center: Offset, width: f32, height: f32) -> Self {
        Self::new(
            center.dx - width / 2.0,
            center.dy - height / 2.0,
            width,
            height,
        )
    }

    pub fn origin(&self) -> Offset {
        Offset::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Offset {
        self.size().center(self.origin())
    }

    pub fn translate(&self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
            ..*self
        }
    }

    pub fn inset(&self, amount: f32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - amount * 2.0).max(0.0),
            height: (self.height - amount * 2.0).max(0.0),
        }
    }

    pub fn contains(&self, point: Offset) -> bool {
        point.dx >= self.x
            && point.dx < self.x + self.width
            && point.dy >= self.y
            && point.dy < self.y + self.height
    }
}

/// A rectangle with uniformly rounded corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RRect {
    pub rect: Rect,
    pub radius: f32,
}

impl RRect {
    pub fn new(rect: Rect, radius: f32) -> Self {
        Self { rect, radius }
    }
}

/// Insets on each side of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn top_left(&self) -> Offset {
        Offset::new(self.left, self.top)
    }
}

/// RGBA color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Same color with an alpha given in `0..=255`.
    pub fn with_alpha(&self, alpha: u8) -> Self {
        Self {
            a: alpha as f32 / 255.0,
            ..*self
        }
    }

    pub fn with_opacity(&self, opacity: f32) -> Self {
        Self {
            a: opacity.clamp(0.0, 1.0),
            ..*self
        }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_arithmetic() {
        let a = Offset::new(3.0, 4.0);
        assert_eq!(a.distance(), 5.0);
        assert_eq!(a + Offset::new(1.0, 1.0), Offset::new(4.0, 5.0));
        assert_eq!(a - a, Offset::ZERO);
        assert_eq!(-a, Offset::new(-3.0, -4.0));
        assert_eq!(a * 2.0, Offset::new(6.0, 8.0));
    }

    #[test]
    fn test_size_contains_is_half_open() {
        let size = Size::new(10.0, 10.0);
        assert!(size.contains(Offset::ZERO));
        assert!(size.contains(Offset::new(9.9, 9.9)));
        assert!(!size.contains(Offset::new(10.0, 5.0)));
        assert!(!size.contains(Offset::new(-0.1, 5.0)));
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(!Size::new(10.0, 10.0).is_empty());
    }

    #[test]
    fn test_rect_center_and_translate() {
        let rect = Rect::from_center(Offset::new(10.0, 10.0), 4.0, 6.0);
        assert_eq!(rect, Rect::new(8.0, 7.0, 4.0, 6.0));
        assert_eq!(rect.center(), Offset::new(10.0, 10.0));
        assert_eq!(
            rect.translate(Offset::new(1.0, 2.0)).origin(),
            Offset::new(9.0, 9.0)
        );
    }

    #[test]
    fn test_rect_inset_clamps() {
        let rect = Rect::new(0.0, 0.0, 4.0, 4.0).inset(3.0);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
    }

    #[test]
    fn test_edge_insets() {
        let insets = EdgeInsets::symmetric(4.0, 2.0);
        assert_eq!(insets.horizontal(), 8.0);
        assert_eq!(insets.vertical(), 4.0);
        assert_eq!(insets.top_left(), Offset::new(4.0, 2.0));
    }

    #[test]
    fn test_color_from_hex_and_alpha() {
        let color = Color::from_hex(0xFF8000);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.b, 0.0);
        assert_eq!(color.with_alpha(0xFF).a, 1.0);
        assert_eq!(color.with_alpha(0).a, 0.0);
        assert_eq!(color.with_opacity(2.0).a, 1.0);
    }
}
