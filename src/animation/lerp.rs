use crate::geometry::{Color, EdgeInsets, Offset, Rect, Size};

/// Types that can be interpolated between two values.
pub trait Lerp: Clone + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    /// t can exceed [0, 1] range for overshoot effects
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Lerp for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        lerp_f32(*from, *to, t)
    }
}

impl Lerp for f64 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t as f64
    }
}

impl Lerp for Color {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Color {
            r: lerp_f32(from.r, to.r, t).clamp(0.0, 1.0),
            g: lerp_f32(from.g, to.g, t).clamp(0.0, 1.0),
            b: lerp_f32(from.b, to.b, t).clamp(0.0, 1.0),
            a: lerp_f32(from.a, to.a, t).clamp(0.0, 1.0),
        }
    }
}

impl Lerp for Offset {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Offset::new(lerp_f32(from.dx, to.dx, t), lerp_f32(from.dy, to.dy, t))
    }
}

impl Lerp for Size {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Size::new(
            lerp_f32(from.width, to.width, t),
            lerp_f32(from.height, to.height, t),
        )
    }
}

impl Lerp for Rect {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Rect::new(
            lerp_f32(from.x, to.x, t),
            lerp_f32(from.y, to.y, t),
            lerp_f32(from.width, to.width, t),
            lerp_f32(from.height, to.height, t),
        )
    }
}

impl Lerp for EdgeInsets {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        EdgeInsets {
            left: lerp_f32(from.left, to.left, t),
            top: lerp_f32(from.top, to.top, t),
            right: lerp_f32(from.right, to.right, t),
            bottom: lerp_f32(from.bottom, to.bottom, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_lerp() {
        assert_eq!(f32::lerp(&0.0, &10.0, 0.0), 0.0);
        assert_eq!(f32::lerp(&0.0, &10.0, 0.5), 5.0);
        assert_eq!(f32::lerp(&0.0, &10.0, 1.0), 10.0);
        // Overshoot
        assert_eq!(f32::lerp(&0.0, &10.0, 1.5), 15.0);
    }

    #[test]
    fn test_color_lerp_clamps_channels() {
        let black = Color::rgb(0.0, 0.0, 0.0);
        let white = Color::rgb(1.0, 1.0, 1.0);
        let mid = Color::lerp(&black, &white, 0.5);
        assert_eq!(mid.r, 0.5);
        assert_eq!(mid.g, 0.5);
        assert_eq!(mid.b, 0.5);
        assert_eq!(Color::lerp(&black, &white, 1.5), white);
    }

    #[test]
    fn test_offset_and_size_lerp() {
        let mid = Offset::lerp(&Offset::ZERO, &Offset::new(10.0, -10.0), 0.5);
        assert_eq!(mid, Offset::new(5.0, -5.0));
        let size = Size::lerp(&Size::ZERO, &Size::new(4.0, 8.0), 0.25);
        assert_eq!(size, Size::new(1.0, 2.0));
    }

    #[test]
    fn test_edge_insets_lerp() {
        let p1 = EdgeInsets::all(0.0);
        let p2 = EdgeInsets::all(10.0);
        let mid = EdgeInsets::lerp(&p1, &p2, 0.5);
        assert_eq!(mid, EdgeInsets::all(5.0));
    }
}
