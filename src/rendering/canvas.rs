//! Drawing surface abstraction and picture recording.
//!
//! The rasterizer lives outside this crate. Render objects draw through the
//! [`Canvas`] trait; during a paint pass the canvas is a [`PictureRecorder`]
//! whose [`Picture`] is cached per repaint boundary and replayed when
//! compositing.

use crate::geometry::{Color, Offset, RRect, Rect};

use super::tree::RenderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// How a shape is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub style: PaintStyle,
    pub stroke_width: f32,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
        }
    }

    pub fn stroke(color: Color, stroke_width: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathVerb {
    MoveTo(Offset),
    LineTo(Offset),
    Close,
}

/// A polyline path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    verbs: Vec<PathVerb>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, point: Offset) -> Self {
        self.verbs.push(PathVerb::MoveTo(point));
        self
    }

    pub fn line_to(mut self, point: Offset) -> Self {
        self.verbs.push(PathVerb::LineTo(point));
        self
    }

    pub fn close(mut self) -> Self {
        self.verbs.push(PathVerb::Close);
        self
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }
}

/// Drawing surface provided by the host.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Offset);
    fn clip_rect(&mut self, rect: Rect);
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    fn draw_rrect(&mut self, rrect: RRect, paint: &Paint);
    fn draw_circle(&mut self, center: Offset, radius: f32, paint: &Paint);
    fn draw_line(&mut self, from: Offset, to: Offset, paint: &Paint);
    fn draw_path(&mut self, path: &Path, paint: &Paint);
    /// Start a group composited with `alpha` (0..=255); ended by `restore`.
    fn save_layer_alpha(&mut self, alpha: u8);
}

/// A single recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(Offset),
    ClipRect(Rect),
    Rect { rect: Rect, paint: Paint },
    RRect { rrect: RRect, paint: Paint },
    Circle { center: Offset, radius: f32, paint: Paint },
    Line { from: Offset, to: Offset, paint: Paint },
    Path { path: Path, paint: Paint },
    SaveLayerAlpha(u8),
    /// The cached picture of a child repaint boundary, placed at `offset`.
    Layer { id: RenderId, offset: Offset },
}

impl DrawCommand {
    /// Replay onto `canvas`. Layers are resolved by the compositor and are
    /// skipped here.
    pub fn apply(&self, canvas: &mut dyn Canvas) {
        match self {
            DrawCommand::Save => canvas.save(),
            DrawCommand::Restore => canvas.restore(),
            DrawCommand::Translate(offset) => canvas.translate(*offset),
            DrawCommand::ClipRect(rect) => canvas.clip_rect(*rect),
            DrawCommand::Rect { rect, paint } => canvas.draw_rect(*rect, paint),
            DrawCommand::RRect { rrect, paint } => canvas.draw_rrect(*rrect, paint),
            DrawCommand::Circle {
                center,
                radius,
                paint,
            } => canvas.draw_circle(*center, *radius, paint),
            DrawCommand::Line { from, to, paint } => canvas.draw_line(*from, *to, paint),
            DrawCommand::Path { path, paint } => canvas.draw_path(path, paint),
            DrawCommand::SaveLayerAlpha(alpha) => canvas.save_layer_alpha(*alpha),
            DrawCommand::Layer { .. } => {}
        }
    }
}

/// Recorded draw commands of one repaint boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Picture {
    commands: Vec<DrawCommand>,
}

impl Picture {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A [`Canvas`] that records into a [`Picture`].
#[derive(Debug, Default)]
pub struct PictureRecorder {
    commands: Vec<DrawCommand>,
}

impl PictureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, id: RenderId, offset: Offset) {
        self.commands.push(DrawCommand::Layer { id, offset });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn finish(self) -> Picture {
        Picture {
            commands: self.commands,
        }
    }
}

impl Canvas for PictureRecorder {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Offset) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClipRect(rect));
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::Rect {
            rect,
            paint: *paint,
        });
    }

    fn draw_rrect(&mut self, rrect: RRect, paint: &Paint) {
        self.commands.push(DrawCommand::RRect {
            rrect,
            paint: *paint,
        });
    }

    fn draw_circle(&mut self, center: Offset, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: *paint,
        });
    }

    fn draw_line(&mut self, from: Offset, to: Offset, paint: &Paint) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            paint: *paint,
        });
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        self.commands.push(DrawCommand::Path {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn save_layer_alpha(&mut self, alpha: u8) {
        self.commands.push(DrawCommand::SaveLayerAlpha(alpha));
    }
}
