use std::any::Any;

use crate::geometry::{Offset, Size};
use crate::rendering::constraints::BoxConstraints;
use crate::rendering::invalidation::RenderHandle;
use crate::rendering::object::{LayoutContext, RenderObject};

/// Direction for flex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Main axis alignment for flex layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAxisAlignment {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross axis alignment for flex layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossAxisAlignment {
    Start,
    Center,
    End,
    Stretch,
}

fn main_axis(size: Size, axis: Axis) -> f32 {
    match axis {
        Axis::Horizontal => size.width,
        Axis::Vertical => size.height,
    }
}

fn cross_axis(size: Size, axis: Axis) -> f32 {
    match axis {
        Axis::Horizontal => size.height,
        Axis::Vertical => size.width,
    }
}

/// Lays children out in a row or column.
pub struct RenderFlex {
    direction: Axis,
    spacing: f32,
    main_axis_alignment: MainAxisAlignment,
    cross_axis_alignment: CrossAxisAlignment,
    handle: Option<RenderHandle>,
}

impl RenderFlex {
    /// Create a new flex layout with the given direction
    pub fn new(direction: Axis) -> Self {
        Self {
            direction,
            spacing: 0.0,
            main_axis_alignment: MainAxisAlignment::Start,
            cross_axis_alignment: CrossAxisAlignment::Center,
            handle: None,
        }
    }

    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    /// Set the spacing between children
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }

    pub fn direction(&self) -> Axis {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Axis) {
        if self.direction != direction {
            self.direction = direction;
            self.mark_needs_layout();
        }
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        if self.spacing != spacing {
            self.spacing = spacing;
            self.mark_needs_layout();
        }
    }

    pub fn set_main_axis_alignment(&mut self, alignment: MainAxisAlignment) {
        if self.main_axis_alignment != alignment {
            self.main_axis_alignment = alignment;
            self.mark_needs_layout();
        }
    }

    pub fn set_cross_axis_alignment(&mut self, alignment: CrossAxisAlignment) {
        if self.cross_axis_alignment != alignment {
            self.cross_axis_alignment = alignment;
            self.mark_needs_layout();
        }
    }

    fn mark_needs_layout(&self) {
        if let Some(handle) = &self.handle {
            handle.mark_needs_layout();
        }
    }

    /// Calculate initial offset and spacing between children based on main axis alignment
    fn main_axis_spacing(&self, free_space: f32, child_count: usize) -> (f32, f32) {
        let spacing = self.spacing;
        match self.main_axis_alignment {
            MainAxisAlignment::Start => (0.0, spacing),
            MainAxisAlignment::Center => (free_space / 2.0, spacing),
            MainAxisAlignment::End => (free_space, spacing),
            MainAxisAlignment::SpaceBetween => {
                if child_count > 1 {
                    (0.0, free_space / (child_count - 1) as f32 + spacing)
                } else {
                    (0.0, spacing)
                }
            }
            MainAxisAlignment::SpaceAround => {
                let space = free_space / child_count as f32;
                (space / 2.0, space + spacing)
            }
            MainAxisAlignment::SpaceEvenly => {
                let space = free_space / (child_count + 1) as f32;
                (space, space + spacing)
            }
        }
    }

    fn child_constraints(&self, main_max: f32, cross_min: f32, cross_max: f32) -> BoxConstraints {
        match self.direction {
            Axis::Horizontal => BoxConstraints::new(0.0, main_max, cross_min, cross_max),
            Axis::Vertical => BoxConstraints::new(cross_min, cross_max, 0.0, main_max),
        }
    }
}

impl RenderObject for RenderFlex {
    fn perform_layout(&mut self, cx: &mut LayoutContext, constraints: BoxConstraints) -> Size {
        let axis = self.direction;
        let children = cx.children();

        let (main_min, main_max, cross_min, cross_max) = match axis {
            Axis::Horizontal => (
                constraints.min_width,
                constraints.max_width,
                constraints.min_height,
                constraints.max_height,
            ),
            Axis::Vertical => (
                constraints.min_height,
                constraints.max_height,
                constraints.min_width,
                constraints.max_width,
            ),
        };

        // For Stretch alignment, use min constraint if set
        let stretch = self.cross_axis_alignment == CrossAxisAlignment::Stretch;
        let stretch_cross = if stretch && cross_min > 0.0 { Some(cross_min) } else { None };
        let child_constraints = match stretch_cross {
            Some(cross) => self.child_constraints(main_max, cross, cross),
            None => self.child_constraints(main_max, 0.0, cross_max),
        };

        // First pass: measure all children
        let mut child_sizes: Vec<Size> = children
            .iter()
            .map(|&child| cx.layout_child(child, child_constraints, true))
            .collect();
        let max_cross = child_sizes
            .iter()
            .map(|&size| cross_axis(size, axis))
            .fold(0.0f32, f32::max);

        let total_spacing = if children.len() > 1 {
            self.spacing * (children.len() - 1) as f32
        } else {
            0.0
        };
        let total_main = child_sizes.iter().map(|&size| main_axis(size, axis)).sum::<f32>() + total_spacing;

        // Space-based and centered alignments fill the main axis when bounded
        let main_size = match self.main_axis_alignment {
            MainAxisAlignment::Start => total_main.max(main_min).min(main_max),
            _ if main_max.is_finite() => main_max,
            _ => total_main.max(main_min),
        };
        let cross_size = max_cross.max(cross_min).min(cross_max);

        // Stretch without a known cross size: relayout with the measured one
        if stretch && stretch_cross.is_none() && cross_size > 0.0 {
            let stretched = self.child_constraints(main_max, cross_size, cross_size);
            child_sizes = children
                .iter()
                .map(|&child| cx.layout_child(child, stretched, true))
                .collect();
        }

        let size = match axis {
            Axis::Horizontal => Size::new(main_size, cross_size),
            Axis::Vertical => Size::new(cross_size, main_size),
        };

        // Position children
        let children_main: f32 = child_sizes.iter().map(|&size| main_axis(size, axis)).sum();
        let free_space = (main_size - children_main - total_spacing).max(0.0);
        let (initial_offset, between_spacing) = self.main_axis_spacing(free_space, children.len());

        let mut main_pos = initial_offset;
        for (&child, &child_size) in children.iter().zip(&child_sizes) {
            let child_cross = cross_axis(child_size, axis);
            let cross_pos = match self.cross_axis_alignment {
                CrossAxisAlignment::Start | CrossAxisAlignment::Stretch => 0.0,
                CrossAxisAlignment::Center => (cross_size - child_cross) / 2.0,
                CrossAxisAlignment::End => cross_size - child_cross,
            };
            let offset = match axis {
                Axis::Horizontal => Offset::new(main_pos, cross_pos),
                Axis::Vertical => Offset::new(cross_pos, main_pos),
            };
            cx.set_child_offset(child, offset);
            main_pos += main_axis(child_size, axis) + between_spacing;
        }

        size
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.handle = Some(handle);
    }

    fn detach(&mut self) {
        self.handle = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
