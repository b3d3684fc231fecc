use crate::geometry::Offset;

/// Identifies one pointer (finger, mouse) across a down/up sequence.
pub type PointerId = u32;

/// Pointer input in the root's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pointer: PointerId, position: Offset },
    Move { pointer: PointerId, position: Offset },
    Up { pointer: PointerId, position: Offset },
    Cancel { pointer: PointerId, position: Offset },
}

impl PointerEvent {
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerEvent::Down { pointer, .. }
            | PointerEvent::Move { pointer, .. }
            | PointerEvent::Up { pointer, .. }
            | PointerEvent::Cancel { pointer, .. } => pointer,
        }
    }

    pub fn position(&self) -> Offset {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Cancel { position, .. } => position,
        }
    }

    /// Whether this event ends the pointer's sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PointerEvent::Up { .. } | PointerEvent::Cancel { .. })
    }
}
