use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Point;

/// Host-assigned pointer device identifier.
pub type PointerId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// One discrete pointer input, in screen (canvas pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            pointer,
            phase,
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Active gesture bound to one pointer device. A pointer holding a gesture
/// is "captured": its events cannot start or feed any other gesture until
/// the gesture ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Anchor is the local point that was under the pointer at gesture start.
    Panning { anchor: Point },
    Dragging { node: String },
}

/// Notification emitted by the engine for the host to consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EngineEvent {
    PositionChanged { node: String, position: Point },
}

/// Per-pointer gesture table. Release of an unknown pointer is swallowed,
/// matching how pointer-capture failures are treated: the session simply
/// ends.
#[derive(Debug, Default)]
pub struct PointerTracker {
    gestures: HashMap<PointerId, Gesture>,
}

impl PointerTracker {
    pub fn begin(&mut self, pointer: PointerId, gesture: Gesture) {
        self.gestures.insert(pointer, gesture);
    }

    pub fn active(&self, pointer: PointerId) -> Option<&Gesture> {
        self.gestures.get(&pointer)
    }

    pub fn release(&mut self, pointer: PointerId) -> Option<Gesture> {
        self.gestures.remove(&pointer)
    }

    /// End every drag whose node no longer satisfies `exists`. Used when the
    /// node set changes mid-gesture.
    pub fn retain_dragged_nodes(&mut self, exists: impl Fn(&str) -> bool) {
        self.gestures.retain(|_, gesture| match gesture {
            Gesture::Dragging { node } => exists(node),
            Gesture::Panning { .. } => true,
        });
    }

    pub fn is_dragging(&self, node: &str) -> bool {
        self.gestures.values().any(|gesture| {
            matches!(gesture, Gesture::Dragging { node: dragged } if dragged == node)
        })
    }
}
