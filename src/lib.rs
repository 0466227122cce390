use serde::{Deserialize, Serialize};

pub mod engine;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod scene;
#[cfg(feature = "server")]
pub mod serve;
pub mod sociogram;
pub mod utils;
pub mod viewport;

pub use engine::SociogramEngine;
pub use geometry::{EdgePath, curve_between, node_radius};
pub use interaction::{EngineEvent, Gesture, PointerEvent, PointerPhase, PointerTracker};
pub use layout::{CircularLayout, LayoutPolicy};
pub use scene::{EdgeVisual, NodeClass, NodeVisual, Scene};
pub use sociogram::{EdgeRole, Node, ParseError, Selection, Sociogram};
pub use utils::escape_xml;
pub use viewport::{CanvasSize, Transform2D, ViewBox, Viewport, ZoomDirection};

/// 2D point in local drawing coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}
