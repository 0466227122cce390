use serde::{Deserialize, Serialize};

use crate::Point;

pub const NODE_BASE_RADIUS: f32 = 20.0;
pub const NODE_RADIUS_GROWTH: f32 = 8.0;
/// Gap between the node boundary and the path endpoint so the arrowhead
/// lands on the circle instead of inside it.
pub const ARROW_CLEARANCE: f32 = 5.0;

const MUTUAL_CURVATURE_MIN: f32 = 40.0;
const MUTUAL_CURVATURE_RATIO: f32 = 0.15;
const SINGLE_CURVATURE_MAX: f32 = 20.0;
const SINGLE_CURVATURE_RATIO: f32 = 0.06;

/// Visual radius of a node, growing with the number of received selections.
pub fn node_radius(in_degree: usize) -> f32 {
    NODE_BASE_RADIUS + in_degree as f32 * NODE_RADIUS_GROWTH
}

/// A quadratic Bezier connecting two node boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePath {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl EdgePath {
    /// SVG path data, `M start Q control end`.
    pub fn to_path_data(&self) -> String {
        format!(
            "M {:.1} {:.1} Q {:.1} {:.1} {:.1} {:.1}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

/// Build the curved path between two node centers. Mutual pairs bow out
/// generously so both directions read as one thick curve; single selections
/// bow only slightly. The suppressed twin of a mutual pair would have bowed
/// to the opposite side; it is never drawn, so the curvature sign here is
/// always positive.
pub fn curve_between(
    from: Point,
    to: Point,
    from_radius: f32,
    to_radius: f32,
    mutual: bool,
) -> EdgePath {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = (dx * dx + dy * dy).sqrt();
    // coincident nodes have no direction; substitute a unit length so the
    // perpendicular never divides by zero
    let safe_dist = if dist <= f32::EPSILON { 1.0 } else { dist };

    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);

    let curvature = if mutual {
        (dist * MUTUAL_CURVATURE_RATIO).max(MUTUAL_CURVATURE_MIN)
    } else {
        (dist * SINGLE_CURVATURE_RATIO).min(SINGLE_CURVATURE_MAX)
    };

    let control = Point::new(
        mid.x + (-dy / safe_dist) * curvature,
        mid.y + (dx / safe_dist) * curvature,
    );

    EdgePath {
        start: pull_back(from, control, from_radius + ARROW_CLEARANCE),
        control,
        end: pull_back(to, control, to_radius + ARROW_CLEARANCE),
    }
}

/// Move a path endpoint off the node center toward the control point, by the
/// node radius plus the arrow clearance.
fn pull_back(endpoint: Point, control: Point, distance: f32) -> Point {
    let dx = control.x - endpoint.x;
    let dy = control.y - endpoint.y;
    let length = (dx * dx + dy * dy).sqrt();
    let (unit_x, unit_y) = if length <= f32::EPSILON {
        (1.0, 0.0)
    } else {
        (dx / length, dy / length)
    };

    Point::new(
        endpoint.x + unit_x * distance,
        endpoint.y + unit_y * distance,
    )
}
