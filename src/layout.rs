use std::collections::HashMap;
use std::f32::consts::PI;

use crate::Point;
use crate::sociogram::Sociogram;

pub const LAYOUT_CENTER_X: f32 = 400.0;
pub const LAYOUT_CENTER_Y: f32 = 300.0;
pub const LAYOUT_RADIUS: f32 = 220.0;

/// Strategy seam for assigning node positions. Implementations receive the
/// previous positions so a policy that refines an existing arrangement can
/// start from them; the canonical circular policy ignores them.
pub trait LayoutPolicy: Send + Sync {
    fn compute_layout(
        &self,
        graph: &Sociogram,
        previous: &HashMap<String, Point>,
    ) -> HashMap<String, Point>;
}

/// Deterministic placement on a fixed circle. Node 0 sits at the top and the
/// rest follow clockwise; distinct indices always get distinct angles.
#[derive(Debug, Clone, Copy)]
pub struct CircularLayout {
    pub center: Point,
    pub radius: f32,
}

impl Default for CircularLayout {
    fn default() -> Self {
        Self {
            center: Point::new(LAYOUT_CENTER_X, LAYOUT_CENTER_Y),
            radius: LAYOUT_RADIUS,
        }
    }
}

impl LayoutPolicy for CircularLayout {
    fn compute_layout(
        &self,
        graph: &Sociogram,
        _previous: &HashMap<String, Point>,
    ) -> HashMap<String, Point> {
        let count = graph.order.len();
        let mut positions = HashMap::with_capacity(count);

        for (index, id) in graph.order.iter().enumerate() {
            let angle = (index as f32 / count as f32) * 2.0 * PI - PI / 2.0;
            positions.insert(
                id.clone(),
                Point::new(
                    self.center.x + self.radius * angle.cos(),
                    self.center.y + self.radius * angle.sin(),
                ),
            );
        }

        positions
    }
}
