use serde::{Deserialize, Serialize};

use crate::Point;

pub const BASE_VIEW_WIDTH: f32 = 800.0;
pub const BASE_VIEW_HEIGHT: f32 = 600.0;
pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.2;

/// Fixed size of the interactive surface, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

/// The rectangle of local coordinate space currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    pub fn base() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: BASE_VIEW_WIDTH,
            height: BASE_VIEW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Axis-aligned affine map between coordinate spaces. `forward` applies the
/// map; `inverse` returns the reverse map. Both pan and drag go through this
/// one type so screen/local conversions cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Transform2D {
    pub fn forward(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale_x + self.offset_x,
            point.y * self.scale_y + self.offset_y,
        )
    }

    /// The view box invariant (`width, height > 0`) keeps both scales
    /// non-zero, so the inverse always exists.
    pub fn inverse(&self) -> Transform2D {
        Transform2D {
            scale_x: 1.0 / self.scale_x,
            scale_y: 1.0 / self.scale_y,
            offset_x: -self.offset_x / self.scale_x,
            offset_y: -self.offset_y / self.scale_y,
        }
    }
}

/// Pan/zoom state over a fixed canvas. Zoom is bounded; pan is not, since
/// the content is sparse and the user may park it anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub view: ViewBox,
    pub canvas: CanvasSize,
}

impl Viewport {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            view: ViewBox::base(),
            canvas,
        }
    }

    pub fn zoom_factor(&self) -> f32 {
        BASE_VIEW_WIDTH / self.view.width
    }

    /// Local -> screen transform for the current pan/zoom state.
    pub fn to_screen(&self) -> Transform2D {
        let scale_x = self.canvas.width / self.view.width;
        let scale_y = self.canvas.height / self.view.height;
        Transform2D {
            scale_x,
            scale_y,
            offset_x: -self.view.x * scale_x,
            offset_y: -self.view.y * scale_y,
        }
    }

    pub fn local_to_screen(&self, point: Point) -> Point {
        self.to_screen().forward(point)
    }

    pub fn screen_to_local(&self, point: Point) -> Point {
        self.to_screen().inverse().forward(point)
    }

    /// Step the zoom factor, clamped to [ZOOM_MIN, ZOOM_MAX], keeping the
    /// local point at the visual center of the canvas fixed.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let delta = match direction {
            ZoomDirection::In => ZOOM_STEP,
            ZoomDirection::Out => -ZOOM_STEP,
        };

        let current = self.zoom_factor();
        let next = (current + delta).clamp(ZOOM_MIN, ZOOM_MAX);
        if (next - current).abs() <= f32::EPSILON {
            return;
        }

        let center_screen = Point::new(self.canvas.width / 2.0, self.canvas.height / 2.0);
        let center_local = self.screen_to_local(center_screen);

        let scale = current / next;
        let width = self.view.width * scale;
        let height = self.view.height * scale;

        self.view = ViewBox {
            x: center_local.x - (center_screen.x / self.canvas.width) * width,
            y: center_local.y - (center_screen.y / self.canvas.height) * height,
            width,
            height,
        };
    }

    /// Restore the default view box.
    pub fn reset(&mut self) {
        self.view = ViewBox::base();
    }

    /// Shift the origin so `anchor` (the local point recorded at gesture
    /// start) lands back under the screen position the pointer has moved to.
    pub fn pan_to_anchor(&mut self, anchor: Point, screen: Point) {
        let local = self.screen_to_local(screen);
        self.view.x += anchor.x - local.x;
        self.view.y += anchor.y - local.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: CanvasSize = CanvasSize {
        width: 1200.0,
        height: 600.0,
    };

    #[test]
    fn screen_local_round_trip() {
        let viewport = Viewport::new(CANVAS);
        let screen = Point::new(300.0, 450.0);
        let back = viewport.local_to_screen(viewport.screen_to_local(screen));
        assert!(screen.distance_to(back) < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut viewport = Viewport::new(CANVAS);
        for _ in 0..40 {
            viewport.zoom(ZoomDirection::In);
        }
        assert!(viewport.zoom_factor() <= ZOOM_MAX + 1e-3);

        for _ in 0..80 {
            viewport.zoom(ZoomDirection::Out);
        }
        assert!(viewport.zoom_factor() >= ZOOM_MIN - 1e-3);
    }

    #[test]
    fn zoom_preserves_the_visual_center() {
        let mut viewport = Viewport::new(CANVAS);
        let center_screen = Point::new(CANVAS.width / 2.0, CANVAS.height / 2.0);
        let before = viewport.screen_to_local(center_screen);

        viewport.zoom(ZoomDirection::In);
        let after = viewport.screen_to_local(center_screen);

        assert!(before.distance_to(after) < 1e-2);
    }

    #[test]
    fn zoom_in_then_out_restores_the_view_box() {
        let mut viewport = Viewport::new(CANVAS);
        let original = viewport.view;

        viewport.zoom(ZoomDirection::In);
        viewport.zoom(ZoomDirection::Out);

        assert!((viewport.view.x - original.x).abs() < 1e-2);
        assert!((viewport.view.y - original.y).abs() < 1e-2);
        assert!((viewport.view.width - original.width).abs() < 1e-2);
        assert!((viewport.view.height - original.height).abs() < 1e-2);
    }

    #[test]
    fn pan_round_trip_restores_the_origin_exactly() {
        // 2x scale on both axes keeps every conversion exact in f32
        let mut viewport = Viewport::new(CanvasSize {
            width: 1600.0,
            height: 1200.0,
        });
        let start = Point::new(100.0, 100.0);

        let anchor = viewport.screen_to_local(start);
        viewport.pan_to_anchor(anchor, Point::new(164.0, 36.0));
        viewport.pan_to_anchor(anchor, start);

        assert_eq!(viewport.view.x, 0.0);
        assert_eq!(viewport.view.y, 0.0);
    }

    #[test]
    fn panning_keeps_the_anchor_under_the_pointer() {
        let mut viewport = Viewport::new(CANVAS);
        viewport.zoom(ZoomDirection::In);

        let anchor = viewport.screen_to_local(Point::new(200.0, 200.0));
        let target = Point::new(500.0, 350.0);
        viewport.pan_to_anchor(anchor, target);

        assert!(viewport.screen_to_local(target).distance_to(anchor) < 1e-2);
    }

    #[test]
    fn reset_restores_the_base_view() {
        let mut viewport = Viewport::new(CANVAS);
        viewport.zoom(ZoomDirection::In);
        viewport.pan_to_anchor(Point::new(50.0, 50.0), Point::new(700.0, 100.0));

        viewport.reset();
        assert_eq!(viewport.view, ViewBox::base());
        assert!((viewport.zoom_factor() - 1.0).abs() < 1e-6);
    }
}
