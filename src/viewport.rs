use crate::geometry::{self, ImagePoint, ScreenPoint, HANDLE_HIT_RADIUS_PX};

const ZOOM_STEP: f64 = 1.2;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 5.0;
const DEFAULT_SCALE: f64 = 1.0;

fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Zoom level and on-screen placement of the image container.
///
/// Annotation geometry never depends on this; it only maps pointer input into image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    origin: ScreenPoint,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub const fn new() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            origin: ScreenPoint::new(0.0, 0.0),
        }
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    pub const fn min_scale() -> f64 {
        MIN_SCALE
    }

    pub const fn max_scale() -> f64 {
        MAX_SCALE
    }

    pub const fn origin(&self) -> ScreenPoint {
        self.origin
    }

    /// Screen position of the image container's top-left corner.
    pub fn set_origin(&mut self, origin: ScreenPoint) {
        self.origin = origin;
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.scale = clamp_scale(self.scale * ZOOM_STEP);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.scale = clamp_scale(self.scale / ZOOM_STEP);
        self.scale
    }

    pub fn reset(&mut self) -> f64 {
        self.scale = DEFAULT_SCALE;
        self.scale
    }

    pub fn to_image_space(&self, point: ScreenPoint) -> ImagePoint {
        geometry::to_image_space(point, self.origin, self.scale)
    }

    /// Handle hit radius in image pixels at the current zoom.
    pub fn handle_radius(&self) -> f64 {
        HANDLE_HIT_RADIUS_PX / self.scale
    }
}
