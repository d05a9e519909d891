//! Image-space geometry: points, rectangles, resize handles and the pure
//! transforms the interaction layer applies to them.

use std::path::Path;

/// Smallest drawn rectangle (on each axis, in image pixels) that becomes an annotation.
pub const MIN_DRAW_SIZE: f64 = 5.0;
/// Half-size of a corner handle's hit area, in screen pixels.
pub const HANDLE_HIT_RADIUS_PX: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn rounded(self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    pub fn from_corners(a: ImagePoint, b: ImagePoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: ImagePoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn meets_min_draw_size(&self) -> bool {
        self.width >= MIN_DRAW_SIZE && self.height >= MIN_DRAW_SIZE
    }

    pub fn corner(&self, handle: Handle) -> ImagePoint {
        match handle {
            Handle::NorthWest => ImagePoint::new(self.x, self.y),
            Handle::NorthEast => ImagePoint::new(self.right(), self.y),
            Handle::SouthWest => ImagePoint::new(self.x, self.bottom()),
            Handle::SouthEast => ImagePoint::new(self.right(), self.bottom()),
        }
    }

    /// Handle whose corner lies within `radius` of `point` on both axes.
    pub fn handle_at(&self, point: ImagePoint, radius: f64) -> Option<Handle> {
        Handle::ALL.into_iter().find(|&handle| {
            let corner = self.corner(handle);
            (point.x - corner.x).abs() <= radius && (point.y - corner.y).abs() <= radius
        })
    }

    pub fn fits_within(&self, bounds: ImageBounds) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= bounds.width
            && self.bottom() <= bounds.height
    }

    /// `(x, y, width, height)` rounded for display.
    pub fn summary(&self) -> String {
        format!(
            "({}, {}, {}, {})",
            self.x.round() as i64,
            self.y.round() as i64,
            self.width.round() as i64,
            self.height.round() as i64
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBounds {
    pub width: f64,
    pub height: f64,
}

impl ImageBounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Natural pixel size of the image stored at `path`.
    pub fn from_image_file(path: impl AsRef<Path>) -> image::ImageResult<Self> {
        let (width, height) = image::image_dimensions(path)?;
        Ok(Self::new(f64::from(width), f64::from(height)))
    }

    pub fn clamp_point(&self, point: ImagePoint) -> ImagePoint {
        ImagePoint::new(
            point.x.clamp(0.0, self.width.max(0.0)),
            point.y.clamp(0.0, self.height.max(0.0)),
        )
    }
}

/// Corner affordance used to resize a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthWest,
        Self::SouthEast,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::NorthWest => "nw",
            Self::NorthEast => "ne",
            Self::SouthWest => "sw",
            Self::SouthEast => "se",
        }
    }

    /// Mirror across the vertical axis (west <-> east).
    pub const fn flip_horizontal(self) -> Self {
        match self {
            Self::NorthWest => Self::NorthEast,
            Self::NorthEast => Self::NorthWest,
            Self::SouthWest => Self::SouthEast,
            Self::SouthEast => Self::SouthWest,
        }
    }

    /// Mirror across the horizontal axis (north <-> south).
    pub const fn flip_vertical(self) -> Self {
        match self {
            Self::NorthWest => Self::SouthWest,
            Self::NorthEast => Self::SouthEast,
            Self::SouthWest => Self::NorthWest,
            Self::SouthEast => Self::NorthEast,
        }
    }

    const fn moves_west_edge(self) -> bool {
        matches!(self, Self::NorthWest | Self::SouthWest)
    }

    const fn moves_north_edge(self) -> bool {
        matches!(self, Self::NorthWest | Self::NorthEast)
    }
}

pub fn to_image_space(screen: ScreenPoint, container_origin: ScreenPoint, scale: f64) -> ImagePoint {
    ImagePoint::new(
        (screen.x - container_origin.x) / scale,
        (screen.y - container_origin.y) / scale,
    )
}

/// Translates `rect` back inside the image; never changes its size.
pub fn clamp(rect: Rect, bounds: ImageBounds) -> Rect {
    Rect {
        x: rect.x.min(bounds.width - rect.width).max(0.0),
        y: rect.y.min(bounds.height - rect.height).max(0.0),
        ..rect
    }
}

/// Shrinks `rect` to at most the image size, then clamps it. Used for stored boxes
/// that may have been saved against a different image.
pub fn fit(rect: Rect, bounds: ImageBounds) -> Rect {
    clamp(
        Rect {
            width: rect.width.min(bounds.width),
            height: rect.height.min(bounds.height),
            ..rect
        },
        bounds,
    )
}

pub fn apply_drag(rect: Rect, delta_x: f64, delta_y: f64, bounds: ImageBounds) -> Rect {
    clamp(
        Rect {
            x: rect.x + delta_x,
            y: rect.y + delta_y,
            ..rect
        },
        bounds,
    )
}

/// Moves the two edges adjacent to `handle` onto `cursor` (held inside the image).
///
/// When the cursor crosses the opposite edge the rectangle is normalized and the
/// returned handle is the mirror of `handle` on the crossed axis, so callers keep
/// resizing with the corner that is now under the pointer.
pub fn apply_resize(
    rect: Rect,
    handle: Handle,
    cursor: ImagePoint,
    bounds: ImageBounds,
) -> (Rect, Handle) {
    let cursor = bounds.clamp_point(cursor);
    let mut next = rect;
    if handle.moves_west_edge() {
        next.width += next.x - cursor.x;
        next.x = cursor.x;
    } else {
        next.width = cursor.x - next.x;
    }
    if handle.moves_north_edge() {
        next.height += next.y - cursor.y;
        next.y = cursor.y;
    } else {
        next.height = cursor.y - next.y;
    }

    let mut active = handle;
    if next.width < 0.0 {
        next.x += next.width;
        next.width = next.width.abs();
        active = active.flip_horizontal();
    }
    if next.height < 0.0 {
        next.y += next.height;
        next.height = next.height.abs();
        active = active.flip_vertical();
    }

    (clamp(next, bounds), active)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: ImageBounds = ImageBounds::new(200.0, 100.0);

    #[test]
    fn to_image_space_removes_origin_and_scale() {
        let point = to_image_space(
            ScreenPoint::new(130.0, 70.0),
            ScreenPoint::new(10.0, 10.0),
            2.0,
        );
        assert_eq!(point, ImagePoint::new(60.0, 30.0));
    }

    #[test]
    fn clamp_translates_instead_of_shrinking() {
        let clamped = clamp(Rect::new(180.0, -5.0, 40.0, 20.0), BOUNDS);
        assert_eq!(clamped, Rect::new(160.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn clamp_pins_oversized_rect_to_origin() {
        let clamped = clamp(Rect::new(30.0, 10.0, 250.0, 20.0), BOUNDS);
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.width, 250.0);
    }

    #[test]
    fn fit_shrinks_oversized_rect_to_the_image() {
        let fitted = fit(Rect::new(30.0, 10.0, 250.0, 20.0), BOUNDS);
        assert_eq!(fitted, Rect::new(0.0, 10.0, BOUNDS.width, 20.0));
        assert!(fitted.fits_within(BOUNDS));

        let inside = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(fit(inside, BOUNDS), inside);
    }

    #[test]
    fn drag_slides_along_blocked_edge() {
        let moved = apply_drag(Rect::new(150.0, 10.0, 40.0, 20.0), 25.0, 12.0, BOUNDS);
        assert_eq!(moved, Rect::new(160.0, 22.0, 40.0, 20.0));
    }

    #[test]
    fn resize_each_handle_keeps_opposite_corner_fixed() {
        let rect = Rect::new(50.0, 20.0, 40.0, 30.0);
        let cursor = ImagePoint::new(45.0, 15.0);
        let (nw, handle) = apply_resize(rect, Handle::NorthWest, cursor, BOUNDS);
        assert_eq!(nw, Rect::new(45.0, 15.0, 45.0, 35.0));
        assert_eq!(handle, Handle::NorthWest);

        let (ne, _) = apply_resize(rect, Handle::NorthEast, ImagePoint::new(100.0, 15.0), BOUNDS);
        assert_eq!(ne, Rect::new(50.0, 15.0, 50.0, 35.0));

        let (sw, _) = apply_resize(rect, Handle::SouthWest, ImagePoint::new(45.0, 60.0), BOUNDS);
        assert_eq!(sw, Rect::new(45.0, 20.0, 45.0, 40.0));

        let (se, _) = apply_resize(rect, Handle::SouthEast, ImagePoint::new(95.0, 55.0), BOUNDS);
        assert_eq!(se, Rect::new(50.0, 20.0, 45.0, 35.0));
    }

    #[test]
    fn resize_past_opposite_edge_flips_each_axis_independently() {
        let rect = Rect::new(50.0, 20.0, 40.0, 30.0);

        let (horizontal, handle) =
            apply_resize(rect, Handle::NorthWest, ImagePoint::new(100.0, 10.0), BOUNDS);
        assert_eq!(handle, Handle::NorthEast);
        assert_eq!(horizontal, Rect::new(90.0, 10.0, 10.0, 40.0));

        let (vertical, handle) =
            apply_resize(rect, Handle::NorthWest, ImagePoint::new(40.0, 60.0), BOUNDS);
        assert_eq!(handle, Handle::SouthWest);
        assert_eq!(vertical, Rect::new(40.0, 50.0, 50.0, 10.0));

        let (both, handle) =
            apply_resize(rect, Handle::SouthEast, ImagePoint::new(40.0, 10.0), BOUNDS);
        assert_eq!(handle, Handle::NorthWest);
        assert_eq!(both, Rect::new(40.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn resize_round_trip_through_flip_restores_original() {
        let original = Rect::new(10.0, 10.0, 20.0, 20.0);
        let (dx, dy) = (30.0, 25.0);

        let (flipped, active) = apply_resize(
            original,
            Handle::NorthWest,
            ImagePoint::new(original.x + dx, original.y + dy),
            BOUNDS,
        );
        assert_eq!(active, Handle::SouthEast);
        assert!(flipped.width >= 0.0 && flipped.height >= 0.0);

        let cursor = flipped.corner(active);
        let (restored, handle) = apply_resize(
            flipped,
            active,
            ImagePoint::new(cursor.x - dx, cursor.y - dy),
            BOUNDS,
        );
        assert_eq!(restored, original);
        assert_eq!(handle, Handle::NorthWest);
    }

    #[test]
    fn resize_cursor_outside_image_stops_at_edge() {
        let (resized, _) = apply_resize(
            Rect::new(150.0, 50.0, 40.0, 40.0),
            Handle::SouthEast,
            ImagePoint::new(220.0, 130.0),
            BOUNDS,
        );
        assert_eq!(resized, Rect::new(150.0, 50.0, 50.0, 50.0));
        assert!(resized.fits_within(BOUNDS));

        let (flipped, handle) = apply_resize(
            Rect::new(20.0, 20.0, 30.0, 30.0),
            Handle::NorthEast,
            ImagePoint::new(-40.0, 10.0),
            BOUNDS,
        );
        assert_eq!(handle, Handle::NorthWest);
        assert_eq!(flipped, Rect::new(0.0, 10.0, 20.0, 40.0));
    }

    #[test]
    fn handle_at_matches_corners_within_radius() {
        let rect = Rect::new(10.0, 10.0, 50.0, 40.0);
        assert_eq!(
            rect.handle_at(ImagePoint::new(58.0, 52.0), 3.0),
            Some(Handle::SouthEast)
        );
        assert_eq!(rect.handle_at(ImagePoint::new(35.0, 30.0), 3.0), None);
    }

    #[test]
    fn handle_flips_are_involutions() {
        for handle in Handle::ALL {
            assert_eq!(handle.flip_horizontal().flip_horizontal(), handle);
            assert_eq!(handle.flip_vertical().flip_vertical(), handle);
        }
    }

    #[test]
    fn rect_summary_rounds_each_component() {
        assert_eq!(
            Rect::new(10.4, 10.6, 39.5, 50.2).summary(),
            "(10, 11, 40, 50)"
        );
    }
}
