//! Projection of device coordinates onto the fixed InkML canvas.
//!
//! The document's bounding box is widened along its narrower axis until it
//! matches the A4 aspect ratio, then mapped onto a 32767 x 32767 canvas with
//! a reserved margin on every side.

use serde::Serialize;

use crate::types::{Point, SceneTree};

pub const SCREEN_WIDTH: i32 = 32767;
pub const SCREEN_HEIGHT: i32 = 32767;
pub const X_PAD: i32 = 200;
pub const Y_PAD: i32 = 200;
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
pub const ASPECT_RATIO: f64 = A4_WIDTH_MM / A4_HEIGHT_MM;
pub const PRESSURE_SCALE: f64 = 128.0;

/// Output canvas geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: i32,
    pub height: i32,
    pub x_pad: i32,
    pub y_pad: i32,
    /// Reference page width / height
    pub aspect_ratio: f64,
    pub pressure_scale: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            x_pad: X_PAD,
            y_pad: Y_PAD,
            aspect_ratio: ASPECT_RATIO,
            pressure_scale: PRESSURE_SCALE,
        }
    }
}

impl Canvas {
    fn draw_width(&self) -> f64 {
        f64::from(self.width - 2 * self.x_pad)
    }

    fn draw_height(&self) -> f64 {
        f64::from(self.height - 2 * self.y_pad)
    }
}

/// Extent of all stroke points in device units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Box over `points`, seeded with the origin.
    ///
    /// The origin is always part of the box, so an empty document yields
    /// `(0, 0, 0, 0)` and a page whose strokes sit far from the origin still
    /// spans back to it.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        points
            .into_iter()
            .fold(Self::default(), |bbox, p| Self {
                min_x: bbox.min_x.min(p.x),
                max_x: bbox.max_x.max(p.x),
                min_y: bbox.min_y.min(p.y),
                max_y: bbox.max_y.max(p.y),
            })
    }

    pub fn of_scene(scene: &SceneTree) -> Self {
        Self::from_points(scene.strokes().flat_map(|s| s.points.iter()))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Aspect-corrected logical rectangle points are normalized against.
/// Internal to the mapper; callers see its extent through
/// [`CoordinateMapper::fitted_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Viewport {
    pub min_x: f64,
    pub min_y: f64,
    pub x_range: f64,
    pub y_range: f64,
}

impl Viewport {
    /// Grow the narrower axis of `bbox` around its center until
    /// `x_range / y_range == aspect_ratio`. Neither axis ever shrinks.
    pub fn fit(bbox: &BoundingBox, aspect_ratio: f64) -> Self {
        let mut x_range = bbox.width();
        let mut y_range = bbox.height();
        if x_range == 0.0 {
            x_range = 1.0;
        }
        if y_range == 0.0 {
            y_range = 1.0;
        }

        let mut min_x = bbox.min_x;
        let mut min_y = bbox.min_y;

        if x_range / y_range > aspect_ratio {
            // wider than the page: extend y
            let target = x_range / aspect_ratio;
            let center = (bbox.min_y + bbox.max_y) / 2.0;
            min_y = center - target / 2.0;
            y_range = target;
        } else {
            let target = y_range * aspect_ratio;
            let center = (bbox.min_x + bbox.max_x) / 2.0;
            min_x = center - target / 2.0;
            x_range = target;
        }

        Self {
            min_x,
            min_y,
            x_range,
            y_range,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.min_x + self.x_range
    }

    pub fn max_y(&self) -> f64 {
        self.min_y + self.y_range
    }

    #[cfg(test)]
    pub fn aspect_ratio(&self) -> f64 {
        self.x_range / self.y_range
    }

    #[cfg(test)]
    pub fn contains(&self, bbox: &BoundingBox) -> bool {
        const EPS: f64 = 1e-9;
        let tol_x = EPS * self.x_range.abs().max(1.0);
        let tol_y = EPS * self.y_range.abs().max(1.0);
        bbox.min_x >= self.min_x - tol_x
            && bbox.max_x <= self.max_x() + tol_x
            && bbox.min_y >= self.min_y - tol_y
            && bbox.max_y <= self.max_y() + tol_y
    }
}

/// Integer canvas position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// Fully mapped trace sample: canvas position plus force channel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InkPoint {
    pub x: i32,
    pub y: i32,
    pub force: i32,
}

/// Per-export projection state. Built once per document and never shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    canvas: Canvas,
    bbox: BoundingBox,
    viewport: Viewport,
}

impl CoordinateMapper {
    pub fn new(canvas: Canvas, bbox: &BoundingBox) -> Self {
        Self {
            canvas,
            bbox: *bbox,
            viewport: Viewport::fit(bbox, canvas.aspect_ratio),
        }
    }

    pub fn for_scene(scene: &SceneTree, canvas: Canvas) -> Self {
        Self::new(canvas, &BoundingBox::of_scene(scene))
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Extent of the aspect-corrected area the page is normalized against
    pub fn fitted_bounds(&self) -> BoundingBox {
        let v = &self.viewport;
        BoundingBox {
            min_x: v.min_x,
            max_x: v.max_x(),
            min_y: v.min_y,
            max_y: v.max_y(),
        }
    }

    /// Map a device position into `[pad, dim - pad]` on both axes
    pub fn project(&self, x: f64, y: f64) -> ScreenPoint {
        let c = &self.canvas;
        let v = &self.viewport;

        let x_norm = (x - v.min_x) / v.x_range;
        let y_norm = (y - v.min_y) / v.y_range;

        // `as` truncates toward zero and saturates
        let new_x = (x_norm * c.draw_width() + f64::from(c.x_pad)) as i32;
        let new_y = (y_norm * c.draw_height() + f64::from(c.y_pad)) as i32;

        ScreenPoint {
            x: new_x.clamp(c.x_pad, c.width - c.x_pad),
            y: new_y.clamp(c.y_pad, c.height - c.y_pad),
        }
    }

    /// Scale a [0, 1] pressure fraction onto the force channel
    pub fn pressure(&self, fraction: f64) -> i32 {
        (fraction * self.canvas.pressure_scale).round() as i32
    }

    pub fn map(&self, point: &Point) -> InkPoint {
        let ScreenPoint { x, y } = self.project(point.x, point.y);
        InkPoint {
            x,
            y,
            force: self.pressure(point.pressure),
        }
    }
}
