//! Two-corner region annotations: highlight, rectangle and eraser stroke.

use super::{AnnotationId, Markup, PageNumber};
use crate::geometry::normalized_rect;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a region is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    /// Translucent filled box.
    Highlight,
    /// Stroked outline.
    Rectangle,
    /// Erase area; consumed at pointer-up, never stored.
    EraserStroke,
}

/// A region defined by two opposite corners.
///
/// The start corner is where the pointer went down and stays fixed while the
/// end corner follows the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: AnnotationId,
    pub kind: RegionKind,
    pub page: PageNumber,
    pub color: String,
    pub stroke_width: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Region {
    /// Create a zero-size region anchored at `start`.
    pub fn new(
        kind: RegionKind,
        page: PageNumber,
        color: impl Into<String>,
        stroke_width: f64,
        start: Point,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            page,
            color: color.into(),
            stroke_width,
            start_x: start.x,
            start_y: start.y,
            end_x: start.x,
            end_y: start.y,
        }
    }

    /// Create a region from both corners.
    pub fn from_corners(
        kind: RegionKind,
        page: PageNumber,
        color: impl Into<String>,
        stroke_width: f64,
        start: Point,
        end: Point,
    ) -> Self {
        let mut region = Self::new(kind, page, color, stroke_width, start);
        region.set_end(end);
        region
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// Move the end corner; the start corner is untouched.
    pub fn set_end(&mut self, end: Point) {
        self.end_x = end.x;
        self.end_y = end.y;
    }

    /// Both corners coincide (a click without a drag).
    pub fn is_degenerate(&self) -> bool {
        self.start() == self.end()
    }
}

impl Markup for Region {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn page(&self) -> PageNumber {
        self.page
    }

    fn color(&self) -> &str {
        &self.color
    }

    fn bounds(&self) -> Rect {
        normalized_rect(self.start(), self.end())
    }
}
