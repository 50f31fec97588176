//! Freehand pencil stroke.

use super::{AnnotationId, Markup, PageNumber};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand drawing (polyline through the sampled pointer positions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freehand {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: AnnotationId,
    pub page: PageNumber,
    pub color: String,
    pub stroke_width: f64,
    /// Points in the path, document coordinates.
    pub points: Vec<Point>,
}

impl Freehand {
    /// Start a stroke seeded with a single point.
    pub fn new(page: PageNumber, color: impl Into<String>, stroke_width: f64, start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            color: color.into(),
            stroke_width,
            points: vec![start],
        }
    }

    /// Create from existing points.
    pub fn from_points(
        page: PageNumber,
        color: impl Into<String>,
        stroke_width: f64,
        points: Vec<Point>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            color: color.into(),
            stroke_width,
            points,
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A single click leaves one point and draws nothing.
    pub fn is_paintable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Consecutive point pairs, one per drawn segment.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Path representation for renderers.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
        path
    }
}

impl Markup for Freehand {
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
        if self.points.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Rect::new(min_x, min_y, max_x, max_y)
    }
}
