//! Text mark.

use super::{AnnotationId, Markup, PageNumber};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A run of text anchored at its baseline origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMark {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: AnnotationId,
    pub page: PageNumber,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
}

impl TextMark {
    pub fn new(
        page: PageNumber,
        anchor: Point,
        text: impl Into<String>,
        font_size: f64,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            color: color.into(),
            x: anchor.x,
            y: anchor.y,
            text: text.into(),
            font_size,
        }
    }

    /// Baseline origin in document coordinates.
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whitespace-only text is treated as no input.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl Markup for TextMark {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn page(&self) -> PageNumber {
        self.page
    }

    fn color(&self) -> &str {
        &self.color
    }

    /// Only the anchor participates in hit-testing, so the bounds are the
    /// anchor itself.
    fn bounds(&self) -> Rect {
        Rect::from_points(self.anchor(), self.anchor())
    }
}
