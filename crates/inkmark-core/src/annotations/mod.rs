//! Annotation definitions.

mod freehand;
mod region;
mod text;

pub use freehand::Freehand;
pub use region::{Region, RegionKind};
pub use text::TextMark;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 1-based page index within the loaded document.
pub type PageNumber = u32;

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// Common behaviour of every annotation kind.
pub trait Markup {
    /// Get the unique identifier.
    fn id(&self) -> AnnotationId;

    /// Page the annotation belongs to.
    fn page(&self) -> PageNumber;

    /// Stored color string.
    fn color(&self) -> &str;

    /// Axis-aligned bounds in document coordinates.
    fn bounds(&self) -> Rect;
}

/// A committed or in-progress markup on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "camelCase")]
pub enum Annotation {
    Freehand(Freehand),
    Text(TextMark),
    Region(Region),
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Annotation::Freehand(a) => a.id(),
            Annotation::Text(a) => a.id(),
            Annotation::Region(a) => a.id(),
        }
    }

    pub fn page(&self) -> PageNumber {
        match self {
            Annotation::Freehand(a) => a.page(),
            Annotation::Text(a) => a.page(),
            Annotation::Region(a) => a.page(),
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Annotation::Freehand(a) => a.color(),
            Annotation::Text(a) => a.color(),
            Annotation::Region(a) => a.color(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Annotation::Freehand(a) => a.bounds(),
            Annotation::Text(a) => a.bounds(),
            Annotation::Region(a) => a.bounds(),
        }
    }

    /// Whether this is a transient eraser stroke.
    pub fn is_eraser_stroke(&self) -> bool {
        matches!(self, Annotation::Region(r) if r.kind == RegionKind::EraserStroke)
    }

    /// Whether the annotation satisfies the invariants for being stored.
    ///
    /// Eraser strokes, freehand paths shorter than two points and blank text
    /// never belong in the collection.
    pub fn is_committable(&self) -> bool {
        match self {
            Annotation::Freehand(f) => f.is_paintable(),
            Annotation::Text(t) => t.has_content(),
            Annotation::Region(r) => r.kind != RegionKind::EraserStroke,
        }
    }

    /// Give the annotation a fresh identifier.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Annotation::Freehand(a) => a.id = new_id,
            Annotation::Text(a) => a.id = new_id,
            Annotation::Region(a) => a.id = new_id,
        }
    }
}

impl From<Freehand> for Annotation {
    fn from(value: Freehand) -> Self {
        Annotation::Freehand(value)
    }
}

impl From<TextMark> for Annotation {
    fn from(value: TextMark) -> Self {
        Annotation::Text(value)
    }
}

impl From<Region> for Annotation {
    fn from(value: Region) -> Self {
        Annotation::Region(value)
    }
}
