//! Eraser hit-testing.

use crate::annotations::{Annotation, AnnotationId, PageNumber, RegionKind};
use crate::document::AnnotationDocument;
use crate::geometry::{contains_inclusive, overlaps};
use kurbo::Rect;

/// Whether a single annotation is hit by a normalized erase rectangle.
pub fn is_hit(annotation: &Annotation, erase: Rect) -> bool {
    match annotation {
        Annotation::Text(text) => contains_inclusive(erase, text.anchor()),
        Annotation::Freehand(freehand) => freehand
            .points
            .iter()
            .any(|p| contains_inclusive(erase, *p)),
        Annotation::Region(region) => match region.kind {
            RegionKind::Highlight | RegionKind::Rectangle => {
                overlaps(annotation.bounds(), erase)
            }
            RegionKind::EraserStroke => false,
        },
    }
}

/// Ids of the annotations on `page` hit by `erase`, in collection order.
pub fn hit_test(doc: &AnnotationDocument, page: PageNumber, erase: Rect) -> Vec<AnnotationId> {
    doc.for_page(page)
        .filter(|a| is_hit(a, erase))
        .map(|a| a.id())
        .collect()
}
