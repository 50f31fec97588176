//! The annotation collection for one loaded document.

use crate::annotations::{Annotation, AnnotationId, PageNumber};
use std::collections::HashSet;
use thiserror::Error;

/// Rejected mutations of the annotation collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("page {page} is outside the document (1..={page_count})")]
    PageOutOfRange { page: PageNumber, page_count: u32 },
    #[error("eraser strokes are never stored")]
    EraserStroke,
    #[error("annotation has nothing to draw")]
    Empty,
}

/// Ordered annotations of the loaded document.
///
/// Insertion order is paint order. Every stored annotation references a page
/// within `1..=page_count`; the collection is only changed through the
/// methods below.
#[derive(Debug, Clone, Default)]
pub struct AnnotationDocument {
    name: String,
    page_count: u32,
    annotations: Vec<Annotation>,
}

impl AnnotationDocument {
    /// Create an empty collection for a document with `page_count` pages.
    pub fn new(name: impl Into<String>, page_count: u32) -> Self {
        Self {
            name: name.into(),
            page_count,
            annotations: Vec::new(),
        }
    }

    /// Document name (the source file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Whether `page` exists in the document.
    pub fn contains_page(&self, page: PageNumber) -> bool {
        page >= 1 && page <= self.page_count
    }

    /// Check that an annotation may be stored.
    pub fn validate(&self, annotation: &Annotation) -> Result<(), ModelError> {
        let page = annotation.page();
        if !self.contains_page(page) {
            return Err(ModelError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }
        if annotation.is_eraser_stroke() {
            return Err(ModelError::EraserStroke);
        }
        if !annotation.is_committable() {
            return Err(ModelError::Empty);
        }
        Ok(())
    }

    /// Append an annotation on top of everything else.
    pub fn append(&mut self, annotation: Annotation) -> Result<AnnotationId, ModelError> {
        self.validate(&annotation)?;
        let id = annotation.id();
        self.annotations.push(annotation);
        Ok(id)
    }

    /// Remove every annotation matching `predicate`, returning how many went.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Annotation) -> bool) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| !predicate(a));
        before - self.annotations.len()
    }

    /// Remove the annotations with the given ids in one update.
    pub fn remove_ids(&mut self, ids: &[AnnotationId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.remove_where(|a| ids.contains(&a.id()))
    }

    /// Replace the whole collection, keeping only valid entries.
    ///
    /// Ids are unique within the collection: an entry reusing an id already
    /// loaded gets a fresh one. Returns the number of entries that were
    /// dropped.
    pub fn replace_all(&mut self, annotations: impl IntoIterator<Item = Annotation>) -> usize {
        self.annotations.clear();
        let mut seen = HashSet::new();
        let mut dropped = 0;
        for mut annotation in annotations {
            match self.validate(&annotation) {
                Ok(()) => {
                    if !seen.insert(annotation.id()) {
                        let old = annotation.id();
                        annotation.regenerate_id();
                        log::warn!("Duplicate annotation id {}, reassigned {}", old, annotation.id());
                        seen.insert(annotation.id());
                    }
                    self.annotations.push(annotation);
                }
                Err(e) => {
                    log::warn!("Dropping annotation {}: {}", annotation.id(), e);
                    dropped += 1;
                }
            }
        }
        dropped
    }

    /// Remove all annotations.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    /// All annotations in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations on one page, in paint order.
    pub fn for_page(&self, page: PageNumber) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page() == page)
    }

    /// Get an annotation by id.
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Owned copy of the collection (for snapshots).
    pub fn to_vec(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Freehand, Region, RegionKind, TextMark};
    use kurbo::Point;

    fn highlight(page: PageNumber) -> Annotation {
        Region::from_corners(
            RegionKind::Highlight,
            page,
            "rgba(255, 255, 0, 0.4)",
            20.0,
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
        )
        .into()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut doc = AnnotationDocument::new("a.pdf", 3);
        let first = doc.append(highlight(1)).unwrap();
        let second = doc.append(highlight(2)).unwrap();
        let ids: Vec<_> = doc.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_append_rejects_out_of_range() {
        let mut doc = AnnotationDocument::new("a.pdf", 2);
        assert_eq!(
            doc.append(highlight(3)),
            Err(ModelError::PageOutOfRange { page: 3, page_count: 2 })
        );
        assert!(matches!(doc.append(highlight(0)), Err(ModelError::PageOutOfRange { .. })));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_append_rejects_eraser_and_empty() {
        let mut doc = AnnotationDocument::new("a.pdf", 1);
        let eraser = Region::new(RegionKind::EraserStroke, 1, "#f00", 2.0, Point::ZERO);
        assert_eq!(doc.append(eraser.into()), Err(ModelError::EraserStroke));
        let dot = Freehand::new(1, "#f00", 2.0, Point::ZERO);
        assert_eq!(doc.append(dot.into()), Err(ModelError::Empty));
    }

    #[test]
    fn test_for_page_filters() {
        let mut doc = AnnotationDocument::new("a.pdf", 2);
        doc.append(highlight(1)).unwrap();
        doc.append(highlight(2)).unwrap();
        doc.append(highlight(1)).unwrap();
        assert_eq!(doc.for_page(1).count(), 2);
        assert_eq!(doc.for_page(2).count(), 1);
    }

    #[test]
    fn test_remove_ids() {
        let mut doc = AnnotationDocument::new("a.pdf", 1);
        let a = doc.append(highlight(1)).unwrap();
        let b = doc
            .append(TextMark::new(1, Point::new(1.0, 1.0), "x", 16.0, "#000").into())
            .unwrap();
        assert_eq!(doc.remove_ids(&[a]), 1);
        assert!(doc.get(a).is_none());
        assert!(doc.get(b).is_some());
        assert_eq!(doc.remove_ids(&[]), 0);
    }

    #[test]
    fn test_replace_all_drops_invalid() {
        let mut doc = AnnotationDocument::new("a.pdf", 2);
        doc.append(highlight(1)).unwrap();
        let dropped = doc.replace_all(vec![highlight(1), highlight(5), highlight(2)]);
        assert_eq!(dropped, 1);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_replace_all_reassigns_duplicate_ids() {
        let first = TextMark::new(1, Point::new(5.0, 5.0), "a", 12.0, "#000");
        let mut second = TextMark::new(2, Point::new(500.0, 500.0), "b", 12.0, "#000");
        let shared = first.id;
        second.id = shared;

        let mut doc = AnnotationDocument::new("a.pdf", 2);
        assert_eq!(doc.replace_all([first.into(), second.into()]), 0);
        let ids: Vec<_> = doc.iter().map(|a| a.id()).collect();
        assert_eq!(ids[0], shared);
        assert_ne!(ids[1], shared);
        assert_eq!(doc.remove_ids(&[shared]), 1);
        assert_eq!(doc.for_page(2).count(), 1);
    }
}
