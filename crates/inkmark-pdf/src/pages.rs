//! Page tree helpers.

use crate::error::{PdfError, PdfResult};
use inkmark_core::annotations::PageNumber;
use kurbo::{Rect, Size};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Guards against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Object id of a 1-based page.
pub(crate) fn page_id(doc: &Document, page: PageNumber) -> PdfResult<ObjectId> {
    doc.get_pages()
        .get(&page)
        .copied()
        .ok_or(PdfError::MissingPage(page))
}

/// Look up a page attribute, following `Parent` links for inherited ones.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value));
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow a reference one level.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

pub(crate) fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// The page's MediaBox, normalized.
pub(crate) fn media_box(doc: &Document, page: PageNumber) -> PdfResult<Rect> {
    let id = page_id(doc, page)?;
    let values = inherited(doc, id, b"MediaBox")
        .and_then(|o| o.as_array().ok())
        .ok_or(PdfError::InvalidMediaBox(page))?;
    let coords: Vec<f64> = values
        .iter()
        .filter_map(|v| number(resolve(doc, v)))
        .collect();
    match coords.as_slice() {
        [x0, y0, x1, y1] => Ok(Rect::new(*x0, *y0, *x1, *y1).abs()),
        _ => Err(PdfError::InvalidMediaBox(page)),
    }
}

/// Native page size from the MediaBox.
pub(crate) fn page_size(doc: &Document, page: PageNumber) -> PdfResult<Size> {
    Ok(media_box(doc, page)?.size())
}

/// Resource dictionary in effect for a page, copied.
pub(crate) fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited(doc, page_id, b"Resources")
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::create_test_pdf;

    #[test]
    fn test_page_size() {
        let doc = Document::load_mem(&create_test_pdf(&[(612, 792), (842, 595)])).unwrap();
        assert_eq!(page_size(&doc, 1).unwrap(), Size::new(612.0, 792.0));
        assert_eq!(page_size(&doc, 2).unwrap(), Size::new(842.0, 595.0));
        assert!(matches!(page_size(&doc, 3), Err(PdfError::MissingPage(3))));
    }

    #[test]
    fn test_inherited_media_box() {
        use lopdf::dictionary;

        let mut doc = Document::load_mem(&create_test_pdf(&[(100, 100)])).unwrap();
        let id = page_id(&doc, 1).unwrap();
        let parent = doc
            .get_dictionary(id)
            .unwrap()
            .get(b"Parent")
            .and_then(Object::as_reference)
            .unwrap();
        doc.get_dictionary_mut(id).unwrap().remove(b"MediaBox");
        doc.get_dictionary_mut(parent)
            .unwrap()
            .set("MediaBox", vec![0.into(), 0.into(), 300.into(), 400.into()]);
        doc.get_dictionary_mut(parent).unwrap().set(
            "Resources",
            dictionary! { "ProcSet" => vec![Object::Name(b"PDF".to_vec())] },
        );

        assert_eq!(page_size(&doc, 1).unwrap(), Size::new(300.0, 400.0));
        assert!(effective_resources(&doc, id).has(b"ProcSet"));
    }
}
