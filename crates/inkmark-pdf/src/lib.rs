//! Inkmark PDF Library
//!
//! `lopdf`-backed implementations of the document collaborators: reading page
//! geometry from a PDF and baking export instructions into its pages.

mod content;
mod error;
mod pages;
mod source;
mod writer;

pub use error::{PdfError, PdfResult};
pub use source::PdfSource;
pub use writer::{PdfDocument, PdfWriter};

#[cfg(test)]
pub(crate) mod test_pdf {
    use lopdf::{dictionary, Document, Object};

    /// A PDF with one empty page per entry of `sizes`.
    pub fn create_test_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = sizes
            .iter()
            .map(|&(w, h)| {
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => Object::Reference(pages_id),
                    "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
                });
                Object::Reference(page_id)
            })
            .collect();
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
