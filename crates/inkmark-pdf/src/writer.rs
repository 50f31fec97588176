//! Baking draw instructions into PDF pages.

use crate::content::{PageContent, FONT_RESOURCE};
use crate::pages;
use inkmark_core::annotations::PageNumber;
use inkmark_core::export::pipeline::{DocumentWriter, WritableDocument, WriterError, WriterResult};
use inkmark_core::export::PageInstructions;
use inkmark_core::storage::BoxFuture;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Opens PDF bytes with `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentWriter for PdfWriter {
    fn open(&self, bytes: Vec<u8>) -> BoxFuture<'_, WriterResult<Box<dyn WritableDocument>>> {
        Box::pin(async move {
            let doc = Document::load_mem(&bytes).map_err(|e| WriterError::Open(e.to_string()))?;
            Ok(Box::new(PdfDocument::new(doc)) as Box<dyn WritableDocument>)
        })
    }
}

/// A PDF being annotated.
///
/// Existing page content is wrapped in `q`/`Q` so whatever graphics state
/// it leaves behind cannot leak into the appended annotations.
pub struct PdfDocument {
    doc: Document,
    font: Option<ObjectId>,
}

impl PdfDocument {
    pub fn new(doc: Document) -> Self {
        Self { doc, font: None }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Copy of the sub-dictionary `key` of `resources`, resolving references.
    fn sub_dictionary(&self, resources: &Dictionary, key: &[u8]) -> Dictionary {
        resources
            .get(key)
            .ok()
            .map(|o| pages::resolve(&self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new)
    }

    /// Current `/Contents` of a page as a flat list of stream references.
    ///
    /// `/Contents` may name an array indirectly; its entries are spliced in so
    /// the result never nests arrays.
    fn existing_contents(&self, page_id: ObjectId) -> Vec<Object> {
        match self.doc.get_dictionary(page_id).and_then(|d| d.get(b"Contents")) {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn add_stream(&mut self, bytes: Vec<u8>) -> ObjectId {
        self.doc.add_object(Stream::new(Dictionary::new(), bytes))
    }
}

impl WritableDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn page_height(&self, page: PageNumber) -> Option<f64> {
        pages::media_box(&self.doc, page).ok().map(|rect| rect.height())
    }

    fn embed_font(&mut self) -> WriterResult<()> {
        if self.font.is_some() {
            return Ok(());
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        log::debug!("Embedded Helvetica as {:?}", id);
        self.font = Some(id);
        Ok(())
    }

    fn apply(&mut self, instructions: &PageInstructions) -> WriterResult<()> {
        let page = instructions.page;
        let page_id = pages::page_id(&self.doc, page).map_err(|_| WriterError::MissingPage(page))?;
        let content = PageContent::build(&instructions.instructions);
        if content.operations.is_empty() {
            return Ok(());
        }

        let mut resources = pages::effective_resources(&self.doc, page_id);
        if content.uses_font {
            let font = self
                .font
                .ok_or_else(|| WriterError::Font("text drawn before the font was embedded".into()))?;
            let mut fonts = self.sub_dictionary(&resources, b"Font");
            fonts.set(FONT_RESOURCE, Object::Reference(font));
            resources.set("Font", Object::Dictionary(fonts));
        }
        if !content.opacities.is_empty() {
            let mut states = self.sub_dictionary(&resources, b"ExtGState");
            for (name, opacity) in &content.opacities {
                states.set(
                    name.as_str(),
                    Object::Dictionary(dictionary! {
                        "Type" => "ExtGState",
                        "ca" => Object::Real(*opacity),
                        "CA" => Object::Real(*opacity),
                    }),
                );
            }
            resources.set("ExtGState", Object::Dictionary(states));
        }

        let encoded = Content {
            operations: content.operations,
        }
        .encode()
        .map_err(|e| WriterError::Page {
            page,
            message: e.to_string(),
        })?;

        let existing = self.existing_contents(page_id);
        let contents = if existing.is_empty() {
            vec![Object::Reference(self.add_stream(encoded))]
        } else {
            let save = self.add_stream(b"q\n".to_vec());
            let mut ours = b"\nQ\n".to_vec();
            ours.extend(encoded);
            let ours = self.add_stream(ours);
            let mut contents = Vec::with_capacity(existing.len() + 2);
            contents.push(Object::Reference(save));
            contents.extend(existing);
            contents.push(Object::Reference(ours));
            contents
        };

        let dict = self.doc.get_dictionary_mut(page_id).map_err(|e| WriterError::Page {
            page,
            message: e.to_string(),
        })?;
        dict.set("Resources", Object::Dictionary(resources));
        dict.set("Contents", Object::Array(contents));
        log::debug!("Wrote {} instructions to page {}", instructions.instructions.len(), page);
        Ok(())
    }

    fn save(&mut self) -> BoxFuture<'_, WriterResult<Vec<u8>>> {
        Box::pin(async move {
            let mut buffer = Vec::new();
            self.doc
                .save_to(&mut buffer)
                .map_err(|e| WriterError::Save(e.to_string()))?;
            Ok(buffer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PdfSource;
    use crate::test_pdf::create_test_pdf;
    use inkmark_core::color::RgbF;
    use inkmark_core::editor::AnnotationEditor;
    use inkmark_core::export::DrawInstruction;
    use inkmark_core::tools::ToolKind;
    use kurbo::{Point, Rect};

    fn open(sizes: &[(i64, i64)]) -> Box<dyn WritableDocument> {
        pollster::block_on(PdfWriter::new().open(create_test_pdf(sizes))).unwrap()
    }

    fn page_stream_text(doc: &Document, page: PageNumber) -> String {
        let id = pages::page_id(doc, page).unwrap();
        String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned()
    }

    #[test]
    fn test_open_rejects_garbage() {
        let result = pollster::block_on(PdfWriter::new().open(b"%PDF-garbage".to_vec()));
        assert!(matches!(result, Err(WriterError::Open(_))));
    }

    #[test]
    fn test_page_height() {
        let doc = open(&[(612, 792), (842, 595)]);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_height(2), Some(595.0));
        assert_eq!(doc.page_height(3), None);
    }

    #[test]
    fn test_text_requires_font() {
        let mut doc = open(&[(612, 792)]);
        let page = PageInstructions {
            page: 1,
            instructions: vec![DrawInstruction::Text {
                x: 10.0,
                y: 780.0,
                size: 16.0,
                color: RgbF::BLACK,
                text: "Hi".into(),
            }],
        };
        assert!(matches!(doc.apply(&page), Err(WriterError::Font(_))));
        doc.embed_font().unwrap();
        doc.apply(&page).unwrap();
    }

    #[test]
    fn test_missing_page() {
        let mut doc = open(&[(612, 792)]);
        let page = PageInstructions {
            page: 4,
            instructions: vec![DrawInstruction::FillRect {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: RgbF::BLACK,
                opacity: 0.4,
            }],
        };
        assert!(matches!(doc.apply(&page), Err(WriterError::MissingPage(4))));
    }

    #[test]
    fn test_existing_content_is_wrapped() {
        let mut source = Document::load_mem(&create_test_pdf(&[(200, 200)])).unwrap();
        let page_id = pages::page_id(&source, 1).unwrap();
        let original = source.add_object(Stream::new(Dictionary::new(), b"2 0 0 2 0 0 cm".to_vec()));
        source
            .get_dictionary_mut(page_id)
            .unwrap()
            .set("Contents", Object::Reference(original));

        let mut doc = PdfDocument::new(source);
        doc.apply(&PageInstructions {
            page: 1,
            instructions: vec![DrawInstruction::StrokeRect {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                color: RgbF::BLACK,
                width: 2.0,
                opacity: 1.0,
            }],
        })
        .unwrap();

        let contents = doc
            .document()
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].as_reference().unwrap(), original);

        let text = page_stream_text(doc.document(), 1);
        let q = text.find("q\n").unwrap();
        let cm = text.find("cm").unwrap();
        let restore = text.find("Q\n").unwrap();
        assert!(q < cm && cm < restore);
        assert!(text.contains(" re\n"));
    }

    #[test]
    fn test_indirect_contents_array_is_spliced() {
        let mut source = Document::load_mem(&create_test_pdf(&[(200, 200)])).unwrap();
        let page_id = pages::page_id(&source, 1).unwrap();
        let first = source.add_object(Stream::new(Dictionary::new(), b"1 0 0 1 5 5 cm".to_vec()));
        let second = source.add_object(Stream::new(Dictionary::new(), b"0 0 1 rg".to_vec()));
        let array = source.add_object(Object::Array(vec![Object::Reference(first), Object::Reference(second)]));
        source
            .get_dictionary_mut(page_id)
            .unwrap()
            .set("Contents", Object::Reference(array));

        let mut doc = PdfDocument::new(source);
        doc.apply(&PageInstructions {
            page: 1,
            instructions: vec![DrawInstruction::FillRect {
                rect: Rect::new(0.0, 0.0, 5.0, 5.0),
                color: RgbF::BLACK,
                opacity: 0.5,
            }],
        })
        .unwrap();

        let contents = doc
            .document()
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(contents.len(), 4);
        assert!(contents.iter().all(|o| o.as_reference().is_ok()));
        assert_eq!(contents[1].as_reference().unwrap(), first);
        assert_eq!(contents[2].as_reference().unwrap(), second);

        let text = page_stream_text(doc.document(), 1);
        assert!(text.contains("cm"));
        assert!(text.contains("rg"));
        assert!(text.contains(" re"));
    }

    #[test]
    fn test_export_round_trip() {
        let source = PdfSource::from_bytes(create_test_pdf(&[(612, 792), (612, 792)])).unwrap();
        let mut editor = AnnotationEditor::default();
        editor.open_source("report.pdf", &source);

        editor.set_tool(ToolKind::Highlight);
        editor.pointer_down(Point::new(10.0, 20.0));
        editor.pointer_move(Point::new(110.0, 40.0));
        editor.pointer_up();

        editor.set_tool(ToolKind::Text);
        editor.pointer_down(Point::new(50.0, 100.0));
        editor.type_text("Note");
        editor.blur_capture();

        editor.next_page();
        editor.pointer_down(Point::new(50.0, 100.0));
        editor.type_text("Second");
        editor.blur_capture();

        let artifact = pollster::block_on(editor.export(&source, &PdfWriter::new())).unwrap();
        assert_eq!(artifact.file_name, "report_annotated.pdf");

        let exported = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(exported.get_pages().len(), 2);

        let fonts = exported
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .filter(|d| d.get(b"BaseFont").and_then(Object::as_name).ok() == Some(&b"Helvetica"[..]))
            .count();
        assert_eq!(fonts, 1);

        let first = page_stream_text(&exported, 1);
        assert!(first.contains("(Note) Tj"));
        assert!(first.contains(" re"));
        assert!(page_stream_text(&exported, 2).contains("(Second) Tj"));

        // The source is untouched so a second export starts clean.
        let again = pollster::block_on(editor.export(&source, &PdfWriter::new())).unwrap();
        let exported = Document::load_mem(&again.bytes).unwrap();
        assert_eq!(page_stream_text(&exported, 1).matches("(Note) Tj").count(), 1);
    }
}
