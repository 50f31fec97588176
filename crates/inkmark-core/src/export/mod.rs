//! Export composer: turns annotations into page-space draw instructions.
//!
//! Page space has a bottom-left origin, so every y coordinate is flipped
//! against the height of its page. The composer is pure; writing the
//! instructions into a document is the job of a [`DocumentWriter`].

pub mod pipeline;

pub use pipeline::{
    annotated_file_name, ArtifactSink, DocumentWriter, ExportArtifact, ExportError, PageSource,
    SourceError, SourceLoader, WritableDocument, WriterError, WriterResult,
};

use crate::annotations::{Annotation, PageNumber, RegionKind};
use crate::color::{normalized_rgb, RgbF};
use crate::config::EditorConfig;
use crate::geometry::flip_y;
use kurbo::{Point, Rect};
use std::collections::BTreeMap;

/// One primitive for the document writer, in page space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    /// Filled rectangle; `rect.y0` is the bottom edge.
    FillRect { rect: Rect, color: RgbF, opacity: f32 },
    /// Outlined rectangle.
    StrokeRect {
        rect: Rect,
        color: RgbF,
        width: f64,
        opacity: f32,
    },
    /// Text drawn from its baseline origin with the shared document font.
    Text {
        x: f64,
        y: f64,
        size: f64,
        color: RgbF,
        text: String,
    },
    Line {
        from: Point,
        to: Point,
        thickness: f64,
        color: RgbF,
    },
}

/// Instructions for a single page, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInstructions {
    pub page: PageNumber,
    pub instructions: Vec<DrawInstruction>,
}

impl PageInstructions {
    /// Whether any instruction needs the text font.
    pub fn has_text(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, DrawInstruction::Text { .. }))
    }
}

/// Page height lookup in document units.
pub trait PageHeights {
    /// Height of `page`, or `None` when the page does not exist.
    fn page_height(&self, page: PageNumber) -> Option<f64>;
}

impl<F> PageHeights for F
where
    F: Fn(PageNumber) -> Option<f64>,
{
    fn page_height(&self, page: PageNumber) -> Option<f64> {
        self(page)
    }
}

/// Heights indexed by `page - 1`.
impl PageHeights for [f64] {
    fn page_height(&self, page: PageNumber) -> Option<f64> {
        let index = (page as usize).checked_sub(1)?;
        self.get(index).copied()
    }
}

/// Compose draw instructions for every annotation whose page has a height.
///
/// Output is ordered by page; within a page, collection order is kept.
pub fn compose<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
    heights: &(impl PageHeights + ?Sized),
    config: &EditorConfig,
) -> Vec<PageInstructions> {
    let mut pages: BTreeMap<PageNumber, Vec<DrawInstruction>> = BTreeMap::new();

    for annotation in annotations {
        let page = annotation.page();
        let Some(height) = heights.page_height(page) else {
            log::warn!("Skipping annotation {} on missing page {}", annotation.id(), page);
            continue;
        };
        let out = pages.entry(page).or_default();
        compose_one(annotation, height, config, out);
    }

    pages
        .into_iter()
        .filter(|(_, instructions)| !instructions.is_empty())
        .map(|(page, instructions)| PageInstructions { page, instructions })
        .collect()
}

fn compose_one(
    annotation: &Annotation,
    height: f64,
    config: &EditorConfig,
    out: &mut Vec<DrawInstruction>,
) {
    match annotation {
        Annotation::Region(region) => {
            let rect = flip_rect(annotation.bounds(), height);
            match region.kind {
                RegionKind::Highlight => out.push(DrawInstruction::FillRect {
                    rect,
                    color: config.highlight_export_color,
                    opacity: config.highlight_export_opacity,
                }),
                RegionKind::Rectangle => out.push(DrawInstruction::StrokeRect {
                    rect,
                    color: normalized_rgb(Some(&region.color)),
                    width: region.stroke_width,
                    opacity: 1.0,
                }),
                RegionKind::EraserStroke => {}
            }
        }
        Annotation::Text(text) => out.push(DrawInstruction::Text {
            x: text.x,
            y: flip_y(text.y, height),
            size: text.font_size,
            color: normalized_rgb(Some(&text.color)),
            text: text.text.clone(),
        }),
        Annotation::Freehand(freehand) => {
            let color = normalized_rgb(Some(&freehand.color));
            let flip = |p: Point| Point::new(p.x, flip_y(p.y, height));
            out.extend(freehand.segments().map(|(from, to)| DrawInstruction::Line {
                from: flip(from),
                to: flip(to),
                thickness: freehand.stroke_width,
                color,
            }));
        }
    }
}

/// Flip a top-left-origin rectangle into page space.
fn flip_rect(rect: Rect, height: f64) -> Rect {
    let bottom = flip_y(rect.y1, height);
    Rect::new(rect.x0, bottom, rect.x1, bottom + rect.height().abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Freehand, Region, TextMark};

    const HEIGHTS: [f64; 2] = [800.0, 600.0];

    fn compose_all(annotations: &[Annotation]) -> Vec<PageInstructions> {
        compose(annotations, &HEIGHTS[..], &EditorConfig::default())
    }

    #[test]
    fn test_text_flipped() {
        let text: Annotation = TextMark::new(1, Point::new(10.0, 20.0), "A", 16.0, "#000000").into();
        let pages = compose_all(&[text]);
        assert_eq!(
            pages[0].instructions,
            vec![DrawInstruction::Text {
                x: 10.0,
                y: 780.0,
                size: 16.0,
                color: RgbF::BLACK,
                text: "A".to_string(),
            }]
        );
        assert!(pages[0].has_text());
    }

    #[test]
    fn test_highlight_uses_export_color() {
        let highlight: Annotation = Region::from_corners(
            RegionKind::Highlight,
            1,
            "#ff00ff",
            20.0,
            Point::new(100.0, 60.0),
            Point::new(10.0, 20.0),
        )
        .into();
        let pages = compose_all(&[highlight]);
        assert_eq!(
            pages[0].instructions,
            vec![DrawInstruction::FillRect {
                rect: Rect::new(10.0, 740.0, 100.0, 780.0),
                color: RgbF::new(1.0, 1.0, 0.4),
                opacity: 0.4,
            }]
        );
    }

    #[test]
    fn test_rectangle_stroke() {
        let rect: Annotation = Region::from_corners(
            RegionKind::Rectangle,
            2,
            "#ff0000",
            3.0,
            Point::new(0.0, 0.0),
            Point::new(50.0, 100.0),
        )
        .into();
        let pages = compose_all(&[rect]);
        assert_eq!(pages[0].page, 2);
        assert_eq!(
            pages[0].instructions,
            vec![DrawInstruction::StrokeRect {
                rect: Rect::new(0.0, 500.0, 50.0, 600.0),
                color: RgbF::new(1.0, 0.0, 0.0),
                width: 3.0,
                opacity: 1.0,
            }]
        );
        assert!(!pages[0].has_text());
    }

    #[test]
    fn test_freehand_segments() {
        let stroke: Annotation = Freehand::from_points(
            1,
            "not-a-color",
            2.0,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)],
        )
        .into();
        let pages = compose_all(&[stroke]);
        assert_eq!(pages[0].instructions.len(), 2);
        assert_eq!(
            pages[0].instructions[0],
            DrawInstruction::Line {
                from: Point::new(0.0, 800.0),
                to: Point::new(10.0, 790.0),
                thickness: 2.0,
                color: RgbF::BLACK,
            }
        );
    }

    #[test]
    fn test_ordered_by_page_then_collection() {
        let annotations: Vec<Annotation> = vec![
            TextMark::new(2, Point::new(1.0, 1.0), "b", 12.0, "#000").into(),
            TextMark::new(1, Point::new(1.0, 1.0), "a1", 12.0, "#000").into(),
            TextMark::new(1, Point::new(2.0, 2.0), "a2", 12.0, "#000").into(),
        ];
        let pages = compose_all(&annotations);
        assert_eq!(pages.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2]);
        let texts: Vec<_> = pages[0]
            .instructions
            .iter()
            .filter_map(|i| match i {
                DrawInstruction::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["a1", "a2"]);
    }

    #[test]
    fn test_missing_page_skipped() {
        let text: Annotation = TextMark::new(5, Point::ZERO, "gone", 12.0, "#000").into();
        assert!(compose_all(&[text]).is_empty());
    }

    #[test]
    fn test_closure_heights() {
        let text: Annotation = TextMark::new(3, Point::new(0.0, 10.0), "x", 12.0, "#000").into();
        let pages = compose([&text], &|_page: PageNumber| Some(100.0), &EditorConfig::default());
        assert!(matches!(pages[0].instructions[0], DrawInstruction::Text { y, .. } if (y - 90.0).abs() < 1e-9));
    }
}
