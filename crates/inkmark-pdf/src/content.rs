//! Content stream operators for draw instructions.

use inkmark_core::color::RgbF;
use inkmark_core::export::DrawInstruction;
use kurbo::Rect;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// Resource name of the shared text font.
pub(crate) const FONT_RESOURCE: &str = "InkF1";

/// Operators for one page plus the resources they reference.
#[derive(Debug, Default)]
pub(crate) struct PageContent {
    pub operations: Vec<Operation>,
    /// Distinct opacities needing an ExtGState, with their resource names.
    pub opacities: Vec<(String, f32)>,
    pub uses_font: bool,
}

impl PageContent {
    pub fn build(instructions: &[DrawInstruction]) -> Self {
        let mut content = Self::default();
        for instruction in instructions {
            content.push(instruction);
        }
        content
    }

    fn push(&mut self, instruction: &DrawInstruction) {
        match instruction {
            DrawInstruction::FillRect {
                rect,
                color,
                opacity,
            } => {
                self.op("q", vec![]);
                self.opacity(*opacity);
                self.op("rg", rgb(*color));
                self.rect(*rect);
                self.op("f", vec![]);
                self.op("Q", vec![]);
            }
            DrawInstruction::StrokeRect {
                rect,
                color,
                width,
                opacity,
            } => {
                self.op("q", vec![]);
                self.opacity(*opacity);
                self.op("RG", rgb(*color));
                self.op("w", vec![real(*width)]);
                self.rect(*rect);
                self.op("S", vec![]);
                self.op("Q", vec![]);
            }
            DrawInstruction::Line {
                from,
                to,
                thickness,
                color,
            } => {
                self.op("q", vec![]);
                self.op("RG", rgb(*color));
                self.op("w", vec![real(*thickness)]);
                self.op("m", vec![real(from.x), real(from.y)]);
                self.op("l", vec![real(to.x), real(to.y)]);
                self.op("S", vec![]);
                self.op("Q", vec![]);
            }
            DrawInstruction::Text {
                x,
                y,
                size,
                color,
                text,
            } => {
                self.uses_font = true;
                self.op("BT", vec![]);
                self.op(
                    "Tf",
                    vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), real(*size)],
                );
                self.op("rg", rgb(*color));
                self.op("Td", vec![real(*x), real(*y)]);
                self.op(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                );
                self.op("ET", vec![]);
            }
        }
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn rect(&mut self, rect: Rect) {
        self.op(
            "re",
            vec![
                real(rect.x0),
                real(rect.y0),
                real(rect.width()),
                real(rect.height()),
            ],
        );
    }

    /// Select an ExtGState for `opacity`; fully opaque needs none.
    fn opacity(&mut self, opacity: f32) {
        if opacity >= 1.0 {
            return;
        }
        let name = match self.opacities.iter().find(|(_, o)| *o == opacity) {
            Some((name, _)) => name.clone(),
            None => {
                let name = format!("InkGS{}", self.opacities.len());
                self.opacities.push((name.clone(), opacity));
                name
            }
        };
        self.op("gs", vec![Object::Name(name.into_bytes())]);
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn rgb(color: RgbF) -> Vec<Object> {
    vec![
        Object::Real(color.r as _),
        Object::Real(color.g as _),
        Object::Real(color.b as _),
    ]
}

/// Encode for the standard Helvetica font. Characters outside Latin-1
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn operators(content: &PageContent) -> Vec<&str> {
        content.operations.iter().map(|o| o.operator.as_str()).collect()
    }

    #[test]
    fn test_fill_rect_uses_gs() {
        let content = PageContent::build(&[DrawInstruction::FillRect {
            rect: Rect::new(10.0, 20.0, 110.0, 70.0),
            color: RgbF::new(1.0, 1.0, 0.4),
            opacity: 0.4,
        }]);
        assert_eq!(operators(&content), vec!["q", "gs", "rg", "re", "f", "Q"]);
        assert_eq!(content.opacities, vec![("InkGS0".to_string(), 0.4)]);
        let re = &content.operations[3];
        assert_eq!(re.operands[2].as_float().unwrap(), 100.0);
        assert_eq!(re.operands[3].as_float().unwrap(), 50.0);
    }

    #[test]
    fn test_opaque_stroke_has_no_gs() {
        let content = PageContent::build(&[DrawInstruction::StrokeRect {
            rect: Rect::new(0.0, 0.0, 5.0, 5.0),
            color: RgbF::BLACK,
            width: 2.0,
            opacity: 1.0,
        }]);
        assert_eq!(operators(&content), vec!["q", "RG", "w", "re", "S", "Q"]);
        assert!(content.opacities.is_empty());
    }

    #[test]
    fn test_shared_opacity_state() {
        let fill = DrawInstruction::FillRect {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            color: RgbF::BLACK,
            opacity: 0.4,
        };
        let content = PageContent::build(&[fill.clone(), fill]);
        assert_eq!(content.opacities.len(), 1);
    }

    #[test]
    fn test_text_and_line() {
        let content = PageContent::build(&[
            DrawInstruction::Text {
                x: 10.0,
                y: 780.0,
                size: 16.0,
                color: RgbF::BLACK,
                text: "Café ✓".to_string(),
            },
            DrawInstruction::Line {
                from: Point::new(0.0, 800.0),
                to: Point::new(10.0, 790.0),
                thickness: 2.0,
                color: RgbF::new(1.0, 0.0, 0.0),
            },
        ]);
        assert!(content.uses_font);
        assert_eq!(
            operators(&content),
            vec!["BT", "Tf", "rg", "Td", "Tj", "ET", "q", "RG", "w", "m", "l", "S", "Q"]
        );
        assert_eq!(
            content.operations[4].operands[0].as_str().unwrap(),
            &[b'C', b'a', b'f', 0xE9, b' ', b'?'][..]
        );
    }
}
