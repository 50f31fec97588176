//! Vello-based renderer implementation.

use crate::renderer::{OverlayRenderer, RenderContext, Renderer};
use crate::scene::{OverlayScene, PaintCommand};
use inkmark_core::color::Rgba8;
use kurbo::{Affine, Cap, Join, Point, Rect, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use vello::Scene;

/// Vello-backed overlay renderer.
///
/// Records each frame with an [`OverlayRenderer`] and encodes the display
/// list into a Vello scene.
pub struct VelloRenderer {
    overlay: OverlayRenderer,
    /// The Vello scene being built.
    scene: Scene,
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            overlay: OverlayRenderer::new(),
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// The recorded frame behind the current scene.
    pub fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let Self {
            overlay,
            scene,
            font_cx,
            layout_cx,
        } = self;

        overlay.build_scene(ctx);
        scene.reset();
        if let Some(recorded) = overlay.scene() {
            let mut encoder = Encoder {
                scene,
                font_cx,
                layout_cx,
            };
            encoder.encode(recorded);
        }
    }
}

struct Encoder<'a> {
    scene: &'a mut Scene,
    font_cx: &'a mut FontContext,
    layout_cx: &'a mut LayoutContext<Brush>,
}

impl Encoder<'_> {
    fn encode(&mut self, recorded: &OverlayScene) {
        let transform = recorded.transform();
        for command in recorded.commands() {
            match command {
                PaintCommand::FillRect { rect, color } => {
                    self.scene
                        .fill(Fill::NonZero, transform, Color::from(*color), None, rect);
                }
                PaintCommand::StrokeRect {
                    rect,
                    color,
                    width,
                    dash,
                } => {
                    let mut stroke = Stroke::new(*width);
                    if let Some(dash) = dash {
                        stroke = stroke.with_dashes(0.0, *dash);
                    }
                    self.scene
                        .stroke(&stroke, transform, Color::from(*color), None, rect);
                }
                PaintCommand::Polyline {
                    points,
                    color,
                    width,
                } => {
                    let stroke = Stroke::new(*width)
                        .with_caps(Cap::Round)
                        .with_join(Join::Round);
                    let path = PaintCommand::polyline_path(points);
                    self.scene
                        .stroke(&stroke, transform, Color::from(*color), None, &path);
                }
                PaintCommand::Text {
                    origin,
                    size,
                    color,
                    text,
                } => self.render_text(*origin, *size, *color, text, transform),
            }
        }
    }

    /// Render text with Parley, `origin` on the first line's baseline.
    fn render_text(&mut self, origin: Point, size: f64, color: Rgba8, text: &str, transform: Affine) {
        if text.is_empty() {
            return;
        }
        let brush = Brush::Solid(Color::from(color));

        let mut builder = self.layout_cx.ranged_builder(&mut *self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            "sans-serif".into(),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        // Parley puts y=0 at the top of the layout.
        let baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline as f64)
            .unwrap_or(size);
        let text_transform = transform * Affine::translate((origin.x, origin.y - baseline));

        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        glyph_count += 1;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        // No font available: mark where the text would be.
        if glyph_count == 0 {
            log::warn!("No glyphs for overlay text, drawing placeholder");
            let width = (text.chars().count() as f64 * size * 0.6).max(size);
            let rect = Rect::new(origin.x, origin.y - size, origin.x + width, origin.y);
            self.scene.fill(
                Fill::NonZero,
                transform,
                Color::from_rgba8(color.r, color.g, color.b, 100),
                None,
                &rect,
            );
        }
    }
}
