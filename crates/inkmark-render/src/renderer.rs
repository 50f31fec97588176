//! Renderer trait and the display-list overlay renderer.

use crate::scene::{OverlayScene, OverlaySurface, PaintCommand};
use inkmark_core::annotations::{Annotation, PageNumber, RegionKind};
use inkmark_core::color::{paint_color, Rgba8};
use inkmark_core::config::EditorConfig;
use inkmark_core::document::AnnotationDocument;
use inkmark_core::editor::AnnotationEditor;
use inkmark_core::geometry::view_transform;
use kurbo::Size;

/// Overlay appearance that is not stored on annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Dash pattern of the eraser preview, document units.
    pub eraser_dash: [f64; 2],
    /// Outline color of the eraser preview.
    pub eraser_color: Rgba8,
    /// Outline width of the eraser preview.
    pub eraser_width: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl OverlayStyle {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            eraser_dash: config.eraser_dash,
            eraser_color: paint_color(&config.eraser_preview_color),
            eraser_width: config.eraser.stroke_width,
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Committed annotations, if a document is loaded.
    pub document: Option<&'a AnnotationDocument>,
    /// Page being displayed.
    pub page: PageNumber,
    /// Zoom factor.
    pub scale: f64,
    /// In-progress annotation, painted last.
    pub preview: Option<&'a Annotation>,
    /// Device size of the page surface.
    pub surface_size: Size,
    pub style: OverlayStyle,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(document: Option<&'a AnnotationDocument>, page: PageNumber, scale: f64, surface_size: Size) -> Self {
        Self {
            document,
            page,
            scale,
            preview: None,
            surface_size,
            style: OverlayStyle::default(),
        }
    }

    /// Context for the editor's current page.
    pub fn from_editor(editor: &'a AnnotationEditor, surface_size: Size) -> Self {
        Self {
            document: editor.document(),
            page: editor.page(),
            scale: editor.scale(),
            preview: editor.preview(),
            surface_size,
            style: OverlayStyle::from_config(editor.config()),
        }
    }

    /// Set the in-progress annotation.
    pub fn with_preview(mut self, preview: Option<&'a Annotation>) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene for a frame.
    ///
    /// Called once per frame; every call repaints the whole overlay.
    fn build_scene(&mut self, ctx: &RenderContext);
}

/// Renderer that records frames into an [`OverlayScene`].
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    surface: Option<OverlaySurface>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current surface, once a frame was built.
    pub fn surface(&self) -> Option<&OverlaySurface> {
        self.surface.as_ref()
    }

    /// The last built frame.
    pub fn scene(&self) -> Option<&OverlayScene> {
        self.surface.as_ref().map(|s| &s.scene)
    }

    fn surface_for(&mut self, size: Size) -> &mut OverlaySurface {
        let generation = match &self.surface {
            Some(surface) if surface.size == size => None,
            Some(surface) => Some(surface.generation + 1),
            None => Some(0),
        };
        if let Some(generation) = generation {
            log::debug!("Overlay surface {}x{} (generation {})", size.width, size.height, generation);
            self.surface = Some(OverlaySurface::new(size, generation));
        }
        self.surface.get_or_insert_with(|| OverlaySurface::new(size, 0))
    }
}

impl Renderer for OverlayRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let scene = &mut self.surface_for(ctx.surface_size).scene;
        scene.reset();
        scene.set_transform(view_transform(ctx.scale));

        if let Some(document) = ctx.document {
            for annotation in document.for_page(ctx.page) {
                paint_annotation(scene, annotation, &ctx.style);
            }
        }
        if let Some(preview) = ctx.preview {
            paint_annotation(scene, preview, &ctx.style);
        }
    }
}

/// Record the commands for one annotation.
pub(crate) fn paint_annotation(scene: &mut OverlayScene, annotation: &Annotation, style: &OverlayStyle) {
    match annotation {
        Annotation::Freehand(freehand) => {
            if !freehand.is_paintable() {
                return;
            }
            scene.push(PaintCommand::Polyline {
                points: freehand.points.clone(),
                color: paint_color(&freehand.color),
                width: freehand.stroke_width,
            });
        }
        Annotation::Region(region) => {
            let rect = annotation.bounds();
            let command = match region.kind {
                RegionKind::Highlight => PaintCommand::FillRect {
                    rect,
                    color: paint_color(&region.color),
                },
                RegionKind::Rectangle => PaintCommand::StrokeRect {
                    rect,
                    color: paint_color(&region.color),
                    width: region.stroke_width,
                    dash: None,
                },
                RegionKind::EraserStroke => PaintCommand::StrokeRect {
                    rect,
                    color: style.eraser_color,
                    width: style.eraser_width,
                    dash: Some(style.eraser_dash),
                },
            };
            scene.push(command);
        }
        Annotation::Text(text) => scene.push(PaintCommand::Text {
            origin: text.anchor(),
            size: text.font_size,
            color: paint_color(&text.color),
            text: text.text.clone(),
        }),
    }
}
