//! Drawing tools and the pointer-driven draw session.

use crate::annotations::{Annotation, Freehand, PageNumber, Region, RegionKind};
use crate::config::{EditorConfig, ToolPreset};
use crate::geometry::normalized_rect;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// No tool: pointer input is ignored.
    #[default]
    None,
    Highlight,
    Pencil,
    Text,
    Rectangle,
    Eraser,
}

impl ToolKind {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::None => "None",
            ToolKind::Highlight => "Highlight",
            ToolKind::Pencil => "Pencil",
            ToolKind::Text => "Text",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Eraser => "Eraser",
        }
    }

    /// Tools offered by the toolbar, in order.
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Highlight,
            ToolKind::Pencil,
            ToolKind::Text,
            ToolKind::Rectangle,
            ToolKind::Eraser,
        ]
    }

    /// Region kind drawn by this tool, if it is a two-corner tool.
    pub fn region_kind(&self) -> Option<RegionKind> {
        match self {
            ToolKind::Highlight => Some(RegionKind::Highlight),
            ToolKind::Rectangle => Some(RegionKind::Rectangle),
            ToolKind::Eraser => Some(RegionKind::EraserStroke),
            _ => None,
        }
    }

    /// Preset used for new annotations of this tool.
    pub fn preset<'a>(&self, config: &'a EditorConfig) -> Option<&'a ToolPreset> {
        match self {
            ToolKind::Pencil => Some(&config.pencil),
            ToolKind::Highlight => Some(&config.highlight),
            ToolKind::Rectangle => Some(&config.rectangle),
            ToolKind::Eraser => Some(&config.eraser),
            ToolKind::None | ToolKind::Text => None,
        }
    }
}

/// A live pointer interaction that will produce at most one annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSession {
    pub tool: ToolKind,
    /// Pointer-down position in document space.
    pub start: Point,
    /// Annotation being built.
    pub in_progress: Annotation,
}

/// State of the draw session machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for pointer-down.
    #[default]
    Idle,
    /// Between pointer-down and pointer-up.
    Drawing(DrawSession),
}

/// What pointer-up produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// Nothing was drawing, or the result was degenerate.
    Discarded,
    /// Append this annotation.
    Commit(Annotation),
    /// Remove annotations on `page` intersecting `rect`.
    Erase { page: PageNumber, rect: Rect },
}

/// Manages the current tool and its draw session.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the session.
    pub state: ToolState,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, discarding any in-progress annotation.
    ///
    /// Returns true if a session was discarded.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        self.current_tool = tool;
        self.cancel()
    }

    /// Begin a session at a document-space point on `page`.
    ///
    /// Returns false when the current tool does not draw through a session
    /// (no tool, or text which uses its own capture).
    pub fn begin(&mut self, point: Point, page: PageNumber, config: &EditorConfig) -> bool {
        let Some(preset) = self.current_tool.preset(config) else {
            return false;
        };

        let in_progress = match self.current_tool {
            ToolKind::Pencil => {
                Freehand::new(page, preset.color.clone(), preset.stroke_width, point).into()
            }
            tool => {
                let Some(kind) = tool.region_kind() else {
                    return false;
                };
                Region::new(kind, page, preset.color.clone(), preset.stroke_width, point).into()
            }
        };

        log::debug!("Begin {:?} session at ({:.1}, {:.1})", self.current_tool, point.x, point.y);
        self.state = ToolState::Drawing(DrawSession {
            tool: self.current_tool,
            start: point,
            in_progress,
        });
        true
    }

    /// Feed a pointer move (document space).
    pub fn update(&mut self, point: Point) {
        let ToolState::Drawing(session) = &mut self.state else {
            return;
        };
        match &mut session.in_progress {
            Annotation::Freehand(freehand) => freehand.add_point(point),
            Annotation::Region(region) => region.set_end(point),
            Annotation::Text(_) => {}
        }
    }

    /// Finish the session.
    pub fn end(&mut self) -> SessionEnd {
        let ToolState::Drawing(session) = std::mem::take(&mut self.state) else {
            return SessionEnd::Discarded;
        };

        match session.in_progress {
            Annotation::Region(region) if region.kind == RegionKind::EraserStroke => {
                SessionEnd::Erase {
                    page: region.page,
                    rect: normalized_rect(region.start(), region.end()),
                }
            }
            Annotation::Region(region) if region.is_degenerate() => {
                log::debug!("Dropping zero-area {:?}", region.kind);
                SessionEnd::Discarded
            }
            Annotation::Freehand(freehand) if !freehand.is_paintable() => {
                log::debug!("Dropping single-point stroke");
                SessionEnd::Discarded
            }
            annotation => SessionEnd::Commit(annotation),
        }
    }

    /// Drop the in-progress annotation. Returns true if one existed.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_active();
        self.state = ToolState::Idle;
        was_drawing
    }

    /// Check if a session is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Drawing(_))
    }

    /// The in-progress annotation, for painting.
    pub fn preview(&self) -> Option<&Annotation> {
        match &self.state {
            ToolState::Drawing(session) => Some(&session.in_progress),
            ToolState::Idle => None,
        }
    }
}
