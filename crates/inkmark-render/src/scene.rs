//! Recorded overlay frames.

use inkmark_core::color::Rgba8;
use kurbo::{Affine, BezPath, Point, Rect, Size};

/// One drawing operation, in document units.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba8,
        width: f64,
        /// Dash pattern (on, off), solid when `None`.
        dash: Option<[f64; 2]>,
    },
    /// Open polyline with round joins and caps.
    Polyline {
        points: Vec<Point>,
        color: Rgba8,
        width: f64,
    },
    /// Text filled from its baseline origin.
    Text {
        origin: Point,
        size: f64,
        color: Rgba8,
        text: String,
    },
}

impl PaintCommand {
    /// Path for polyline commands.
    pub fn polyline_path(points: &[Point]) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = points.split_first() else {
            return path;
        };
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
        path
    }
}

/// Display list for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayScene {
    transform: Affine,
    commands: Vec<PaintCommand>,
}

impl Default for OverlayScene {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            commands: Vec::new(),
        }
    }
}

impl OverlayScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all commands and the transform.
    pub fn reset(&mut self) {
        self.transform = Affine::IDENTITY;
        self.commands.clear();
    }

    /// Document-to-device transform applied to every command.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    pub fn push(&mut self, command: PaintCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The transient drawing surface laid over the page.
///
/// A surface has a fixed size; a new one is created whenever the displayed
/// page size changes. `generation` counts how many surfaces have existed.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySurface {
    pub size: Size,
    pub scene: OverlayScene,
    pub generation: u64,
}

impl OverlaySurface {
    pub fn new(size: Size, generation: u64) -> Self {
        Self {
            size,
            scene: OverlayScene::new(),
            generation,
        }
    }
}
