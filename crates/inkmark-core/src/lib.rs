//! Inkmark Core Library
//!
//! Annotation model, drawing state machine, eraser hit-testing and export
//! composer for marking up document pages.

pub mod annotations;
pub mod color;
pub mod config;
pub mod document;
pub mod editor;
pub mod eraser;
pub mod export;
pub mod geometry;
pub mod input;
pub mod snapshot;
pub mod storage;
pub mod text_capture;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use annotations::{Annotation, AnnotationId, Freehand, Markup, PageNumber, Region, RegionKind, TextMark};
pub use color::{Rgba8, RgbF};
pub use config::{ConfigError, EditorConfig, ToolPreset};
pub use document::{AnnotationDocument, ModelError};
pub use editor::{AnnotationEditor, PersistError};
pub use export::{compose, DrawInstruction, PageHeights, PageInstructions};
pub use geometry::Rotation;
pub use input::{InputState, PointerEvent, TextKey};
pub use snapshot::{ExportSnapshot, LoadReport, SnapshotError};
pub use storage::{SnapshotStorage, StorageError, DEFAULT_SNAPSHOT_KEY};
pub use text_capture::TextCapture;
pub use tools::{ToolKind, ToolManager};
