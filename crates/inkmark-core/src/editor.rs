//! Editor state: the single owner of the annotation document and the live
//! interaction state around it.

use crate::annotations::{Annotation, PageNumber};
use crate::config::EditorConfig;
use crate::document::AnnotationDocument;
use crate::eraser;
use crate::export::{
    annotated_file_name, compose, ArtifactSink, DocumentWriter, ExportArtifact, ExportError,
    PageSource, SourceLoader,
};
use crate::geometry::{displayed_page_size, to_document_space, Rotation};
use crate::input::{InputState, PointerEvent, TextKey};
use crate::snapshot::{ExportSnapshot, LoadReport, SnapshotError};
use crate::storage::{SnapshotStorage, StorageError};
use crate::text_capture::{CaptureOutcome, KeyResult, TextCapture};
use crate::tools::{SessionEnd, ToolKind, ToolManager};
use kurbo::{Point, Size};
use std::cell::Cell;
use thiserror::Error;

/// Errors from saving or restoring editor state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Clears the processing flag when an export ends, however it ends.
struct ProcessingGuard<'a>(&'a Cell<bool>);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Annotation editor for one loaded document.
#[derive(Debug)]
pub struct AnnotationEditor {
    document: Option<AnnotationDocument>,
    /// Native page sizes, when the page source reported them.
    page_sizes: Vec<Size>,
    page: PageNumber,
    scale: f64,
    rotation: Rotation,
    tools: ToolManager,
    capture: Option<TextCapture>,
    input: InputState,
    dirty: bool,
    processing: Cell<bool>,
    config: EditorConfig,
}

impl Default for AnnotationEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl AnnotationEditor {
    /// Create an editor. Invalid zoom settings fall back to the defaults.
    pub fn new(mut config: EditorConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("{}, using default zoom settings", e);
            let defaults = EditorConfig::default();
            config.min_scale = defaults.min_scale;
            config.max_scale = defaults.max_scale;
            config.scale_step = defaults.scale_step;
        }
        Self {
            document: None,
            page_sizes: Vec::new(),
            page: 1,
            scale: 1.0,
            rotation: Rotation::None,
            tools: ToolManager::new(),
            capture: None,
            input: InputState::new(),
            dirty: false,
            processing: Cell::new(false),
            config,
        }
    }

    // --- Document lifecycle ---

    /// Start annotating a new document. Discards all existing state.
    pub fn open_document(&mut self, name: impl Into<String>, page_count: u32) {
        let name = name.into();
        log::info!("Opened {} ({} pages)", name, page_count);
        self.reset_interaction();
        self.document = Some(AnnotationDocument::new(name, page_count));
        self.page_sizes.clear();
        self.page = 1;
        self.dirty = false;
    }

    /// Open a document and remember its page sizes.
    pub fn open_source(&mut self, name: impl Into<String>, source: &dyn PageSource) {
        let page_count = source.page_count();
        self.open_document(name, page_count);
        self.page_sizes = (1..=page_count)
            .map(|page| source.page_size(page).unwrap_or(Size::ZERO))
            .collect();
    }

    /// Drop the document and everything attached to it.
    pub fn close(&mut self) {
        self.reset_interaction();
        self.document = None;
        self.page_sizes.clear();
        self.page = 1;
        self.dirty = false;
    }

    fn reset_interaction(&mut self) {
        self.tools.cancel();
        self.input = InputState::new();
        self.capture = None;
    }

    pub fn document(&self) -> Option<&AnnotationDocument> {
        self.document.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether an export is running.
    pub fn is_processing(&self) -> bool {
        self.processing.get()
    }

    // --- Navigation ---

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, AnnotationDocument::page_count)
    }

    /// Go to `page`, clamped to the document. Returns true if the page changed.
    pub fn go_to_page(&mut self, page: PageNumber) -> bool {
        let count = self.page_count();
        if count == 0 {
            return false;
        }
        let target = page.clamp(1, count);
        if target == self.page {
            return false;
        }
        if self.tools.cancel() {
            log::debug!("Page change discarded in-progress annotation");
        }
        self.page = target;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.page.saturating_sub(1))
    }

    // --- View ---

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Set the zoom factor, clamped to the configured bounds.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = self.config.clamp_scale(scale);
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale + self.config.scale_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale - self.config.scale_step);
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.next();
    }

    /// Device size of the displayed page surface for a native page size.
    pub fn surface_size(&self, native: Size) -> Size {
        displayed_page_size(native, self.scale, self.rotation)
    }

    /// Native size of the current page, if the page source reported it.
    pub fn current_page_size(&self) -> Option<Size> {
        let index = (self.page as usize).checked_sub(1)?;
        self.page_sizes.get(index).copied()
    }

    /// Device size of the current page surface.
    pub fn current_surface_size(&self) -> Option<Size> {
        self.current_page_size().map(|native| self.surface_size(native))
    }

    // --- Tools ---

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Select a tool from the toolbar. Selecting the active tool turns it off.
    pub fn select_tool(&mut self, tool: ToolKind) {
        let next = if tool == self.tools.current_tool {
            ToolKind::None
        } else {
            tool
        };
        self.set_tool(next);
    }

    /// Force the active tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != ToolKind::Text {
            if let Some(capture) = self.capture.as_mut() {
                capture.discard();
            }
            self.capture = None;
        }
        if self.tools.set_tool(tool) {
            log::debug!("Tool switch discarded in-progress annotation");
        }
        log::debug!("Tool: {}", tool.display_name());
    }

    /// The in-progress annotation, painted on top of the page.
    pub fn preview(&self) -> Option<&Annotation> {
        self.tools.preview()
    }

    /// Whether a draw session is live.
    pub fn is_drawing(&self) -> bool {
        self.tools.is_active()
    }

    // --- Pointer input ---

    /// Dispatch a pointer event.
    ///
    /// Moves only draw while the button is held. A press that arrives while
    /// the button is already down (its release was lost) finishes the
    /// previous session first.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let was_pressed = self.input.handle_pointer_event(event);
        match event {
            PointerEvent::Down { position } => {
                if was_pressed {
                    log::debug!("Pointer pressed twice, finishing previous session");
                    self.pointer_up();
                }
                self.pointer_down(position);
            }
            PointerEvent::Move { position } if was_pressed => self.pointer_move(position),
            PointerEvent::Move { .. } => {}
            PointerEvent::Up | PointerEvent::Leave => self.pointer_up(),
        }
    }

    /// Pointer pressed at a device position.
    pub fn pointer_down(&mut self, device: Point) {
        if self.document.is_none() {
            return;
        }
        let point = to_document_space(device, self.scale);
        match self.tools.current_tool {
            ToolKind::None => {}
            ToolKind::Text => self.arm_capture(point, device),
            _ => {
                self.tools.begin(point, self.page, &self.config);
            }
        }
    }

    pub fn pointer_move(&mut self, device: Point) {
        if self.tools.is_active() {
            self.tools.update(to_document_space(device, self.scale));
        }
    }

    /// Pointer released or left the surface.
    pub fn pointer_up(&mut self) {
        match self.tools.end() {
            SessionEnd::Discarded => {}
            SessionEnd::Commit(annotation) => {
                self.commit(annotation);
            }
            SessionEnd::Erase { page, rect } => {
                let Some(document) = self.document.as_mut() else {
                    return;
                };
                let ids = eraser::hit_test(document, page, rect);
                let removed = document.remove_ids(&ids);
                if removed > 0 {
                    log::info!("Erased {} annotation(s) on page {}", removed, page);
                    self.dirty = true;
                }
            }
        }
    }

    fn commit(&mut self, annotation: Annotation) -> bool {
        let Some(document) = self.document.as_mut() else {
            return false;
        };
        match document.append(annotation) {
            Ok(id) => {
                log::info!("Committed annotation {}", id);
                self.dirty = true;
                true
            }
            Err(e) => {
                log::warn!("Annotation rejected: {}", e);
                false
            }
        }
    }

    // --- Text capture ---

    fn arm_capture(&mut self, point: Point, device: Point) {
        if self.capture.is_some() {
            self.blur_capture();
        }
        let font_size = self.config.base_font_size / self.scale;
        let mut capture = TextCapture::arm(
            self.page,
            point,
            device,
            font_size,
            self.config.text_color.clone(),
        );
        capture.focus();
        log::debug!("Text capture armed on page {}", self.page);
        self.capture = Some(capture);
    }

    /// The pending text capture, if any.
    pub fn capture(&self) -> Option<&TextCapture> {
        self.capture.as_ref()
    }

    /// Type into the pending capture.
    pub fn type_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.insert_str(text);
        }
    }

    /// Feed a key to the pending capture. Returns false if no capture took it.
    pub fn handle_key(&mut self, key: TextKey) -> bool {
        let Some(capture) = self.capture.as_mut() else {
            return false;
        };
        match capture.handle_key(key) {
            KeyResult::Handled => true,
            KeyResult::NotHandled => false,
            KeyResult::Finished(outcome) => {
                self.finish_capture(outcome);
                true
            }
        }
    }

    /// The capture lost focus: commit non-blank text, otherwise discard.
    pub fn blur_capture(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            let outcome = capture.blur();
            self.finish_capture(outcome);
        }
    }

    fn finish_capture(&mut self, outcome: CaptureOutcome) {
        self.capture = None;
        if let CaptureOutcome::Commit(mark) = outcome {
            self.commit(mark.into());
        }
    }

    // --- Snapshots ---

    /// Capture the current annotations.
    pub fn serialize_snapshot(&self) -> Result<ExportSnapshot, SnapshotError> {
        let document = self.document.as_ref().ok_or(SnapshotError::NoDocument)?;
        Ok(ExportSnapshot::new(document.name(), document.to_vec()))
    }

    /// Replace the annotations with a snapshot's, dropping entries that do
    /// not fit the loaded document.
    pub fn load_snapshot(&mut self, snapshot: ExportSnapshot) -> Result<LoadReport, SnapshotError> {
        let document = self.document.as_mut().ok_or(SnapshotError::NoDocument)?;
        if snapshot.document_name != document.name() {
            log::warn!(
                "Loading annotations saved for {} into {}",
                snapshot.document_name,
                document.name()
            );
        }
        let total = snapshot.annotations.len();
        let dropped = document.replace_all(snapshot.annotations);
        self.tools.cancel();
        self.capture = None;
        self.dirty = false;

        let report = LoadReport {
            kept: total - dropped,
            dropped,
        };
        log::info!("Loaded {} annotation(s), dropped {}", report.kept, report.dropped);
        Ok(report)
    }

    /// Persist the current annotations under `key`.
    pub async fn save(&mut self, storage: &dyn SnapshotStorage, key: &str) -> Result<(), PersistError> {
        let snapshot = self.serialize_snapshot()?;
        storage.save(key, &snapshot).await?;
        self.dirty = false;
        log::info!("Saved {} annotation(s) to {}", snapshot.annotations.len(), key);
        Ok(())
    }

    /// Load annotations previously saved under `key`.
    pub async fn restore(
        &mut self,
        storage: &dyn SnapshotStorage,
        key: &str,
    ) -> Result<LoadReport, PersistError> {
        if self.document.is_none() {
            return Err(SnapshotError::NoDocument.into());
        }
        let snapshot = storage.load(key).await?;
        Ok(self.load_snapshot(snapshot)?)
    }

    // --- Export ---

    /// Bake the annotations into a copy of the source document.
    ///
    /// Only one export runs at a time; the annotations are left untouched
    /// whatever the outcome.
    pub async fn export(
        &self,
        loader: &dyn SourceLoader,
        writer: &dyn DocumentWriter,
    ) -> Result<ExportArtifact, ExportError> {
        if self.processing.get() {
            return Err(ExportError::Busy);
        }
        let document = self.document.as_ref().ok_or(ExportError::NoDocument)?;
        self.processing.set(true);
        let _guard = ProcessingGuard(&self.processing);

        let source = loader.load_source().await?;
        let mut target = writer.open(source).await?;
        if target.page_count() != document.page_count() {
            log::warn!(
                "Writer reports {} pages, editor has {}",
                target.page_count(),
                document.page_count()
            );
        }

        let pages = compose(
            document.iter(),
            &|page: PageNumber| target.page_height(page),
            &self.config,
        );
        if pages.iter().any(|p| p.has_text()) {
            target.embed_font()?;
        }
        for page in &pages {
            target.apply(page)?;
        }
        let bytes = target.save().await?;

        let file_name = annotated_file_name(document.name());
        log::info!("Exported {} ({} bytes)", file_name, bytes.len());
        Ok(ExportArtifact { file_name, bytes })
    }

    /// Export and hand the artifact to `sink`.
    pub async fn export_to(
        &self,
        loader: &dyn SourceLoader,
        writer: &dyn DocumentWriter,
        sink: &dyn ArtifactSink,
    ) -> Result<ExportArtifact, ExportError> {
        let artifact = self.export(loader, writer).await?;
        sink.save_as(&artifact.file_name, &artifact.bytes)
            .await
            .map_err(ExportError::Sink)?;
        Ok(artifact)
    }

    /// One-line summary for a status bar.
    pub fn status_line(&self) -> String {
        let Some(document) = self.document.as_ref() else {
            return "No document".to_string();
        };
        let tool = match self.tools.current_tool {
            ToolKind::None => "No tool selected".to_string(),
            tool => format!("Tool: {}", tool.display_name()),
        };
        let mut line = format!(
            "{} | Page {} of {} | {:.0}% | {}",
            document.name(),
            self.page,
            document.page_count(),
            self.scale * 100.0,
            tool
        );
        if self.processing.get() {
            line.push_str(" (Processing...)");
        } else if self.dirty {
            line.push_str(" (Unsaved changes)");
        }
        line
    }
}
