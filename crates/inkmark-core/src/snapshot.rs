//! Serialized annotation state for persistence.

use crate::annotations::Annotation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Snapshot errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No document is loaded")]
    NoDocument,
}

/// Annotations of one document at a point in time.
///
/// Entries that fail to parse are skipped on load instead of failing the
/// whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub document_name: String,
    #[serde(deserialize_with = "lenient_annotations")]
    pub annotations: Vec<Annotation>,
    #[serde(rename = "savedAt")]
    pub timestamp: DateTime<Utc>,
}

impl ExportSnapshot {
    /// Capture the given annotations, stamped now.
    pub fn new(document_name: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            document_name: document_name.into(),
            annotations,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Outcome of loading a snapshot into the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub kept: usize,
    pub dropped: usize,
}

fn lenient_annotations<'de, D>(deserializer: D) -> Result<Vec<Annotation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut annotations = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<Annotation>(value) {
            Ok(annotation) => annotations.push(annotation),
            Err(e) => log::warn!("Skipping snapshot entry {}: {}", index, e),
        }
    }
    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Region, RegionKind, TextMark};
    use kurbo::Point;

    #[test]
    fn test_json_keys() {
        let snapshot = ExportSnapshot::new(
            "report.pdf",
            vec![TextMark::new(1, Point::new(1.0, 2.0), "a", 16.0, "#000").into()],
        );
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["documentName"], "report.pdf");
        assert!(value["savedAt"].is_string());
        assert_eq!(value["annotations"][0]["tool"], "text");
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let snapshot = ExportSnapshot::new(
            "a.pdf",
            vec![
                Region::from_corners(RegionKind::Highlight, 1, "#ff0", 20.0, Point::ZERO, Point::new(5.0, 5.0)).into(),
                TextMark::new(2, Point::new(1.0, 1.0), "x", 16.0, "#000").into(),
            ],
        );
        let loaded = ExportSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let json = r##"{
            "documentName": "a.pdf",
            "savedAt": "2024-05-01T10:00:00Z",
            "annotations": [
                {"tool": "text", "page": 1, "color": "#000", "x": 1, "y": 2, "text": "ok", "fontSize": 12},
                {"tool": "laser", "page": 1},
                {"tool": "freehand", "page": "one"}
            ]
        }"##;
        let snapshot = ExportSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.annotations.len(), 1);
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(ExportSnapshot::from_json("nope"), Err(SnapshotError::Json(_))));
    }
}
