//! Transforms between device pixels and document-native units.
//!
//! Device coordinates are pixels on the displayed (zoomed) page surface with a
//! top-left origin. Document coordinates are the unscaled page units the
//! annotations are stored in, also top-left origin; the bottom-left flip is
//! applied only when composing export instructions.

use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Convert a device point to document space.
pub fn to_document_space(device: Point, scale: f64) -> Point {
    Point::new(device.x / scale, device.y / scale)
}

/// Convert a document point to device space.
pub fn to_device_space(document: Point, scale: f64) -> Point {
    Point::new(document.x * scale, document.y * scale)
}

/// Uniform paint transform for the overlay surface.
///
/// Applying this to a document point gives the same result as
/// [`to_device_space`], so the renderer can draw in document units directly.
pub fn view_transform(scale: f64) -> Affine {
    Affine::scale(scale)
}

/// Rectangle spanned by two opposite corners, whatever the drag direction.
pub fn normalized_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Inclusive point-in-rectangle test.
///
/// `kurbo::Rect::contains` excludes the max edges; the eraser needs both.
pub fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Inclusive axis-aligned overlap test.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x1 >= b.x0 && a.x0 <= b.x1 && a.y1 >= b.y0 && a.y0 <= b.y1
}

/// Flip a top-left-origin y coordinate into bottom-left-origin page space.
pub fn flip_y(y: f64, page_height: f64) -> f64 {
    page_height - y
}

/// Clockwise page rotation applied by the document renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// Rotate another 90 degrees clockwise.
    pub fn next(self) -> Self {
        match self {
            Rotation::None => Rotation::Quarter,
            Rotation::Quarter => Rotation::Half,
            Rotation::Half => Rotation::ThreeQuarter,
            Rotation::ThreeQuarter => Rotation::None,
        }
    }

    /// Whether width and height trade places on screen.
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }
}

/// Device size of the displayed page surface.
pub fn displayed_page_size(native: Size, scale: f64, rotation: Rotation) -> Size {
    let scaled = Size::new(native.width * scale, native.height * scale);
    if rotation.is_sideways() {
        Size::new(scaled.height, scaled.width)
    } else {
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_space_divides_by_scale() {
        let doc = to_document_space(Point::new(100.0, 200.0), 2.0);
        assert!((doc.x - 50.0).abs() < f64::EPSILON);
        assert!((doc.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        for &scale in &[0.5, 0.7, 1.0, 1.2, 2.4, 3.0] {
            for &(x, y) in &[(0.0, 0.0), (123.0, 456.0), (-7.5, 1e4), (0.1, 0.3)] {
                let original = Point::new(x, y);
                let back = to_device_space(to_document_space(original, scale), scale);
                assert!((back.x - original.x).abs() < 1e-9);
                assert!((back.y - original.y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_view_transform_matches_point_mapping() {
        let scale = 1.4;
        let p = Point::new(33.0, 71.0);
        let via_affine = view_transform(scale) * p;
        let via_fn = to_device_space(p, scale);
        assert!((via_affine.x - via_fn.x).abs() < 1e-12);
        assert!((via_affine.y - via_fn.y).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_rect_any_direction() {
        let a = normalized_rect(Point::new(100.0, 100.0), Point::new(50.0, 20.0));
        let b = normalized_rect(Point::new(50.0, 20.0), Point::new(100.0, 100.0));
        assert_eq!(a, b);
        assert_eq!(a, Rect::new(50.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_contains_inclusive_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains_inclusive(r, Point::new(10.0, 10.0)));
        assert!(contains_inclusive(r, Point::new(0.0, 5.0)));
        assert!(!contains_inclusive(r, Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_overlaps_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(overlaps(a, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!overlaps(a, Rect::new(10.5, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_rotation_cycle_and_size() {
        let native = Size::new(600.0, 800.0);
        assert_eq!(displayed_page_size(native, 1.0, Rotation::None), native);
        assert_eq!(
            displayed_page_size(native, 2.0, Rotation::Quarter),
            Size::new(1600.0, 1200.0)
        );
        assert_eq!(Rotation::ThreeQuarter.next(), Rotation::None);
        assert_eq!(Rotation::Half.degrees(), 180);
    }
}
