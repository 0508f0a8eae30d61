//! Grid adsorption for dragged nodes.
//!
//! Each axis is snapped independently: a coordinate jumps to the nearest grid
//! line only when it is already within the threshold of it.

use kurbo::Point;

/// Default spacing between background grid lines (canvas units).
pub const DEFAULT_GRID_SPACING: f64 = 100.0;

/// Default distance within which a coordinate is pulled onto a grid line.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 5.0;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }

    /// Offset applied by snapping (snapped minus raw).
    pub fn offset(&self, raw: Point) -> kurbo::Vec2 {
        self.point - raw
    }
}

/// Grid parameters used while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Distance between grid lines.
    pub spacing: f64,
    /// Maximum distance to a grid line that still snaps.
    pub threshold: f64,
    /// When false, points pass through unchanged.
    pub enabled: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_GRID_SPACING,
            threshold: DEFAULT_SNAP_THRESHOLD,
            enabled: true,
        }
    }
}

impl Grid {
    /// Create an enabled grid.
    pub fn new(spacing: f64, threshold: f64) -> Self {
        Self {
            spacing,
            threshold,
            enabled: true,
        }
    }

    /// Snap a point to this grid.
    pub fn snap(&self, point: Point) -> SnapResult {
        if !self.enabled {
            return SnapResult::none(point);
        }
        snap_to_grid(point, self.spacing, self.threshold)
    }
}

/// Snap one coordinate; returns the new value and whether it moved onto a line.
fn snap_axis(value: f64, spacing: f64, threshold: f64) -> (f64, bool) {
    if !(spacing > 0.0) || !value.is_finite() {
        return (value, false);
    }
    let rounded = (value / spacing).round() * spacing;
    if (rounded - value).abs() <= threshold {
        (rounded, true)
    } else {
        (value, false)
    }
}

/// Snap a point to the nearest grid intersection, per axis, when within `threshold`.
///
/// Always computed from the raw point, never incrementally, so repeated calls
/// do not accumulate error.
pub fn snap_to_grid(point: Point, spacing: f64, threshold: f64) -> SnapResult {
    let (x, snapped_x) = snap_axis(point.x, spacing, threshold);
    let (y, snapped_y) = snap_axis(point.y, spacing, threshold);
    SnapResult {
        point: Point::new(x, y),
        snapped_x,
        snapped_y,
    }
}

/// Convenience wrapper returning only the snapped point.
pub fn snap(point: Point, spacing: f64, threshold: f64) -> Point {
    snap_to_grid(point, spacing, threshold).point
}

/// Grid line coordinates in `[0, extent)` (used for drawing the background grid).
pub fn grid_lines(extent: f64, spacing: f64) -> Vec<f64> {
    if !(spacing > 0.0) || !(extent > 0.0) {
        return Vec::new();
    }
    let count = (extent / spacing).ceil() as usize;
    (0..count).map(|i| i as f64 * spacing).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_boundary() {
        let result = snap_to_grid(Point::new(97.0, 203.0), 100.0, 5.0);
        assert_eq!(result.point, Point::new(100.0, 200.0));
        assert!(result.snapped_x);
        assert!(result.snapped_y);

        let result = snap_to_grid(Point::new(90.0, 203.0), 100.0, 5.0);
        assert_eq!(result.point, Point::new(90.0, 200.0));
        assert!(!result.snapped_x);
        assert!(result.snapped_y);
    }

    #[test]
    fn test_snap_threshold_inclusive() {
        assert_eq!(snap(Point::new(105.0, 295.0), 100.0, 5.0), Point::new(100.0, 300.0));
        assert_eq!(snap(Point::new(105.5, 294.5), 100.0, 5.0), Point::new(105.5, 294.5));
    }

    #[test]
    fn test_snap_idempotent() {
        let samples = [
            Point::new(97.0, 203.0),
            Point::new(-3.0, 51.0),
            Point::new(149.9, 1004.0),
            Point::new(0.0, 0.0),
            Point::new(12.25, -96.5),
        ];
        for spacing in [20.0, 50.0, 100.0] {
            for threshold in [0.0, 2.5, 5.0, 15.0] {
                for p in samples {
                    let once = snap(p, spacing, threshold);
                    assert_eq!(snap(once, spacing, threshold), once);
                }
            }
        }
    }

    #[test]
    fn test_snap_zero_threshold_only_exact() {
        assert_eq!(snap(Point::new(100.0, 101.0), 100.0, 0.0), Point::new(100.0, 101.0));
    }

    #[test]
    fn test_snap_degenerate_spacing() {
        let p = Point::new(12.0, 34.0);
        assert_eq!(snap(p, 0.0, 5.0), p);
        assert_eq!(snap(p, -10.0, 5.0), p);
    }

    #[test]
    fn test_snap_result_offset() {
        let raw = Point::new(97.0, 203.0);
        let result = snap_to_grid(raw, 100.0, 5.0);
        let offset = result.offset(raw);
        assert!((offset.x - 3.0).abs() < f64::EPSILON);
        assert!((offset.y + 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disabled_grid_passes_through() {
        let grid = Grid {
            enabled: false,
            ..Grid::default()
        };
        let result = grid.snap(Point::new(99.0, 99.0));
        assert!(!result.is_snapped());
        assert_eq!(result.point, Point::new(99.0, 99.0));
    }

    #[test]
    fn test_grid_lines() {
        assert_eq!(grid_lines(350.0, 100.0), vec![0.0, 100.0, 200.0, 300.0]);
        assert!(grid_lines(100.0, 0.0).is_empty());
    }
}
