//! Traced sonar ray paths and range -> (depth, loss) queries.
//!
//! A [`SonarRay`] is the output of ray tracing: an ordered sequence of
//! circular-arc segments in the range/vertical plane, each carrying the
//! reflection loss accumulated from the source up to the start of that
//! segment. The path is built once and then queried read-only.
//!
//! Coordinate and sign conventions (fixed for the whole crate):
//! - `x` is horizontal range from the source in meters, increasing away
//!   from it.
//! - `y` is the vertical coordinate in meters, zero at the sea surface and
//!   negative below it.
//! - Each segment's traversed arc lies on one half of its circle; the sign
//!   of `radius` selects the half:
//!   `y(range) = yc + signum(radius) * sqrt(radius^2 - (range - xc)^2)`.
//!   Positive radius puts the ray above its center, negative below.
//! - Infinite radius is not supported; straight runs are stored as arcs
//!   with radius `STRAIGHT_RADIUS_M` (sagitta under 0.1 mm over 10 km).

use crate::error::{Result, SonarTraceError};
use crate::math::{DVec2, clamped_sqrt};

/// Radius used to represent straight (zero-gradient) segments, meters.
pub const STRAIGHT_RADIUS_M: f64 = 1.0e12;

/// Tolerance for segment contiguity checks, meters.
const CONTIGUITY_EPS_M: f64 = 1e-6;

/// Tolerance for the segment-start-on-arc check, meters.
const ON_ARC_EPS_M: f64 = 1e-2;

/// One circular-arc segment of a traced ray path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    /// Range at the start of the segment, m.
    pub x: f64,
    /// Range at the end of the segment, m.
    pub xmax: f64,
    /// Vertical coordinate at the start of the segment, m (negative below
    /// the surface).
    pub y: f64,
    /// Signed arc radius, m. The sign selects which half of the circle the
    /// ray lies on (see the module docs).
    pub radius: f64,
    /// Cached `radius * radius`.
    pub radius_sq: f64,
    /// Center of the arc's circle, `(xc, yc)`.
    pub center: DVec2,
    /// Reflection loss accumulated from the source up to (not including)
    /// this segment, dB. Non-negative, non-decreasing along the path.
    pub reflection_loss_db: f64,
}

impl RaySegment {
    pub fn new(
        x: f64,
        xmax: f64,
        y: f64,
        radius: f64,
        center: DVec2,
        reflection_loss_db: f64,
    ) -> Self {
        Self {
            x,
            xmax,
            y,
            radius,
            radius_sq: radius * radius,
            center,
            reflection_loss_db,
        }
    }

    /// Vertical coordinate of the arc at `range_m`.
    ///
    /// The sqrt argument is clamped at zero so boundary rounding yields the
    /// center's vertical coordinate rather than NaN.
    pub(crate) fn y_at(&self, range_m: f64) -> f64 {
        let dx = range_m - self.center.x;
        self.center.y + self.radius.signum() * clamped_sqrt(self.radius_sq - dx * dx)
    }
}

/// Depth and accumulated loss at a queried range along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSample {
    /// Depth at the query range, m, positive down.
    pub depth_m: f64,
    /// Reflection loss accumulated from the source up to the segment
    /// containing the query range, dB.
    pub reflection_loss_db: f64,
}

/// A traced acoustic ray path.
///
/// Built once (by [`crate::tracer::RayTracer`] or via [`SonarRay::from_segments`]),
/// then queried many times through [`SonarRay::calculate_depth`]. The segment
/// sequence stays private; an empty ray is the legal "no trace performed"
/// state and every query against it reports [`SonarTraceError::EmptyPath`].
#[derive(Debug, Clone, Default)]
pub struct SonarRay {
    segments: Vec<RaySegment>,
}

impl SonarRay {
    /// An empty, untraced ray.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ray from pre-traced segments, enforcing the path invariants:
    /// positive segment length, contiguity in range, segment start on its
    /// own arc, and non-decreasing reflection loss.
    pub fn from_segments(segments: Vec<RaySegment>) -> Result<Self> {
        let mut prev: Option<&RaySegment> = None;
        for (i, segment) in segments.iter().enumerate() {
            if !(segment.xmax > segment.x) {
                return Err(SonarTraceError::InvalidPath(format!(
                    "segment {i} has non-positive length: x={}, xmax={}",
                    segment.x, segment.xmax
                )));
            }
            if segment.radius == 0.0 || !segment.radius.is_finite() {
                return Err(SonarTraceError::InvalidPath(format!(
                    "segment {i} has radius {}, expected finite and non-zero",
                    segment.radius
                )));
            }
            if (segment.radius_sq - segment.radius * segment.radius).abs()
                > segment.radius_sq * 1e-9
            {
                return Err(SonarTraceError::InvalidPath(format!(
                    "segment {i} has radius_sq inconsistent with radius"
                )));
            }
            if segment.reflection_loss_db < 0.0 {
                return Err(SonarTraceError::InvalidPath(format!(
                    "segment {i} has negative reflection loss {}",
                    segment.reflection_loss_db
                )));
            }
            if (segment.y_at(segment.x) - segment.y).abs() > ON_ARC_EPS_M {
                return Err(SonarTraceError::InvalidPath(format!(
                    "segment {i} start point does not lie on its arc"
                )));
            }
            if let Some(p) = prev {
                if (segment.x - p.xmax).abs() > CONTIGUITY_EPS_M {
                    return Err(SonarTraceError::InvalidPath(format!(
                        "segments {} and {i} are not contiguous: xmax={}, next x={}",
                        i - 1,
                        p.xmax,
                        segment.x
                    )));
                }
                if segment.reflection_loss_db < p.reflection_loss_db {
                    return Err(SonarTraceError::InvalidPath(format!(
                        "reflection loss decreases from {} dB to {} dB at segment {i}",
                        p.reflection_loss_db, segment.reflection_loss_db
                    )));
                }
            }
            prev = Some(segment);
        }
        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Range at which the traced path starts, m.
    pub fn min_range_m(&self) -> Option<f64> {
        self.segments.first().map(|s| s.x)
    }

    /// Maximum range the path was traced to, m.
    pub fn max_range_m(&self) -> Option<f64> {
        self.segments.last().map(|s| s.xmax)
    }

    /// Depth and accumulated reflection loss of the ray at `range_m`.
    ///
    /// Segments own the half-open interval `[x, xmax)`: a query exactly on a
    /// shared boundary resolves to the later segment. The final segment is
    /// closed on the right. Queries outside the traced span report
    /// [`SonarTraceError::RangeOutOfBounds`] rather than clamping; a miss
    /// here means "no detection", not a program error.
    pub fn calculate_depth(&self, range_m: f64) -> Result<DepthSample> {
        let (first, last) = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SonarTraceError::EmptyPath),
        };
        if !range_m.is_finite() || range_m < first.x || range_m > last.xmax {
            return Err(SonarTraceError::RangeOutOfBounds {
                range_m,
                min_range_m: first.x,
                max_range_m: last.xmax,
            });
        }
        let idx = self.segments.partition_point(|s| s.x <= range_m);
        let segment = &self.segments[idx - 1];
        Ok(DepthSample {
            depth_m: -segment.y_at(range_m),
            reflection_loss_db: segment.reflection_loss_db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Three contiguous arcs: down along a half-circle to -100 m, further
    // down to -200 m, then back up, with stepped reflection losses.
    fn three_segment_ray() -> SonarRay {
        let segments = vec![
            RaySegment::new(0.0, 100.0, 0.0, 100.0, DVec2::new(0.0, -100.0), 0.0),
            RaySegment::new(100.0, 200.0, -100.0, -100.0, DVec2::new(200.0, -100.0), 0.2),
            RaySegment::new(200.0, 300.0, -200.0, -100.0, DVec2::new(200.0, -100.0), 0.5),
        ];
        SonarRay::from_segments(segments).unwrap()
    }

    #[test]
    fn test_empty_ray_reports_empty_path() {
        let ray = SonarRay::new();
        assert!(ray.is_empty());
        assert!(matches!(
            ray.calculate_depth(10.0),
            Err(SonarTraceError::EmptyPath)
        ));
    }

    #[test]
    fn test_single_segment_arc_convention() {
        // The defining convention check: a half-circle of radius 50 starting
        // at the surface, center at (0, -50).
        let ray = SonarRay::from_segments(vec![RaySegment::new(
            0.0,
            100.0,
            0.0,
            50.0,
            DVec2::new(0.0, -50.0),
            0.0,
        )])
        .unwrap();
        let at_start = ray.calculate_depth(0.0).unwrap();
        assert!(at_start.depth_m.abs() < 1e-9);
        let at_vertex = ray.calculate_depth(50.0).unwrap();
        assert!((at_vertex.depth_m - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_sqrt_clamp_at_degenerate_boundary() {
        // xmax sits fractionally past the arc's horizontal extent, so the
        // sqrt argument goes negative at the boundary; the clamp must give
        // the center's depth, never NaN.
        let ray = SonarRay::from_segments(vec![RaySegment::new(
            0.0,
            50.0 + 1e-7,
            0.0,
            50.0,
            DVec2::new(0.0, -50.0),
            0.0,
        )])
        .unwrap();
        let sample = ray.calculate_depth(50.0 + 1e-7).unwrap();
        assert!(sample.depth_m.is_finite());
        assert!((sample.depth_m - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_queries_satisfy_circle_equation() {
        let ray = three_segment_ray();
        let arcs = [
            (0.0, -100.0, 100.0, [10.0, 50.0, 90.0]),
            (200.0, -100.0, 100.0, [110.0, 150.0, 190.0]),
            (200.0, -100.0, 100.0, [210.0, 250.0, 290.0]),
        ];
        for (xc, yc, r, ranges) in arcs {
            for range in ranges {
                let y = -ray.calculate_depth(range).unwrap().depth_m;
                let residual = (range - xc).powi(2) + (y - yc).powi(2) - r * r;
                assert!(
                    residual.abs() < 1e-6,
                    "circle equation violated at range {range}: residual {residual}"
                );
            }
        }
    }

    #[test]
    fn test_depth_continuous_across_boundaries() {
        let ray = three_segment_ray();
        for boundary in [100.0, 200.0] {
            let before = ray.calculate_depth(boundary - 1e-7).unwrap().depth_m;
            let after = ray.calculate_depth(boundary + 1e-7).unwrap().depth_m;
            assert!(
                (before - after).abs() < 2e-2,
                "depth jumps across boundary {boundary}: {before} vs {after}"
            );
        }
    }

    #[test]
    fn test_boundary_query_resolves_to_later_segment() {
        let ray = three_segment_ray();
        // Exactly on the 100 m boundary: the later segment's loss.
        let sample = ray.calculate_depth(100.0).unwrap();
        assert_eq!(sample.reflection_loss_db, 0.2);
        // And the closed right end of the final segment still answers.
        let end = ray.calculate_depth(300.0).unwrap();
        assert_eq!(end.reflection_loss_db, 0.5);
    }

    #[test]
    fn test_mid_segment_loss_is_segment_start_loss() {
        let ray = three_segment_ray();
        let sample = ray.calculate_depth(150.0).unwrap();
        assert_eq!(sample.reflection_loss_db, 0.2);
    }

    #[test]
    fn test_loss_non_decreasing_in_range() {
        let ray = three_segment_ray();
        let mut prev = f64::NEG_INFINITY;
        let mut range = 0.0;
        while range <= 300.0 {
            let loss = ray.calculate_depth(range).unwrap().reflection_loss_db;
            assert!(loss >= prev, "loss decreased at range {range}");
            prev = loss;
            range += 7.5;
        }
    }

    #[test]
    fn test_out_of_range_is_reported_not_clamped() {
        let ray = three_segment_ray();
        match ray.calculate_depth(-1.0) {
            Err(SonarTraceError::RangeOutOfBounds {
                min_range_m,
                max_range_m,
                ..
            }) => {
                assert_eq!(min_range_m, 0.0);
                assert_eq!(max_range_m, 300.0);
            }
            other => panic!("expected RangeOutOfBounds, got {other:?}"),
        }
        assert!(matches!(
            ray.calculate_depth(300.1),
            Err(SonarTraceError::RangeOutOfBounds { .. })
        ));
        assert!(matches!(
            ray.calculate_depth(f64::NAN),
            Err(SonarTraceError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_from_segments_rejects_gap() {
        let segments = vec![
            RaySegment::new(0.0, 100.0, 0.0, 100.0, DVec2::new(0.0, -100.0), 0.0),
            RaySegment::new(101.0, 200.0, -100.0, -100.0, DVec2::new(201.0, -100.0), 0.2),
        ];
        assert!(matches!(
            SonarRay::from_segments(segments),
            Err(SonarTraceError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_from_segments_rejects_overlap() {
        let segments = vec![
            RaySegment::new(0.0, 100.0, 0.0, 100.0, DVec2::new(0.0, -100.0), 0.0),
            RaySegment::new(99.0, 200.0, -99.0, -100.0, DVec2::new(199.0, -100.0), 0.2),
        ];
        assert!(SonarRay::from_segments(segments).is_err());
    }

    #[test]
    fn test_from_segments_rejects_decreasing_loss() {
        let segments = vec![
            RaySegment::new(0.0, 100.0, 0.0, 100.0, DVec2::new(0.0, -100.0), 0.5),
            RaySegment::new(100.0, 200.0, -100.0, -100.0, DVec2::new(200.0, -100.0), 0.2),
        ];
        assert!(matches!(
            SonarRay::from_segments(segments),
            Err(SonarTraceError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_from_segments_rejects_zero_length_segment() {
        let segments = vec![RaySegment::new(
            50.0,
            50.0,
            0.0,
            100.0,
            DVec2::new(50.0, -100.0),
            0.0,
        )];
        assert!(SonarRay::from_segments(segments).is_err());
    }

    #[test]
    fn test_from_segments_rejects_start_off_arc() {
        // Start point 5 m away from where the arc actually passes.
        let segments = vec![RaySegment::new(
            0.0,
            100.0,
            -5.0,
            100.0,
            DVec2::new(0.0, -100.0),
            0.0,
        )];
        assert!(SonarRay::from_segments(segments).is_err());
    }

    #[test]
    fn test_range_accessors() {
        let ray = three_segment_ray();
        assert_eq!(ray.len(), 3);
        assert_eq!(ray.min_range_m(), Some(0.0));
        assert_eq!(ray.max_range_m(), Some(300.0));
        assert_eq!(SonarRay::new().max_range_m(), None);
    }
}
