//! Sound-speed profiles
//!
//! A profile is a piecewise-linear table of sound speed versus depth (depth
//! positive down, meters; speed in m/s). Within each layer the speed gradient
//! is constant, which is what lets the tracer model the ray path as a
//! circular arc per layer.

use crate::error::{Result, SonarTraceError};

/// Nominal sound speed in seawater, m/s.
pub const NOMINAL_SOUND_SPEED_MPS: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ProfilePoint {
    depth_m: f64,
    speed_mps: f64,
}

/// One constant-gradient layer of the profile, as seen by the tracer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layer {
    /// Shallow bound of the layer (depth, positive down).
    pub top_m: f64,
    /// Deep bound of the layer; infinite below the last table point.
    pub bottom_m: f64,
    /// Sound-speed gradient within the layer, (m/s) per meter of depth.
    pub gradient: f64,
}

#[derive(Debug, Clone)]
pub struct SoundSpeedProfile {
    points: Vec<ProfilePoint>,
}

impl SoundSpeedProfile {
    /// Builds a profile from `(depth_m, speed_mps)` samples.
    ///
    /// Depths must be non-negative and strictly increasing; speeds must be
    /// positive. Above the first sample and below the last the speed is held
    /// constant (zero gradient).
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self> {
        if points.is_empty() {
            return Err(SonarTraceError::InvalidProfile(
                "profile needs at least one (depth, speed) sample".to_string(),
            ));
        }
        let mut converted = Vec::with_capacity(points.len());
        let mut prev_depth = f64::NEG_INFINITY;
        for &(depth_m, speed_mps) in points {
            if !depth_m.is_finite() || depth_m < 0.0 {
                return Err(SonarTraceError::InvalidProfile(format!(
                    "sample depth must be finite and non-negative, got {depth_m}"
                )));
            }
            if depth_m <= prev_depth {
                return Err(SonarTraceError::InvalidProfile(format!(
                    "sample depths must be strictly increasing, {depth_m} follows {prev_depth}"
                )));
            }
            if !speed_mps.is_finite() || speed_mps <= 0.0 {
                return Err(SonarTraceError::InvalidProfile(format!(
                    "sound speed must be positive and finite, got {speed_mps}"
                )));
            }
            converted.push(ProfilePoint { depth_m, speed_mps });
            prev_depth = depth_m;
        }
        Ok(Self { points: converted })
    }

    /// Constant sound speed at every depth.
    pub fn isovelocity(speed_mps: f64) -> Result<Self> {
        Self::from_points(&[(0.0, speed_mps)])
    }

    /// Sound speed at `depth_m`, linearly interpolated and clamped to the
    /// table ends.
    pub fn speed_at(&self, depth_m: f64) -> f64 {
        let first = self.points[0];
        if depth_m <= first.depth_m {
            return first.speed_mps;
        }
        let last = self.points[self.points.len() - 1];
        if depth_m >= last.depth_m {
            return last.speed_mps;
        }
        let hi = self.points.partition_point(|p| p.depth_m <= depth_m);
        let a = self.points[hi - 1];
        let b = self.points[hi];
        let t = (depth_m - a.depth_m) / (b.depth_m - a.depth_m);
        a.speed_mps + t * (b.speed_mps - a.speed_mps)
    }

    /// Gradient of the layer containing `depth_m`, (m/s)/m.
    ///
    /// Zero above the first sample and below the last. A depth exactly on a
    /// sample belongs to the layer below it.
    pub fn gradient_at(&self, depth_m: f64) -> f64 {
        self.layer_at(depth_m).gradient
    }

    /// Layer containing `depth_m`. A depth exactly on a table sample belongs
    /// to the layer below it; callers resolving a boundary against an
    /// upward-travelling ray nudge the query depth accordingly.
    pub(crate) fn layer_at(&self, depth_m: f64) -> Layer {
        let first = self.points[0];
        if depth_m < first.depth_m {
            return Layer {
                top_m: 0.0,
                bottom_m: first.depth_m,
                gradient: 0.0,
            };
        }
        let hi = self.points.partition_point(|p| p.depth_m <= depth_m);
        if hi == self.points.len() {
            let last = self.points[hi - 1];
            return Layer {
                top_m: last.depth_m,
                bottom_m: f64::INFINITY,
                gradient: 0.0,
            };
        }
        let a = self.points[hi - 1];
        let b = self.points[hi];
        Layer {
            top_m: a.depth_m,
            bottom_m: b.depth_m,
            gradient: (b.speed_mps - a.speed_mps) / (b.depth_m - a.depth_m),
        }
    }
}
