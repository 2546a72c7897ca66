//! Configuration for ray tracing

use crate::error::{Result, SonarTraceError};

/// Parameters for tracing a single sonar ray.
///
/// Depths are positive down in meters; the launch angle is measured from
/// horizontal, positive pointing down toward the seafloor.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub source_depth_m: f64,
    pub launch_angle_deg: f64,
    pub max_range_m: f64,
    pub bottom_depth_m: f64,
    /// Loss added per surface bounce, dB.
    pub surface_loss_db: f64,
    /// Loss added per bottom bounce, dB.
    pub bottom_loss_db: f64,
    /// Hard cap on emitted segments; tracing stops with a warning past it.
    pub max_segments: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            source_depth_m: 100.0,
            launch_angle_deg: 5.0,
            max_range_m: 40_000.0,
            bottom_depth_m: 4_000.0,
            surface_loss_db: 3.0,
            bottom_loss_db: 6.0,
            max_segments: 512,
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_depth_m(mut self, depth: f64) -> Self {
        self.source_depth_m = depth;
        self
    }

    pub fn launch_angle_deg(mut self, angle: f64) -> Self {
        self.launch_angle_deg = angle;
        self
    }

    pub fn max_range_m(mut self, range: f64) -> Self {
        self.max_range_m = range;
        self
    }

    pub fn bottom_depth_m(mut self, depth: f64) -> Self {
        self.bottom_depth_m = depth;
        self
    }

    pub fn surface_loss_db(mut self, loss: f64) -> Self {
        self.surface_loss_db = loss;
        self
    }

    pub fn bottom_loss_db(mut self, loss: f64) -> Self {
        self.bottom_loss_db = loss;
        self
    }

    pub fn max_segments(mut self, max: usize) -> Self {
        self.max_segments = max;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.bottom_depth_m.is_finite() || self.bottom_depth_m <= 0.0 {
            return Err(SonarTraceError::InvalidConfig(format!(
                "bottom depth must be positive and finite, got {}",
                self.bottom_depth_m
            )));
        }
        if !self.source_depth_m.is_finite()
            || self.source_depth_m <= 0.0
            || self.source_depth_m >= self.bottom_depth_m
        {
            return Err(SonarTraceError::InvalidConfig(format!(
                "source depth must lie strictly between the surface and the bottom \
                 (0, {}), got {}",
                self.bottom_depth_m, self.source_depth_m
            )));
        }
        if !self.launch_angle_deg.is_finite() || self.launch_angle_deg.abs() >= 90.0 {
            return Err(SonarTraceError::InvalidConfig(format!(
                "launch angle must lie strictly inside (-90, 90) degrees, got {}",
                self.launch_angle_deg
            )));
        }
        if !self.max_range_m.is_finite() || self.max_range_m <= 0.0 {
            return Err(SonarTraceError::InvalidConfig(format!(
                "max range must be positive and finite, got {}",
                self.max_range_m
            )));
        }
        if self.surface_loss_db < 0.0 || self.bottom_loss_db < 0.0 {
            return Err(SonarTraceError::InvalidConfig(
                "reflection losses must be non-negative".to_string(),
            ));
        }
        if self.max_segments == 0 {
            return Err(SonarTraceError::InvalidConfig(
                "max_segments must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
