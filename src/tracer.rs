//! Sonar ray tracing
//!
//! Marches a single acoustic ray through a [`SoundSpeedProfile`] and emits
//! the traced path as a [`SonarRay`]. Within a constant-gradient layer the
//! ray follows a circular arc (Snell's law keeps `cos(theta) / c` invariant
//! along the ray), so the tracer advances arc by arc, splitting segments at
//! layer crossings and at surface/bottom reflections. Reflections are
//! specular and accrue the configured per-bounce loss; volume absorption is
//! not modeled.
//!
//! Internally the march runs in depth coordinates (positive down) with the
//! ray angle measured from horizontal, positive descending. Emitted segments
//! are converted to the `y`-up convention of [`RaySegment`].

use crate::config::TraceConfig;
use crate::error::Result;
use crate::math::DVec2;
use crate::profile::SoundSpeedProfile;
use crate::ray::{RaySegment, STRAIGHT_RADIUS_M, SonarRay};
use log::{debug, warn};

/// Gradients below this magnitude are traced as straight segments.
const GRADIENT_EPS: f64 = 1e-9;

/// Minimum forward progress per segment, m. Rejects the spurious
/// re-intersection of a reflected arc with the boundary it just left.
const MIN_ADVANCE_M: f64 = 1e-3;

/// Directional nudge used to resolve layer membership at boundaries, m.
const LAYER_NUDGE_M: f64 = 1e-9;

enum SegmentEnd {
    Surface,
    Bottom,
    LayerCross,
    MaxRange,
}

struct Span {
    segment: RaySegment,
    x_end: f64,
    depth_end: f64,
    theta_end: f64,
    end: SegmentEnd,
}

pub struct RayTracer {
    config: TraceConfig,
}

impl RayTracer {
    pub fn new(config: TraceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Traces the ray through `profile` out to the configured maximum range.
    pub fn trace(&self, profile: &SoundSpeedProfile) -> Result<SonarRay> {
        let cfg = &self.config;
        let mut x = 0.0;
        let mut depth = cfg.source_depth_m;
        let mut theta = cfg.launch_angle_deg.to_radians();
        // Snell invariant cos(theta) / c, fixed at launch. Preserved by
        // specular reflection off horizontal boundaries and by layer
        // crossings (the profile is continuous, so theta is too).
        let snell = theta.cos() / profile.speed_at(depth);
        let mut loss_db = 0.0;
        let mut surface_bounces = 0u32;
        let mut bottom_bounces = 0u32;
        let mut segments: Vec<RaySegment> = Vec::new();

        while x < cfg.max_range_m {
            if segments.len() >= cfg.max_segments {
                warn!(
                    "segment cap {} reached at range {:.1} m, truncating trace",
                    cfg.max_segments, x
                );
                break;
            }
            // Resolve the layer on the side the ray is moving toward, so a
            // start exactly on a table sample picks the right gradient.
            let probe = if theta < 0.0 {
                depth - LAYER_NUDGE_M
            } else {
                depth + LAYER_NUDGE_M
            };
            let layer = profile.layer_at(probe.clamp(0.0, cfg.bottom_depth_m));
            let top_d = layer.top_m.max(0.0);
            let bot_d = layer.bottom_m.min(cfg.bottom_depth_m);

            let span = if layer.gradient.abs() < GRADIENT_EPS {
                self.straight_span(x, depth, theta, top_d, bot_d, loss_db)
            } else {
                self.arc_span(
                    x,
                    depth,
                    theta,
                    snell,
                    profile,
                    layer.gradient,
                    top_d,
                    bot_d,
                    loss_db,
                )
            };
            let span = match span {
                Some(span) => span,
                None => {
                    warn!("no forward exit from layer at range {x:.1} m, stopping trace");
                    break;
                }
            };
            if span.x_end - x <= MIN_ADVANCE_M {
                warn!("ray stalled at range {x:.1} m, stopping trace");
                break;
            }

            segments.push(span.segment);
            x = span.x_end;
            depth = span.depth_end;
            theta = span.theta_end;
            match span.end {
                SegmentEnd::Surface => {
                    depth = 0.0;
                    theta = theta.abs();
                    loss_db += cfg.surface_loss_db;
                    surface_bounces += 1;
                }
                SegmentEnd::Bottom => {
                    depth = cfg.bottom_depth_m;
                    theta = -theta.abs();
                    loss_db += cfg.bottom_loss_db;
                    bottom_bounces += 1;
                }
                SegmentEnd::LayerCross => {}
                SegmentEnd::MaxRange => break,
            }
        }

        debug!(
            "traced {} segments to {:.1} m range, {} surface and {} bottom bounces, {:.1} dB accumulated",
            segments.len(),
            x,
            surface_bounces,
            bottom_bounces,
            loss_db
        );
        SonarRay::from_segments(segments)
    }

    /// Span through a zero-gradient layer: a straight run, stored as a
    /// capped-radius arc with the center on the ray's deep side.
    fn straight_span(
        &self,
        x: f64,
        depth: f64,
        theta: f64,
        top_d: f64,
        bot_d: f64,
        loss_db: f64,
    ) -> Option<Span> {
        let max_range = self.config.max_range_m;
        let (x_exit, depth_exit, end) = if theta.abs() < 1e-12 {
            (max_range, depth, SegmentEnd::MaxRange)
        } else {
            let target = if theta > 0.0 { bot_d } else { top_d };
            let x_exit = x + (target - depth) / theta.tan();
            if x_exit >= max_range {
                let depth_at_cap = depth + (max_range - x) * theta.tan();
                (max_range, depth_at_cap, SegmentEnd::MaxRange)
            } else {
                let end = if theta > 0.0 && target == self.config.bottom_depth_m {
                    SegmentEnd::Bottom
                } else if theta < 0.0 && target == 0.0 {
                    SegmentEnd::Surface
                } else {
                    SegmentEnd::LayerCross
                };
                (x_exit, target, end)
            }
        };

        let r = STRAIGHT_RADIUS_M;
        let center_depth = depth + r * theta.cos();
        let xc = x - r * theta.sin();
        let segment = RaySegment::new(
            x,
            x_exit,
            -depth,
            r,
            DVec2::new(xc, -center_depth),
            loss_db,
        );
        Some(Span {
            segment,
            x_end: x_exit,
            depth_end: depth_exit,
            theta_end: theta,
            end,
        })
    }

    /// Span through a constant-gradient layer: a circular arc of radius
    /// `1 / (snell * |g|)` centered at the depth where the extrapolated
    /// sound speed reaches zero. Both intersections with each bounding
    /// depth are candidates, so a ray may pass its vertex (turning point)
    /// inside the span.
    #[allow(clippy::too_many_arguments)]
    fn arc_span(
        &self,
        x: f64,
        depth: f64,
        theta: f64,
        snell: f64,
        profile: &SoundSpeedProfile,
        gradient: f64,
        top_d: f64,
        bot_d: f64,
        loss_db: f64,
    ) -> Option<Span> {
        let cfg = &self.config;
        let c = profile.speed_at(depth);
        let r = 1.0 / (snell * gradient.abs());
        let center_depth = depth - c / gradient;
        let center_above = gradient > 0.0;
        let xc = if center_above {
            x + r * theta.sin()
        } else {
            x - r * theta.sin()
        };

        // Nearest forward intersection with either bounding depth.
        let mut hit: Option<(f64, f64)> = None;
        for target in [top_d, bot_d] {
            // The traversed half of the circle only reaches depths on the
            // ray's side of the center.
            if center_above && target < center_depth {
                continue;
            }
            if !center_above && target > center_depth {
                continue;
            }
            let disc = r * r - (target - center_depth) * (target - center_depth);
            if disc < 0.0 {
                continue;
            }
            let half_chord = disc.sqrt();
            for candidate in [xc - half_chord, xc + half_chord] {
                if candidate > x + MIN_ADVANCE_M
                    && hit.is_none_or(|(best, _)| candidate < best)
                {
                    hit = Some((candidate, target));
                }
            }
        }
        let (x_hit, depth_hit) = hit?;

        let (x_end, depth_end, end) = if x_hit >= cfg.max_range_m {
            let dx = cfg.max_range_m - xc;
            let chord = (r * r - dx * dx).max(0.0).sqrt();
            let depth_at_cap = if center_above {
                center_depth + chord
            } else {
                center_depth - chord
            };
            (cfg.max_range_m, depth_at_cap, SegmentEnd::MaxRange)
        } else {
            let end = if depth_hit == 0.0 && depth_hit == top_d {
                SegmentEnd::Surface
            } else if depth_hit == cfg.bottom_depth_m && depth_hit == bot_d {
                SegmentEnd::Bottom
            } else {
                SegmentEnd::LayerCross
            };
            (x_hit, depth_hit, end)
        };

        // Angle at the span end from the Snell invariant; the clamp absorbs
        // rounding at a vertex that grazes a boundary. Travel direction
        // comes from which side of the vertex the exit lies on.
        let cos_end = (snell * profile.speed_at(depth_end)).min(1.0);
        let theta_mag = cos_end.acos();
        let going_down = if center_above { x_end < xc } else { x_end > xc };
        let theta_end = if going_down { theta_mag } else { -theta_mag };

        let stored_radius = if center_above { -r } else { r };
        let segment = RaySegment::new(
            x,
            x_end,
            -depth,
            stored_radius,
            DVec2::new(xc, -center_depth),
            loss_db,
        );
        Some(Span {
            segment,
            x_end,
            depth_end,
            theta_end,
            end,
        })
    }
}
