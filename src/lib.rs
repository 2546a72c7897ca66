//! Underwater acoustic ray tracing for sonar simulation.
//!
//! A [`RayTracer`] marches a sound ray through a [`SoundSpeedProfile`] and
//! produces a [`SonarRay`]: a traced propagation path of circular-arc
//! segments carrying accumulated reflection loss. Detection logic then asks
//! the ray, many times and read-only, "at this horizontal range, how deep is
//! the ray and how much has it lost" via [`SonarRay::calculate_depth`].

pub mod config;
pub mod error;
pub mod math;
pub mod profile;
pub mod ray;
pub mod tracer;

pub use config::TraceConfig;
pub use error::{Result, SonarTraceError};
pub use profile::SoundSpeedProfile;
pub use ray::{DepthSample, RaySegment, SonarRay};
pub use tracer::RayTracer;
