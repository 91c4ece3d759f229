//! Point cloud configuration
//!
//! Typed options with defaults matching the demo scene, loadable from TOML.
//! `validate` runs before any GPU resource is touched.

use crate::bounds::{aabb_from_center_half_extents, aabb_is_valid, Aabb};
use crate::constants::defaults;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognized point cloud options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointCloudConfig {
    /// Capacity of the Point Store and Visibility Buffer
    pub point_count: u32,

    /// Culling distance threshold
    pub max_distance: f32,

    /// Minimum projected-size threshold
    pub min_size: f32,

    /// Radius of the sphere the demo generator fills
    pub spawn_radius: f32,

    /// Inclusive (min, max) bounds for per-point size
    pub point_size_range: (f32, f32),

    /// Conservative world-space bound of every possible point position
    pub render_bounds: Aabb,

    /// Enables the blocking visible-count readback and its log line
    pub debug_mode: bool,

    /// Seed for the demo generator
    pub seed: u64,
}

impl Default for PointCloudConfig {
    fn default() -> Self {
        let half = defaults::RENDER_BOUNDS_HALF_EXTENT;
        Self {
            point_count: defaults::POINT_COUNT,
            max_distance: defaults::MAX_DISTANCE,
            min_size: defaults::MIN_SIZE,
            spawn_radius: defaults::SPAWN_RADIUS,
            point_size_range: defaults::POINT_SIZE_RANGE,
            render_bounds: aabb_from_center_half_extents([0.0; 3], [half; 3]),
            debug_mode: defaults::DEBUG_MODE,
            seed: defaults::SEED,
        }
    }
}

impl PointCloudConfig {
    /// Parse from TOML text; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        toml::from_str(raw).map_err(|e| EngineError::ConfigParse(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigIo {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config = Self::from_toml_str(&raw)?;
        log::info!(
            "[PointCloudConfig::load] Loaded {} ({} points)",
            path.display(),
            config.point_count
        );
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> EngineResult<()> {
        if self.point_count == 0 {
            return Err(EngineError::invalid_config(
                "point_count",
                "must be greater than 0",
            ));
        }

        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(EngineError::invalid_config(
                "max_distance",
                format!("must be a finite value >= 0, got {}", self.max_distance),
            ));
        }

        if !self.min_size.is_finite() || self.min_size < 0.0 {
            return Err(EngineError::invalid_config(
                "min_size",
                format!("must be a finite value >= 0, got {}", self.min_size),
            ));
        }

        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(EngineError::invalid_config(
                "spawn_radius",
                format!("must be a finite value >= 0, got {}", self.spawn_radius),
            ));
        }

        let (min_size, max_size) = self.point_size_range;
        if !min_size.is_finite() || !max_size.is_finite() || min_size < 0.0 || min_size > max_size
        {
            return Err(EngineError::invalid_config(
                "point_size_range",
                format!("expected 0 <= min <= max, got ({}, {})", min_size, max_size),
            ));
        }

        if !aabb_is_valid(&self.render_bounds) {
            return Err(EngineError::invalid_config(
                "render_bounds",
                format!("min must not exceed max: {:?}", self.render_bounds),
            ));
        }

        log::debug!("[PointCloudConfig::validate] Configuration validated successfully");
        Ok(())
    }
}
