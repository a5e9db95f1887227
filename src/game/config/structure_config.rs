//! Structure Configuration
//!
//! Tuning values for the lattice, the placement classifier and the
//! structural tick. `Default` holds the shipped values; any subset can be
//! overridden from a JSON document, missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading configuration or block definitions.
#[derive(Debug)]
pub enum ConfigError {
    /// Standard I/O error.
    Io(std::io::Error),
    /// JSON syntax or schema error.
    Json(serde_json::Error),
    /// The document parsed but holds an unusable value.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Central configuration for vehicle structures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Edge length of one lattice cell (meters)
    pub cell_size: f32,
    /// Surfaces whose normal is within this angle of up count as "top" (degrees)
    pub top_max_angle_deg: f32,
    /// Surfaces whose normal is beyond this angle from up count as "bottom" (degrees)
    pub bottom_min_angle_deg: f32,
    /// Fixed ticks between a bond break and the connection rebuild
    pub recalc_delay_ticks: u64,
    /// Fixed simulation rate (ticks per second)
    pub fixed_tick_hz: f32,
    /// Upper bound on fixed ticks run per frame, drops the backlog beyond it
    pub max_ticks_per_frame: u32,
    /// Longest aim ray accepted by the placement hit test (meters)
    pub max_ray_distance: f32,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            top_max_angle_deg: 30.0,
            bottom_min_angle_deg: 150.0,
            recalc_delay_ticks: 1,
            fixed_tick_hz: 50.0,
            max_ticks_per_frame: 8,
            max_ray_distance: 50.0,
        }
    }
}

impl StructureConfig {
    /// Seconds per fixed tick.
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.fixed_tick_hz
    }

    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StructureConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.fixed_tick_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_tick_hz must be positive, got {}",
                self.fixed_tick_hz
            )));
        }
        if !(0.0..=180.0).contains(&self.top_max_angle_deg)
            || !(0.0..=180.0).contains(&self.bottom_min_angle_deg)
            || self.top_max_angle_deg > self.bottom_min_angle_deg
        {
            return Err(ConfigError::Invalid(format!(
                "mount angles must satisfy 0 <= top ({}) <= bottom ({}) <= 180",
                self.top_max_angle_deg, self.bottom_min_angle_deg
            )));
        }
        if self.recalc_delay_ticks == 0 {
            return Err(ConfigError::Invalid(
                "recalc_delay_ticks must be at least 1".to_string(),
            ));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_ticks_per_frame must be at least 1".to_string(),
            ));
        }
        if !(self.max_ray_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_ray_distance must be positive, got {}",
                self.max_ray_distance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StructureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recalc_delay_ticks, 1);
        assert!((config.fixed_dt() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StructureConfig::from_json_str(r#"{ "cell_size": 2.0 }"#).unwrap();
        assert_eq!(config.cell_size, 2.0);
        assert_eq!(config.top_max_angle_deg, 30.0);
    }

    #[test]
    fn zero_delay_is_rejected() {
        match StructureConfig::from_json_str(r#"{ "recalc_delay_ticks": 0 }"#) {
            Err(ConfigError::Invalid(_)) => {}
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_json_error() {
        match StructureConfig::from_json_str("{ cell_size: }") {
            Err(ConfigError::Json(_)) => {}
            other => panic!("expected Json error, got {other:?}"),
        }
    }
}
