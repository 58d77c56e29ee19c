// Static tuning source, optionally loaded from a JSON file

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{DEFAULT_LINEAR_ACCELERATION, DEFAULT_LINEAR_DECELERATION};
use crate::control::ControlConstants;
use crate::hal::Tuning;

/// Error types for loading tuning files
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("IO error reading tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tuning file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid speed limit {name}: {value} (must be positive)")]
    InvalidLimit { name: &'static str, value: f32 },
}

/// Fixed gains and speed profile limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticTuning {
    pub constants: ControlConstants,
    pub linear_acceleration: f32,
    pub linear_deceleration: f32,
}

impl Default for StaticTuning {
    fn default() -> Self {
        Self {
            constants: ControlConstants::default(),
            linear_acceleration: DEFAULT_LINEAR_ACCELERATION,
            linear_deceleration: DEFAULT_LINEAR_DECELERATION,
        }
    }
}

impl StaticTuning {
    /// Parse tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: StaticTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let tuning = Self::from_json(&fs::read_to_string(path)?)?;
        info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), TuningError> {
        if self.linear_acceleration.is_nan() || self.linear_acceleration <= 0.0 {
            return Err(TuningError::InvalidLimit {
                name: "linear_acceleration",
                value: self.linear_acceleration,
            });
        }
        if self.linear_deceleration.is_nan() || self.linear_deceleration <= 0.0 {
            return Err(TuningError::InvalidLimit {
                name: "linear_deceleration",
                value: self.linear_deceleration,
            });
        }
        Ok(())
    }
}

impl Tuning for StaticTuning {
    fn control_constants(&self) -> ControlConstants {
        self.constants
    }

    fn linear_acceleration(&self) -> f32 {
        self.linear_acceleration
    }

    fn linear_deceleration(&self) -> f32 {
        self.linear_deceleration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let tuning =
            StaticTuning::from_json(r#"{"constants": {"kp_linear": 1.5}, "linear_acceleration": 2.0}"#)
                .unwrap();
        assert_eq!(tuning.constants.kp_linear, 1.5);
        assert_eq!(tuning.linear_acceleration, 2.0);
        assert_eq!(tuning.linear_deceleration, DEFAULT_LINEAR_DECELERATION);
    }

    #[test]
    fn test_rejects_non_positive_limits() {
        let err = StaticTuning::from_json(r#"{"linear_deceleration": 0.0}"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::InvalidLimit {
                name: "linear_deceleration",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = StaticTuning::from_json("{ kp_linear: ").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = StaticTuning::from_json_file("/nonexistent/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
