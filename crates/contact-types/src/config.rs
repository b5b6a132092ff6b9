use serde::{Deserialize, Serialize};

/// Thresholds for one classification run. Supplied per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassificationConfig {
    /// Non-intersecting solids at or below this distance are touching.
    pub tolerance_mm: f64,
    /// Clearance pairs with a gap beyond this are dropped from the output.
    pub clearance_max_mm: f64,
    /// Minimum common volume that counts as penetration.
    pub volume_epsilon_mm3: f64,
    /// Minimum common surface area that counts as touching.
    pub area_epsilon_mm2: f64,
    /// Placeholder gap reported when no geometric kernel is loaded.
    pub stub_gap_mm: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            tolerance_mm: 0.002,
            clearance_max_mm: 5.0,
            volume_epsilon_mm3: 1e-6,
            area_epsilon_mm2: 1e-3,
            stub_gap_mm: 0.1,
        }
    }
}

impl ClassificationConfig {
    /// Parse a JSON config document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_tolerance_mm(mut self, tolerance_mm: f64) -> Self {
        self.tolerance_mm = tolerance_mm;
        self
    }

    pub fn with_clearance_max_mm(mut self, clearance_max_mm: f64) -> Self {
        self.clearance_max_mm = clearance_max_mm;
        self
    }

    pub fn with_stub_gap_mm(mut self, stub_gap_mm: f64) -> Self {
        self.stub_gap_mm = stub_gap_mm;
        self
    }

    /// Reject thresholds that are negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("toleranceMm", self.tolerance_mm),
            ("clearanceMaxMm", self.clearance_max_mm),
            ("volumeEpsilonMm3", self.volume_epsilon_mm3),
            ("areaEpsilonMm2", self.area_epsilon_mm2),
            ("stubGapMm", self.stub_gap_mm),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Errors from building or validating a classification config.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: f64 },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },
}
