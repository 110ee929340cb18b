use serde::{Deserialize, Serialize};

/// Hard cap on either atlas dimension; the growth loop cannot double past it in `u32`.
pub const MAX_ATLAS_DIMENSION: u32 = 1 << 31;

/// Packing configuration.
///
/// The packing heuristic itself is fixed (area-descending insertion into a
/// binary-space-partition tree); these knobs only bound and schedule it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Largest width or height the growth loop may try (power of two).
    /// `None` lets the loop double until everything fits.
    #[serde(default)]
    pub max_dimension: Option<u32>,
    /// Pack independent jobs in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_dimension: None,
            parallel: default_parallel(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if `max_dimension` is zero or not a power of two.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PackerError;

        if let Some(limit) = self.max_dimension {
            if limit == 0 || !limit.is_power_of_two() {
                return Err(PackerError::InvalidConfig(format!(
                    "max_dimension ({limit}) must be a non-zero power of two"
                )));
            }
        }
        Ok(())
    }

    /// The ceiling the growth loop actually enforces.
    pub fn dimension_limit(&self) -> u32 {
        self.max_dimension.unwrap_or(MAX_ATLAS_DIMENSION)
    }
}

fn default_parallel() -> bool {
    false
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn max_dimension(mut self, v: Option<u32>) -> Self {
        self.cfg.max_dimension = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
