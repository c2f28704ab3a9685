use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::UnitChoice;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "RMSD_PLOTTER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// PlotterConfig
// ---------------------------------------------------------------------------

/// User-tunable settings. Every field is optional in the JSON file.
///
/// ```json
/// { "default_unit": "nanometer", "export_dpi": 600 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotterConfig {
    /// Unit selected when the app starts.
    pub default_unit: UnitChoice,
    /// Resolution of the downloaded PNG.
    pub export_dpi: u32,
    /// Figure size in inches, excluding the legend placed to its right.
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    /// Padding kept around the drawn content when cropping the export.
    pub tight_pad_in: f64,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            default_unit: UnitChoice::Angstrom,
            export_dpi: 1200,
            figure_width_in: 10.0,
            figure_height_in: 6.0,
            tight_pad_in: 0.1,
        }
    }
}

impl PlotterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let config: PlotterConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path_ref.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else from [`CONFIG_ENV_VAR`], else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export_dpi == 0 {
            return Err(ConfigError::Invalid("export_dpi must be positive".into()));
        }
        for (name, value) in [
            ("figure_width_in", self.figure_width_in),
            ("figure_height_in", self.figure_height_in),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.tight_pad_in.is_finite() && self.tight_pad_in >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tight_pad_in must not be negative, got {}",
                self.tight_pad_in
            )));
        }
        Ok(())
    }
}
