//! Viewer configuration, read from a YAML file.
//!
//! Every key is optional; CLI flags take precedence over the file. A missing
//! file at the default location means "use the defaults", while a file named
//! explicitly must exist and parse.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::timelapse::Timelapse;

/// Where the viewer looks for its configuration unless told otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "gibsview.yaml";

/// Where annotations are persisted unless the config or a flag says
/// otherwise.
pub const DEFAULT_ANNOTATIONS_PATH: &str = "gibsview-annotations.json";

/// A convenience [`Result`] for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from loading the configuration file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {0}", path = .1.display())]
    Read(#[source] std::io::Error, PathBuf),

    /// The file is not valid viewer configuration YAML.
    #[error("invalid config {path}: {0}", path = .1.display())]
    Parse(#[source] serde_yaml::Error, PathBuf),
}

/// The viewer's file configuration. All keys are optional.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// File holding the persisted annotation list.
    pub annotations_file: Option<PathBuf>,
    /// Tile service root used instead of the public GIBS endpoint.
    pub base_url: Option<String>,
    /// Layer selected at startup instead of the first catalog entry.
    pub start_layer: Option<String>,
    /// Time-lapse playback timing.
    #[serde(default)]
    pub timelapse: TimelapseConfig,
}

impl ViewerConfig {
    /// Reads and parses `path`.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(e, path.to_path_buf()))?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e, path.to_path_buf()))
    }

    /// Loads `path` when given, otherwise the default location. A missing
    /// file at the default location yields the defaults; a missing file
    /// named explicitly is an error.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            info!("using config {}", path.display());
            return Self::from_file(path);
        }
        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            info!("using config {DEFAULT_CONFIG_PATH}");
            Self::from_file(default)
        } else {
            Ok(Self::default())
        }
    }
}

/// Time-lapse timing keys; unset keys fall back to the playback defaults.
#[serde_with::skip_serializing_none]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelapseConfig {
    /// Delay between frames, in milliseconds.
    pub interval_ms: Option<u64>,
    /// Total running time, in milliseconds.
    pub duration_ms: Option<u64>,
}

impl TimelapseConfig {
    /// The configured playback timing, with defaults filled in.
    #[must_use]
    pub fn timelapse(&self) -> Timelapse {
        let defaults = Timelapse::default();
        Timelapse::new(
            self.interval_ms.map_or(defaults.interval, Duration::from_millis),
            self.duration_ms.map_or(defaults.duration, Duration::from_millis),
        )
    }
}
