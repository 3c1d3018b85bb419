//! Engine configuration: loaded from ~/.entrain/config.yaml.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dsl::DurationPolicy;

/// Engine settings loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Raise the per-stage limit from 45 to 360 minutes.
    #[serde(default)]
    pub unlimited_duration: bool,
    /// Milliseconds per scheduler tick. One second in normal use.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Where session files are loaded from and saved to.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

/// Standard config path (~/.entrain/config.yaml).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".entrain").join("config.yaml"))
}

/// Default session directory (~/Documents/Binaural/presets).
pub fn default_session_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Binaural")
        .join("presets")
}

impl EngineConfig {
    /// Load from the standard path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        config_path()
            .filter(|p| p.exists())
            .and_then(|p| match Self::load_from(&p) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("ignoring {}: {e}", p.display());
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
        std::fs::write(path, yaml)
    }

    pub fn duration_policy(&self) -> DurationPolicy {
        DurationPolicy::new(self.unlimited_duration)
    }

    /// Tick interval, never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(default_session_dir)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unlimited_duration: false,
            tick_interval_ms: default_tick_interval_ms(),
            session_dir: None,
        }
    }
}
