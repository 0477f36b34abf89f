use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Precision, DEFAULT_DISCOUNT};

/// Where the model files live and how they are interpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub summary_path: PathBuf,
    pub rewards_path: PathBuf,
    pub transitions_path: PathBuf,
    /// Plain MDP mode: environments are merged into a single profile
    #[serde(default)]
    pub environments_disabled: bool,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default = "default_discount")]
    pub discount: f64,
    /// Seed for the session sampler; `None` draws one from the OS
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_discount() -> f64 {
    DEFAULT_DISCOUNT
}

impl ModelConfig {
    /// `<base>.summary`, `<base>.rewards` and `<base>.transitions`
    pub fn from_base_name(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            summary_path: with_suffix(base, "summary"),
            rewards_path: with_suffix(base, "rewards"),
            transitions_path: with_suffix(base, "transitions"),
            environments_disabled: false,
            precision: Precision::Standard,
            discount: DEFAULT_DISCOUNT,
            seed: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var("RECOMODEL_BASE").map_err(|_| ConfigError::Missing {
            key: "RECOMODEL_BASE",
        })?;

        let mut config = Self::from_base_name(base);
        config.environments_disabled = env_bool("RECOMODEL_MDP", false);
        config.precision = if env_bool("RECOMODEL_PRECISE", false) {
            Precision::Compensated
        } else {
            Precision::Standard
        };
        config.discount = env_f64("RECOMODEL_DISCOUNT", DEFAULT_DISCOUNT);
        config.seed = std::env::var("RECOMODEL_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_environments_disabled(mut self, disabled: bool) -> Self {
        self.environments_disabled = disabled;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.discount.is_finite() || self.discount <= 0.0 || self.discount > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "discount must be in (0, 1], got {}",
                self.discount
            )));
        }
        Ok(())
    }
}

/// Log filter for `logging::init_tracing`, `RECOMODEL_LOG` then `RUST_LOG`
pub fn log_level_from_env() -> String {
    std::env::var("RECOMODEL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(default)
}
