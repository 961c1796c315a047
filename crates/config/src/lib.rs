//! Configuration loading, validation, and management for Toron.
//!
//! Loads configuration from `~/.toron/config.toml` with environment
//! variable overrides. Every section falls back to defaults, so an empty
//! or missing file yields a working pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest context window a session may be configured with.
pub const MIN_WINDOW_SIZE: usize = 10;

/// Largest context window a session may be configured with.
pub const MAX_WINDOW_SIZE: usize = 25;

/// The root configuration structure.
///
/// Maps directly to `~/.toron/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Context window sizing
    #[serde(default)]
    pub window: WindowConfig,

    /// Decay coefficients for the sanitized trace
    #[serde(default)]
    pub trace: TraceConfig,

    /// Intent classifier bounds
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Persona decision table thresholds
    #[serde(default)]
    pub persona: PersonaConfig,

    /// State machine guard thresholds
    #[serde(default)]
    pub state: StateConfig,

    /// Log output settings (used by the CLI harness)
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Maximum retained turns; clamped to [10, 25] when the window is built.
    #[serde(default = "default_window_size")]
    pub max_size: usize,
}

fn default_window_size() -> usize {
    MAX_WINDOW_SIZE
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_size: default_window_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Fraction of momentum kept on each update
    #[serde(default = "default_momentum_retention")]
    pub momentum_retention: f64,

    /// Fraction of hallucination risk kept on each update
    #[serde(default = "default_hallucination_retention")]
    pub hallucination_retention: f64,

    /// Fraction of safety weight / agreement kept when blending a new target
    #[serde(default = "default_blend_retention")]
    pub blend_retention: f64,

    /// Seconds for idle decay to halve momentum and risk
    #[serde(default = "default_half_life")]
    pub decay_half_life_secs: f64,

    /// Character limit for scrubbed text fields
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
}

fn default_momentum_retention() -> f64 {
    0.85
}
fn default_hallucination_retention() -> f64 {
    0.75
}
fn default_blend_retention() -> f64 {
    0.7
}
fn default_half_life() -> f64 {
    60.0
}
fn default_text_limit() -> usize {
    toron_core::sanitize::FIELD_LIMIT
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            momentum_retention: default_momentum_retention(),
            hallucination_retention: default_hallucination_retention(),
            blend_retention: default_blend_retention(),
            decay_half_life_secs: default_half_life(),
            text_limit: default_text_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,

    /// How much trace momentum can lift confidence
    #[serde(default = "default_momentum_boost")]
    pub momentum_boost: f64,
}

fn default_min_confidence() -> f64 {
    0.3
}
fn default_max_confidence() -> f64 {
    0.9
}
fn default_momentum_boost() -> f64 {
    0.2
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_confidence: default_max_confidence(),
            momentum_boost: default_momentum_boost(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Complexity above which the "deep" column of the decision table applies
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f64,
}

fn default_complexity_threshold() -> f64 {
    0.5
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: default_complexity_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// idle → thinking when complexity or urgency exceeds this
    #[serde(default = "default_activation")]
    pub activation_threshold: f64,

    /// thinking → processing when complexity exceeds this
    #[serde(default = "default_processing")]
    pub processing_threshold: f64,

    /// exploration → analysis when complexity reaches this
    #[serde(default = "default_analysis")]
    pub analysis_threshold: f64,

    /// analysis → resolution when complexity falls below this
    #[serde(default = "default_resolution")]
    pub resolution_threshold: f64,
}

fn default_activation() -> f64 {
    0.2
}
fn default_processing() -> f64 {
    0.4
}
fn default_analysis() -> f64 {
    0.55
}
fn default_resolution() -> f64 {
    0.25
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation(),
            processing_threshold: default_processing(),
            analysis_threshold: default_analysis(),
            resolution_threshold: default_resolution(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.toron/config.toml).
    ///
    /// Environment overrides:
    /// - `TORON_WINDOW_SIZE`
    /// - `TORON_LOG_LEVEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply the environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".toron")
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(size) = std::env::var("TORON_WINDOW_SIZE") {
            self.window.max_size = size.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "TORON_WINDOW_SIZE must be a positive integer, got '{size}'"
                ))
            })?;
        }

        if let Ok(level) = std::env::var("TORON_LOG_LEVEL") {
            self.logging.level = level;
        }

        self.validate()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("trace.momentum_retention", self.trace.momentum_retention),
            (
                "trace.hallucination_retention",
                self.trace.hallucination_retention,
            ),
            ("trace.blend_retention", self.trace.blend_retention),
            ("classifier.min_confidence", self.classifier.min_confidence),
            ("classifier.max_confidence", self.classifier.max_confidence),
            ("classifier.momentum_boost", self.classifier.momentum_boost),
            (
                "persona.complexity_threshold",
                self.persona.complexity_threshold,
            ),
            ("state.activation_threshold", self.state.activation_threshold),
            ("state.processing_threshold", self.state.processing_threshold),
            ("state.analysis_threshold", self.state.analysis_threshold),
            ("state.resolution_threshold", self.state.resolution_threshold),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }

        if self.classifier.min_confidence > self.classifier.max_confidence {
            return Err(ConfigError::ValidationError(
                "classifier.min_confidence must not exceed max_confidence".into(),
            ));
        }

        let half_life = self.trace.decay_half_life_secs;
        if !half_life.is_finite() || half_life <= 0.0 {
            return Err(ConfigError::ValidationError(
                "trace.decay_half_life_secs must be a positive number".into(),
            ));
        }

        if self.trace.text_limit == 0 {
            return Err(ConfigError::ValidationError(
                "trace.text_limit must be > 0".into(),
            ));
        }

        if self.window.max_size == 0 {
            return Err(ConfigError::ValidationError(
                "window.max_size must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `toron config default`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for toron_core::Error {
    fn from(err: ConfigError) -> Self {
        toron_core::Error::Config {
            message: err.to_string(),
        }
    }
}
