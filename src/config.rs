//! Simulation configuration.
//!
//! A simulation file is YAML with camelCase keys:
//!
//! ```yaml
//! goal: "Buy the cheapest toaster"
//! startUrl: "https://shop.example/"
//! maxSteps: 25
//! timeScale: 0.5
//! oracle:
//!   model: claude-sonnet-4-20250514
//! personas:
//!   - name: Impatient Ivan
//!     traits: { patience: 0.2, workingMemory: 0.8 }
//!     demographics: { age: 62 }
//! ```
//!
//! Everything is explicit: [`SimulationConfig`] is parsed once,
//! [`JourneyConfig`] is the per-journey slice handed to the orchestrator.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persona::PersonaDefinition;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Upper bound for any configured timeout, in seconds (one day).
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const MODEL_ENV: &str = "PERSONA_JOURNEY_MODEL";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    /// No API key in the file or the environment.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

// ============================================================================
// Oracle settings
// ============================================================================

/// Connection settings for the decision oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OracleSettings {
    pub model: String,
    /// Falls back to `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    /// Network-layer retries on 429/529/5xx.
    pub max_retries: u32,
    pub request_timeout_secs: f64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            max_tokens: 1024,
            temperature: Some(0.7),
            max_retries: 2,
            request_timeout_secs: 120.0,
        }
    }
}

impl OracleSettings {
    pub fn api_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Fill a missing key and override the model.  Blank values are ignored.
    pub fn apply_overrides(&mut self, api_key: Option<String>, model: Option<String>) {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
                self.api_key = Some(key);
            }
        }
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
    }

    /// Overlay `ANTHROPIC_API_KEY` and `PERSONA_JOURNEY_MODEL`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(API_KEY_ENV).ok(), std::env::var(MODEL_ENV).ok());
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("oracle.model must not be empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation("oracle.maxTokens must be > 0".into()));
        }
        if !(self.request_timeout_secs > 0.0 && self.request_timeout_secs <= MAX_TIMEOUT_SECS) {
            return Err(ConfigError::Validation(format!(
                "oracle.requestTimeoutSecs must be within (0, {}]",
                MAX_TIMEOUT_SECS
            )));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::Validation(
                    "oracle.temperature must be within [0, 1]".into(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Journey config
// ============================================================================

/// Per-journey settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyConfig {
    pub goal: String,
    pub start_url: String,
    pub max_steps: u32,
    /// Overrides the persona's patience-based time limit (simulated seconds).
    pub time_limit: Option<f64>,
    pub inter_step_delay_ms: u64,
    /// Real-time factor for suspensions; 0 keeps only the simulated clock.
    pub time_scale: f64,
    pub oracle_timeout_secs: f64,
    /// Attach screenshots to oracle requests.
    pub vision: bool,
}

impl JourneyConfig {
    pub fn new(goal: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            start_url: start_url.into(),
            max_steps: 30,
            time_limit: None,
            inter_step_delay_ms: 500,
            time_scale: 1.0,
            oracle_timeout_secs: 90.0,
            vision: false,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn with_oracle_timeout(mut self, seconds: f64) -> Self {
        self.oracle_timeout_secs = seconds;
        self
    }

    /// Oracle wait, capped at [`MAX_TIMEOUT_SECS`].
    pub fn oracle_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.oracle_timeout_secs.min(MAX_TIMEOUT_SECS))
            .unwrap_or(Duration::from_secs(MAX_TIMEOUT_SECS as u64))
    }

    /// Real duration for `millis` of simulated time.
    pub fn scaled(&self, millis: f64) -> Duration {
        let real = millis * self.time_scale;
        if real.is_finite() && real > 0.0 {
            Duration::try_from_secs_f64(real / 1000.0).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.goal.trim().is_empty() {
            return Err(ConfigError::Validation("goal must not be empty".into()));
        }
        if self.start_url.trim().is_empty() {
            return Err(ConfigError::Validation("startUrl must not be empty".into()));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Validation("maxSteps must be > 0".into()));
        }
        if let Some(limit) = self.time_limit {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ConfigError::Validation("timeLimit must be > 0".into()));
            }
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::Validation(
                "timeScale must be a non-negative number".into(),
            ));
        }
        if !(self.oracle_timeout_secs > 0.0 && self.oracle_timeout_secs <= MAX_TIMEOUT_SECS) {
            return Err(ConfigError::Validation(format!(
                "oracleTimeoutSecs must be within (0, {}]",
                MAX_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Simulation file
// ============================================================================

/// A whole simulation file: one goal, many personas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub goal: String,
    pub start_url: String,
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    #[serde(default)]
    pub time_limit: Option<f64>,
    #[serde(default = "default_inter_step_delay_ms")]
    pub inter_step_delay_ms: u64,
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: f64,
    #[serde(default)]
    pub vision: bool,
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub personas: Vec<PersonaDefinition>,
}

fn default_max_steps() -> u32 {
    30
}

fn default_inter_step_delay_ms() -> u64 {
    500
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_oracle_timeout_secs() -> f64 {
    90.0
}

impl SimulationConfig {
    /// Parse and validate.  No environment overlay.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, overlay the environment, then validate.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.oracle.apply_env();
        config.validate()?;
        log::debug!(
            "Loaded simulation config from {}: {} personas, maxSteps={}",
            path.display(),
            config.personas.len(),
            config.max_steps
        );
        Ok(config)
    }

    /// The per-journey slice.
    pub fn journey_config(&self) -> JourneyConfig {
        JourneyConfig {
            goal: self.goal.clone(),
            start_url: self.start_url.clone(),
            max_steps: self.max_steps,
            time_limit: self.time_limit,
            inter_step_delay_ms: self.inter_step_delay_ms,
            time_scale: self.time_scale,
            oracle_timeout_secs: self.oracle_timeout_secs,
            vision: self.vision,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.journey_config().validate()?;
        self.oracle.validate()?;
        if self.personas.is_empty() {
            return Err(ConfigError::Validation("at least one persona is required".into()));
        }
        if let Some(p) = self.personas.iter().find(|p| p.name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "persona names must not be empty (description: '{}')",
                p.description
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
