//! Configuration management for the practice session core
//!
//! This module provides runtime configuration loading from JSON files so the
//! tick cadence, drill phrase pool, speech rates and onboarding storage can
//! be adjusted without recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::practice::drill::DEFAULT_DRILL_PHRASES;
use crate::practice::{find_language, DrillPhrasePool, DEFAULT_LANGUAGE_TAG};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub drill: DrillConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub onboarding: OnboardingConfig,
}

/// Session lifecycle parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Recording timer period in milliseconds
    pub tick_interval_ms: u64,
    /// Language selected when a session screen opens
    pub default_language: String,
    /// Completed attempts kept in the practice history
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            default_language: DEFAULT_LANGUAGE_TAG.to_string(),
            history_capacity: 20,
        }
    }
}

/// Drill phrase selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Phrase pool for drill mode
    pub phrases: Vec<String>,
    /// Optional RNG seed for reproducible drill sequences
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_DRILL_PHRASES.iter().map(|p| p.to_string()).collect(),
            seed: None,
        }
    }
}

/// Text-to-speech playback rates for the listen controls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub normal_rate: f32,
    pub slow_rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            normal_rate: 0.5,
            slow_rate: 0.01,
        }
    }
}

/// Onboarding flag storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub flag_path: PathBuf,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            flag_path: PathBuf::from("onboarding_state.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing, is not
    /// valid JSON, or fails validation.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                Ok(config) => match config.validate() {
                    Ok(()) => {
                        log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                        config
                    }
                    Err(reason) => {
                        log::warn!(
                            "[Config] Invalid configuration in {:?}: {}. Using defaults.",
                            path.as_ref(),
                            reason
                        );
                        Self::default()
                    }
                },
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/practice_config.json")
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), String> {
        if self.session.tick_interval_ms == 0 {
            return Err("session.tick_interval_ms must be greater than 0".to_string());
        }
        if find_language(&self.session.default_language).is_none() {
            return Err(format!(
                "session.default_language {} is not supported",
                self.session.default_language
            ));
        }
        if !(self.speech.normal_rate > 0.0 && self.speech.slow_rate > 0.0) {
            return Err("speech rates must be positive".to_string());
        }
        self.drill_pool().map(|_| ()).map_err(|err| err.to_string())
    }

    /// Drill phrase pool built from `drill.phrases`
    pub fn drill_pool(&self) -> Result<DrillPhrasePool, crate::error::SessionError> {
        DrillPhrasePool::new(self.drill.phrases.iter().cloned())
    }
}
