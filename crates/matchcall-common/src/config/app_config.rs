//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub lifecycle: LifecycleConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// When the "keep chatting" request may be issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatRequestPolicy {
    /// Only once the call has ended
    #[default]
    AfterCall,
    /// During the call, after a minimum elapsed time
    DuringCall { min_elapsed_secs: u64 },
}

/// Tunables of the match lifecycle
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Seconds a match waits for a call before expiring
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u64,
    /// The countdown is shown as urgent below this many seconds
    #[serde(default = "default_urgent_secs")]
    pub urgent_secs: u64,
    /// Mutual match iff the draw exceeds this value
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Seed for the match draw; entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Horizontal displacement that resolves a swipe
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
    /// Largest displacement still treated as a tap
    #[serde(default = "default_tap_slop")]
    pub tap_slop: f64,
    #[serde(default = "default_peer_reply_delay")]
    pub peer_reply_delay: Duration,
    #[serde(default = "default_replenish_delay")]
    pub replenish_delay: Duration,
    #[serde(default)]
    pub chat_request_policy: ChatRequestPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown_secs(),
            urgent_secs: default_urgent_secs(),
            match_threshold: default_match_threshold(),
            rng_seed: None,
            swipe_threshold: default_swipe_threshold(),
            tap_slop: default_tap_slop(),
            peer_reply_delay: default_peer_reply_delay(),
            replenish_delay: default_replenish_delay(),
            chat_request_policy: ChatRequestPolicy::default(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "matchcall".to_string()
}

fn default_countdown_secs() -> u64 {
    300 // 5 minutes
}

fn default_urgent_secs() -> u64 {
    30
}

fn default_match_threshold() -> f64 {
    0.5
}

fn default_swipe_threshold() -> f64 {
    100.0
}

fn default_tap_slop() -> f64 {
    5.0
}

fn default_peer_reply_delay() -> Duration {
    Duration::from_millis(2000)
}

fn default_replenish_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_min_call_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chat_request_policy = match lookup("CHAT_REQUEST_POLICY").as_deref() {
            None | Some("after_call") => ChatRequestPolicy::AfterCall,
            Some("during_call") => ChatRequestPolicy::DuringCall {
                min_elapsed_secs: parse_var(&lookup, "CHAT_REQUEST_MIN_CALL_SECONDS")?
                    .unwrap_or_else(default_min_call_secs),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "CHAT_REQUEST_POLICY",
                    other.to_string(),
                ))
            }
        };

        let match_threshold: f64 = parse_var(&lookup, "MATCH_PROBABILITY_THRESHOLD")?
            .unwrap_or_else(default_match_threshold);
        if !(0.0..=1.0).contains(&match_threshold) {
            return Err(ConfigError::InvalidValue(
                "MATCH_PROBABILITY_THRESHOLD",
                match_threshold.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_var(&lookup, "APP_ENV")?.unwrap_or_default(),
            },
            lifecycle: LifecycleConfig {
                countdown_secs: parse_var(&lookup, "MATCH_COUNTDOWN_SECONDS")?
                    .unwrap_or_else(default_countdown_secs),
                urgent_secs: parse_var(&lookup, "MATCH_URGENT_SECONDS")?
                    .unwrap_or_else(default_urgent_secs),
                match_threshold,
                rng_seed: parse_var(&lookup, "MATCH_RNG_SEED")?,
                swipe_threshold: parse_var(&lookup, "SWIPE_THRESHOLD_PX")?
                    .unwrap_or_else(default_swipe_threshold),
                tap_slop: parse_var(&lookup, "SWIPE_TAP_SLOP_PX")?.unwrap_or_else(default_tap_slop),
                peer_reply_delay: parse_var(&lookup, "PEER_REPLY_DELAY_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or_else(default_peer_reply_delay),
                replenish_delay: parse_var(&lookup, "DECK_REPLENISH_DELAY_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or_else(default_replenish_delay),
                chat_request_policy,
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            let parsed = raw.trim().parse();
            parsed
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue(key, raw))
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
