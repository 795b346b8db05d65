//! Engine configuration loaded from environment variables.
//!
//! Every knob has a sensible default so an empty environment yields the
//! documented policy (one shield per rolling week, balance capped at two,
//! one year of recompute lookback).

use std::env;
use std::str::FromStr;

/// Streak engine policy knobs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct StreakConfig {
    /// Maximum shields consumable within any rolling 7-day window.
    pub weekly_shield_cap: u32,
    /// Balance ceiling for the journaling earn-back rule. Purchases may
    /// exceed it; earned shields never push the balance past it.
    pub max_shield_balance: u32,
    /// Bounded lookback window for full recomputation, in days.
    pub recompute_horizon_days: i64,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            weekly_shield_cap: 1,
            max_shield_balance: 2,
            recompute_horizon_days: 365,
        }
    }
}

impl StreakConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing variables fall back to the defaults; unparsable values are
    /// rejected rather than silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        let config = Self {
            weekly_shield_cap: parse_var("STRIDE_WEEKLY_SHIELD_CAP", defaults.weekly_shield_cap)?,
            max_shield_balance: parse_var(
                "STRIDE_MAX_SHIELD_BALANCE",
                defaults.max_shield_balance,
            )?,
            recompute_horizon_days: parse_var(
                "STRIDE_RECOMPUTE_HORIZON_DAYS",
                defaults.recompute_horizon_days,
            )?,
        };

        if config.recompute_horizon_days < 1 {
            return Err(ConfigError::Invalid(
                "STRIDE_RECOMPUTE_HORIZON_DAYS",
                config.recompute_horizon_days.to_string(),
            ));
        }

        Ok(config)
    }
}

/// Parse an optional environment variable, falling back to a default.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
