//! Runtime configuration.
//!
//! Everything the pipeline needs is resolved from the environment exactly
//! once, before any remote call, into a [`Config`] value that is passed down
//! explicitly. A missing variable is fatal to the whole run.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Production PDC Sentry endpoint, used when `PDC_URL` is not set.
pub const DEFAULT_PDC_API_URL: &str = "https://sentry.pdc.org";

/// Configuration errors, surfaced before any hazard is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected environment variable {0}")]
    MissingEnvVar(&'static str),
}

/// Time-window tuning for derived subscriptions.
///
/// These shift the search window around the hazard, they do not change the
/// reconciliation algorithm. Defaults match the deployed monitoring
/// configuration; tests override them freely.
#[derive(Debug, Clone)]
pub struct SubscriptionWindows {
    /// Lead time subtracted from a hazard's start when opening the window.
    pub start_lead: Duration,
    /// Trailing time added to "now" for the window end. A subscription that
    /// stops being refreshed lapses once this runs out.
    pub end_trail: Duration,
    /// Earliest instant any window may start, regardless of hazard age.
    pub start_floor: DateTime<Utc>,
}

impl Default for SubscriptionWindows {
    fn default() -> Self {
        Self {
            start_lead: Duration::hours(1),
            end_trail: Duration::hours(3),
            start_floor: default_start_floor(),
        }
    }
}

/// 2022-01-01T00:00:00Z.
fn default_start_floor() -> DateTime<Utc> {
    DateTime::from_timestamp(1_640_995_200, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Connection settings for the HyP3 subscriptions API.
#[derive(Debug, Clone)]
pub struct Hyp3Settings {
    pub api_url: String,
    pub earthdata_username: String,
    pub earthdata_password: String,
}

impl Hyp3Settings {
    /// Load HyP3 settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] for any unset or empty
    /// required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: required_env("HYP3_URL")?,
            earthdata_username: required_env("EARTHDATA_USERNAME")?,
            earthdata_password: required_env("EARTHDATA_PASSWORD")?,
        })
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub pdc_api_url: String,
    pub pdc_auth_token: String,
    pub hyp3: Hyp3Settings,
    pub windows: SubscriptionWindows,
}

impl Config {
    /// Load the full configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] for any unset or empty
    /// required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pdc_api_url: optional_env("PDC_URL")
                .unwrap_or_else(|| DEFAULT_PDC_API_URL.to_string()),
            pdc_auth_token: required_env("PDC_HAZARDS_AUTH_TOKEN")?,
            hyp3: Hyp3Settings::from_env()?,
            windows: SubscriptionWindows::default(),
        })
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    optional_env(name).ok_or(ConfigError::MissingEnvVar(name))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_start_floor() {
        let floor = SubscriptionWindows::default().start_floor;
        assert_eq!(floor, Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_required_env_rejects_empty_values() {
        std::env::set_var("FLOOD_MONITOR_TEST_EMPTY_VAR", "");
        let result = required_env("FLOOD_MONITOR_TEST_EMPTY_VAR");
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
        std::env::remove_var("FLOOD_MONITOR_TEST_EMPTY_VAR");
    }
}
