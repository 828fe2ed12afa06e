use anyhow::ensure;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::suggest::{EnterPolicy, SelectAction};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub api: ApiSettings,
    pub suggest: SuggestSettings,
    pub poller: PollerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where the analysis server lives and which routes it serves.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub suggestions_path: String,
    pub snapshot_path: String,
    /// Stock detail page, used when a selection navigates
    pub detail_path: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            suggestions_path: "/search-suggestions/".to_string(),
            snapshot_path: "/market-snapshot/".to_string(),
            detail_path: "/stock-detail/".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Autocomplete behaviour for one search input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestSettings {
    /// Quiet window before a lookup is issued
    pub debounce_ms: u64,
    /// Trimmed queries shorter than this never hit the network
    pub min_query_len: usize,
    pub enter_policy: EnterPolicy,
    pub select_action: SelectAction,
    /// Placeholder shown for an empty result list
    pub no_match_text: String,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            min_query_len: 2,
            enter_policy: EnterPolicy::Ignore,
            select_action: SelectAction::Fill,
            no_match_text: "No matching company found".to_string(),
        }
    }
}

/// Market status polling cadence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    /// How often the session window is re-evaluated
    pub evaluate_secs: u64,
    pub open_interval_ms: u64,
    pub closed_interval_ms: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            evaluate_secs: 60,
            open_interval_ms: 3000,
            closed_interval_ms: 30000,
        }
    }
}

impl PollerSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.evaluate_secs > 0, "poller.evaluate_secs must be non-zero");
        ensure!(self.open_interval_ms > 0, "poller.open_interval_ms must be non-zero");
        ensure!(self.closed_interval_ms > 0, "poller.closed_interval_ms must be non-zero");
        Ok(())
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or crash the timers.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.poller.validate()
    }

    /// Like `load`, but a missing file means defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.suggest.debounce_ms, 250);
        assert_eq!(config.suggest.min_query_len, 2);
        assert_eq!(config.poller.open_interval_ms, 3000);
        assert_eq!(config.poller.closed_interval_ms, 30000);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://stocks.example.com"

            [suggest]
            enter_policy = "submit_raw"
            select_action = "navigate"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://stocks.example.com");
        assert_eq!(config.api.snapshot_path, "/market-snapshot/");
        assert_eq!(config.suggest.enter_policy, EnterPolicy::SubmitRaw);
        assert_eq!(config.suggest.select_action, SelectAction::Navigate);
        assert_eq!(config.suggest.debounce_ms, 250);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [suggest]
            enter_policy = "submit_everything"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        for body in [
            "[poller]\nopen_interval_ms = 0",
            "[poller]\nclosed_interval_ms = 0",
            "[poller]\nevaluate_secs = 0",
        ] {
            let err = Config::parse(body).unwrap_err();
            assert!(err.to_string().contains("must be non-zero"), "{}", err);
        }
    }

    #[test]
    fn test_parse_accepts_defaults() {
        let config = Config::parse("[poller]\nopen_interval_ms = 1500").unwrap();
        assert_eq!(config.poller.open_interval_ms, 1500);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_or_default("/nonexistent/stockpulse.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
