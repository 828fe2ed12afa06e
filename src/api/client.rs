use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::ApiError;
use crate::config::ApiSettings;
use crate::market::StatusSource;
use crate::suggest::{Suggestion, SuggestionSource};

/// Body of the market snapshot endpoint.
///
/// Only `status` and `is_open` drive the poller; the index figures are
/// passed through to the indicator when present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketSnapshot {
    pub status: String,

    /// Server's view of the session, `None` when it could not tell
    #[serde(default)]
    pub is_open: Option<bool>,

    // Percent change on the day
    #[serde(default)]
    pub nifty: Option<f64>,
    #[serde(default)]
    pub sensex: Option<f64>,
    #[serde(default)]
    pub vix: Option<f64>,
    #[serde(default)]
    pub banknifty: Option<f64>,

    #[serde(default)]
    pub nifty_price: Option<f64>,
    #[serde(default)]
    pub sensex_price: Option<f64>,
    #[serde(default)]
    pub vix_price: Option<f64>,
    #[serde(default)]
    pub banknifty_price: Option<f64>,
}

impl MarketSnapshot {
    /// "STALE" and "ERROR" snapshots carry nothing we should show.
    pub fn is_usable(&self) -> bool {
        self.status == "OK"
    }
}

/// HTTP client for the analysis server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    suggestions_url: Url,
    snapshot_url: Url,
    detail_url: Url,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> anyhow::Result<Self> {
        let base = Url::parse(&settings.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            suggestions_url: base.join(&settings.suggestions_path)?,
            snapshot_url: base.join(&settings.snapshot_path)?,
            detail_url: base.join(&settings.detail_path)?,
        })
    }

    /// Detail page URL for a symbol, e.g. `/stock-detail/?company=TCS`.
    pub fn detail_url(&self, symbol: &str) -> Url {
        let mut url = self.detail_url.clone();
        url.query_pairs_mut().append_pair("company", symbol);
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.http.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::BadStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch suggestions for a (trimmed) query
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<Suggestion>, ApiError> {
        let mut url = self.suggestions_url.clone();
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url).await
    }

    /// Fetch the current market snapshot
    pub async fn market_snapshot(&self) -> Result<MarketSnapshot, ApiError> {
        self.get_json(self.snapshot_url.clone()).await
    }
}

#[async_trait]
impl SuggestionSource for ApiClient {
    async fn lookup(&self, query: &str) -> Result<Vec<Suggestion>, ApiError> {
        self.search_suggestions(query).await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn snapshot(&self) -> Result<MarketSnapshot, ApiError> {
        self.market_snapshot().await
    }
}
