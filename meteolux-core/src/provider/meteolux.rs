use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    model::{Bookmark, BookmarkList, RawForecastPayload, RawObservation, RawObservationPayload},
};

use super::{FetchError, MeteoLuxApi};

/// HTTP client for the MeteoLux public API.
#[derive(Debug, Clone)]
pub struct MeteoLuxClient {
    base_url: String,
    http: Client,
}

impl MeteoLuxClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), http })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self.http.get(&url).query(query).send().await.map_err(|err| {
            FetchError::remote(format!("Failed to send request to MeteoLux ({what}): {err}"))
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            FetchError::remote(format!("Failed to read MeteoLux {what} response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::remote(format!(
                "MeteoLux {what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        debug!(what, bytes = body.len(), "Received MeteoLux response");

        let parsed = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse MeteoLux {what} JSON"))?;

        Ok(parsed)
    }
}

#[async_trait]
impl MeteoLuxApi for MeteoLuxClient {
    #[instrument(skip(self))]
    async fn fetch_observations(
        &self,
        location_id: i64,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let payload: RawObservationPayload = self
            .get_json(
                "observations",
                "/metapp/observations",
                &[("city", location_id.to_string())],
            )
            .await?;

        Ok(payload.data)
    }

    #[instrument(skip(self))]
    async fn fetch_forecast(
        &self,
        language: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawForecastPayload, FetchError> {
        self.get_json(
            "forecast",
            "/metapp/weather",
            &[
                ("langcode", language.to_string()),
                ("lat", latitude.to_string()),
                ("long", longitude.to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_location_bookmarks(&self, language: &str) -> Result<Vec<Bookmark>, FetchError> {
        let list: BookmarkList = self
            .get_json("bookmarks", "/metapp/bookmarks", &[("langcode", language.to_string())])
            .await?;

        Ok(list.cities)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
