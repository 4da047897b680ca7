use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{Bookmark, RawForecastPayload, RawObservation};

pub mod meteolux;

pub use meteolux::MeteoLuxClient;

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service returned an error or could not be reached.
    #[error("{0}")]
    Remote(String),

    /// Anything else, e.g. a response body of unexpected shape.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl FetchError {
    pub fn remote(message: impl Into<String>) -> Self {
        FetchError::Remote(message.into())
    }
}

/// The remote MeteoLux service, as far as the refresh pipeline needs it.
#[async_trait]
pub trait MeteoLuxApi: Send + Sync + Debug {
    /// Latest ground observations near `location_id`.
    async fn fetch_observations(&self, location_id: i64) -> Result<Vec<RawObservation>, FetchError>;

    /// Current conditions and hourly/daily forecast for a coordinate.
    async fn fetch_forecast(
        &self,
        language: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawForecastPayload, FetchError>;

    /// Locations offered during setup.
    async fn fetch_location_bookmarks(&self, language: &str) -> Result<Vec<Bookmark>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_message_only() {
        let err = FetchError::remote("status 503");
        assert_eq!(err.to_string(), "status 503");
    }

    #[test]
    fn unexpected_error_wraps_anyhow() {
        let err: FetchError = anyhow::anyhow!("bad shape").into();
        assert!(matches!(err, FetchError::Unexpected(_)));
        assert_eq!(err.to_string(), "bad shape");
    }
}
