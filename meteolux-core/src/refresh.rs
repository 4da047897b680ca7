//! Periodic refresh of one configured location.
//!
//! A [`RefreshCycle`] owns the only mutable copy of the location's state. Each
//! cycle fetches observations, then the forecast, and publishes the outcome on
//! a `watch` channel. Readers never mutate what they receive.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::LocationConfig,
    merge::{build_forecast, merge_observations},
    model::{ForecastSnapshot, ObservationSnapshot, WeatherState},
    provider::{FetchError, MeteoLuxApi},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPhase {
    #[default]
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backing API returned an error or was unreachable.
    RemoteService,
    /// Anything else, such as a malformed response.
    Unexpected,
}

/// A failed refresh cycle, as surfaced to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("update failed: {reason}")]
pub struct UpdateFailed {
    pub kind: FailureKind,
    pub reason: String,
}

/// Remote failures are logged as a one-line summary, anything else with the
/// full error chain.
fn log_failure(location: &str, err: FetchError) -> UpdateFailed {
    match err {
        FetchError::Remote(message) => {
            warn!(location, "Error fetching MeteoLux data: {message}");
            UpdateFailed {
                kind: FailureKind::RemoteService,
                reason: format!("Error fetching MeteoLux data: {message}"),
            }
        }
        FetchError::Unexpected(err) => {
            error!(location, "Unexpected error fetching MeteoLux data: {err:?}");
            UpdateFailed {
                kind: FailureKind::Unexpected,
                reason: format!("Unexpected error: {err}"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshResult {
    Success { at: DateTime<Utc> },
    Failed(UpdateFailed),
}

pub struct RefreshCycle {
    location: LocationConfig,
    language: String,
    interval: Duration,
    api: Arc<dyn MeteoLuxApi>,
    observation: ObservationSnapshot,
    tx: watch::Sender<WeatherState>,
}

impl std::fmt::Debug for RefreshCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCycle")
            .field("location", &self.location)
            .field("language", &self.language)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl RefreshCycle {
    pub fn new(
        location: LocationConfig,
        language: impl Into<String>,
        interval: Duration,
        api: Arc<dyn MeteoLuxApi>,
    ) -> Self {
        let (tx, _rx) = watch::channel(WeatherState::default());

        Self {
            location,
            language: language.into(),
            interval,
            api,
            observation: ObservationSnapshot::default(),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.tx.subscribe()
    }

    /// Latest published state.
    pub fn state(&self) -> WeatherState {
        self.tx.borrow().clone()
    }

    /// Run one cycle at the current time.
    pub async fn refresh(&mut self) -> Result<(), UpdateFailed> {
        self.refresh_at(Utc::now()).await
    }

    /// Run one cycle, treating `now` as the refresh time.
    ///
    /// On failure the previous forecast stays visible. Observation fields
    /// updated earlier in the same cycle stay visible too.
    pub async fn refresh_at(&mut self, now: DateTime<Utc>) -> Result<(), UpdateFailed> {
        self.tx.send_modify(|state| state.phase = RefreshPhase::Fetching);
        debug!(location = %self.location.name, "Refreshing MeteoLux data");

        match self.fetch(now).await {
            Ok(forecast) => {
                let forecast = Arc::new(forecast);
                let observation = self.observation;
                self.tx.send_modify(|state| {
                    state.observation = observation;
                    state.forecast = Some(forecast);
                    state.phase = RefreshPhase::Idle;
                    state.last_result = Some(RefreshResult::Success { at: now });
                });
                Ok(())
            }
            Err(err) => {
                let failed = log_failure(&self.location.name, err);
                let observation = self.observation;
                self.tx.send_modify(|state| {
                    state.observation = observation;
                    state.phase = RefreshPhase::Idle;
                    state.last_result = Some(RefreshResult::Failed(failed.clone()));
                });
                Err(failed)
            }
        }
    }

    async fn fetch(&mut self, now: DateTime<Utc>) -> Result<ForecastSnapshot, FetchError> {
        let observations = self.api.fetch_observations(self.location.city_id).await?;
        merge_observations(&mut self.observation, &observations);

        let payload = self
            .api
            .fetch_forecast(&self.language, self.location.latitude, self.location.longitude)
            .await?;

        Ok(build_forecast(payload, now))
    }

    /// First refresh at setup; the location is not usable if it fails.
    pub async fn first_refresh(&mut self) -> Result<(), UpdateFailed> {
        self.refresh().await?;
        info!(location = %self.location.name, "Initial MeteoLux data loaded");
        Ok(())
    }

    /// Refresh on a fixed interval until the task is dropped or aborted.
    ///
    /// The first tick fires one interval from now; call
    /// [`first_refresh`](Self::first_refresh) beforehand for an immediate
    /// update.
    pub async fn run(mut self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(err) = self.refresh().await {
                debug!(location = %self.location.name, "{err}");
            }
        }
    }
}
