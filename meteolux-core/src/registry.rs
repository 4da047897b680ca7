//! Set-up and tear-down of per-location refresh tasks.

use std::{collections::HashMap, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::info;

use crate::{
    config::{Config, LocationConfig},
    model::WeatherState,
    provider::MeteoLuxApi,
    refresh::{RefreshCycle, UpdateFailed},
};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("location '{0}' is already set up")]
    AlreadySetUp(String),

    #[error("location '{0}' is not set up")]
    NotSetUp(String),

    #[error("setting up location '{key}' failed: {source}")]
    SetupFailed {
        key: String,
        #[source]
        source: UpdateFailed,
    },
}

#[derive(Debug)]
struct Entry {
    location: LocationConfig,
    state: watch::Receiver<WeatherState>,
    task: JoinHandle<()>,
}

/// Running refresh cycles keyed by location key.
#[derive(Debug)]
pub struct Registry {
    api: Arc<dyn MeteoLuxApi>,
    language: String,
    interval: Duration,
    entries: HashMap<String, Entry>,
}

impl Registry {
    pub fn new(api: Arc<dyn MeteoLuxApi>, language: impl Into<String>, interval: Duration) -> Self {
        Self { api, language: language.into(), interval, entries: HashMap::new() }
    }

    pub fn from_config(api: Arc<dyn MeteoLuxApi>, config: &Config) -> Self {
        Self::new(api, config.language.clone(), config.scan_interval())
    }

    /// Run the first refresh for `location`, then keep it refreshing in the
    /// background. Must be called from within a tokio runtime.
    pub async fn setup(
        &mut self,
        key: &str,
        location: LocationConfig,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(key) {
            return Err(RegistryError::AlreadySetUp(key.to_string()));
        }

        let mut cycle = RefreshCycle::new(
            location.clone(),
            self.language.clone(),
            self.interval,
            self.api.clone(),
        );
        cycle
            .first_refresh()
            .await
            .map_err(|source| RegistryError::SetupFailed { key: key.to_string(), source })?;

        let state = cycle.subscribe();
        let task = tokio::spawn(cycle.run());

        info!(key, location = %location.name, "Location set up");
        self.entries.insert(key.to_string(), Entry { location, state, task });
        Ok(())
    }

    /// Stop refreshing `key`. An in-flight fetch is abandoned.
    pub fn unload(&mut self, key: &str) -> Result<(), RegistryError> {
        let entry =
            self.entries.remove(key).ok_or_else(|| RegistryError::NotSetUp(key.to_string()))?;
        entry.task.abort();
        info!(key, location = %entry.location.name, "Location unloaded");
        Ok(())
    }

    pub fn unload_all(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.task.abort();
        }
    }

    pub fn state(&self, key: &str) -> Option<watch::Receiver<WeatherState>> {
        self.entries.get(key).map(|entry| entry.state.clone())
    }

    pub fn location(&self, key: &str) -> Option<&LocationConfig> {
        self.entries.get(key).map(|entry| &entry.location)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.unload_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        merge::{OBSERVATION_PRESSURE, tests::payload},
        model::{RawObservation, RawScalar},
        provider::FetchError,
        refresh::tests::{FakeApi, location},
    };

    fn registry(api: &Arc<FakeApi>) -> Registry {
        Registry::new(api.clone(), "en", Duration::from_secs(900))
    }

    fn queue_success(api: &FakeApi) {
        api.push_observations(Ok(vec![RawObservation {
            id: OBSERVATION_PRESSURE.into(),
            value: Some(RawScalar::Number(1020.0)),
        }]));
        api.push_forecast(Ok(payload(vec![], vec![])));
    }

    #[tokio::test]
    async fn setup_exposes_state_and_unload_removes_it() {
        let api = Arc::new(FakeApi::default());
        queue_success(&api);

        let mut registry = registry(&api);
        registry.setup("lux", location()).await.unwrap();

        let rx = registry.state("lux").unwrap();
        assert_eq!(rx.borrow().observation.pressure, Some(1020.0));
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["lux"]);
        assert_eq!(registry.location("lux"), Some(&location()));

        registry.unload("lux").unwrap();
        assert!(registry.state("lux").is_none());
        assert!(registry.is_empty());
        assert!(matches!(registry.unload("lux"), Err(RegistryError::NotSetUp(_))));
    }

    #[tokio::test]
    async fn duplicate_setup_is_rejected() {
        let api = Arc::new(FakeApi::default());
        queue_success(&api);

        let mut registry = registry(&api);
        registry.setup("lux", location()).await.unwrap();

        let err = registry.setup("lux", location()).await.unwrap_err();
        assert!(matches!(err, RegistryError::AlreadySetUp(key) if key == "lux"));
    }

    #[tokio::test]
    async fn failed_first_refresh_does_not_register() {
        let api = Arc::new(FakeApi::default());
        api.push_observations(Err(FetchError::remote("down")));

        let mut registry = registry(&api);
        let err = registry.setup("lux", location()).await.unwrap_err();

        assert!(err.to_string().contains("update failed"));
        assert!(registry.is_empty());
    }
}
