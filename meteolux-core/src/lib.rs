//! Core library for the `meteolux` CLI.
//!
//! This crate defines:
//! - Normalization of raw MeteoLux field encodings
//! - Merging of observation and forecast fetches into published snapshots
//! - The periodic refresh cycle and the registry of running locations
//! - The remote-service abstraction and its HTTP client
//! - Configuration and read-only presentation views
//!
//! It is used by `meteolux-cli`, but can also be embedded by other hosts.

pub mod config;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod presentation;
pub mod provider;
pub mod refresh;
pub mod registry;

pub use config::{Config, LocationConfig};
pub use model::{ConditionTag, ForecastSnapshot, ObservationSnapshot, WeatherState};
pub use normalize::ParseError;
pub use presentation::{SensorKind, WeatherView};
pub use provider::{FetchError, MeteoLuxApi, MeteoLuxClient};
pub use refresh::{FailureKind, RefreshCycle, RefreshPhase, RefreshResult, UpdateFailed};
pub use registry::{Registry, RegistryError};
