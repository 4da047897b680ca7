use std::{fmt, sync::Arc};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::refresh::{RefreshPhase, RefreshResult};

// ---------------------------------------------------------------------------
// Raw payloads, as returned by the remote service.
// ---------------------------------------------------------------------------

/// One `{id, value}` pair from the observation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub id: String,
    #[serde(default)]
    pub value: Option<RawScalar>,
}

/// Envelope of the observation endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawObservationPayload {
    #[serde(default)]
    pub data: Vec<RawObservation>,
}

/// A number the API may send either as JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScalar::Number(n) => write!(f, "{n}"),
            RawScalar::Text(s) => f.write_str(s),
        }
    }
}

/// Temperature is either a single reading or a band such as `[morning, afternoon]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemperatureValue {
    List(Vec<RawScalar>),
    Single(RawScalar),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTemperature {
    pub temperature: TemperatureValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIcon {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWind {
    pub speed: RawScalar,
    #[serde(default)]
    pub direction: Option<RawScalar>,
    #[serde(default)]
    pub gusts: Option<RawScalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCurrent {
    pub icon: RawIcon,
    pub temperature: RawTemperature,
    pub wind: RawWind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHourly {
    pub date: NaiveDateTime,
    pub icon: RawIcon,
    pub temperature: RawTemperature,
    pub wind: RawWind,
    #[serde(default)]
    pub rain: Option<String>,
    #[serde(default)]
    pub snow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDaily {
    pub date: NaiveDateTime,
    pub icon: RawIcon,
    pub temperature_max: RawTemperature,
    pub temperature_min: RawTemperature,
    #[serde(default)]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub rain: Option<String>,
    #[serde(default)]
    pub snow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    pub current: RawCurrent,
    #[serde(default)]
    pub hourly: Vec<RawHourly>,
    #[serde(default)]
    pub daily: Vec<RawDaily>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

/// Envelope of the forecast endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPayload {
    pub city: City,
    pub forecast: RawForecast,
}

/// One entry of the bookmark list offered during setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkList {
    #[serde(default)]
    pub cities: Vec<Bookmark>,
}

// ---------------------------------------------------------------------------
// Normalized snapshots, as consumed by the presentation layer.
// ---------------------------------------------------------------------------

/// Human-facing weather condition derived from a raw icon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionTag {
    ClearNight,
    Cloudy,
    Fog,
    Hail,
    Lightning,
    LightningRainy,
    PartlyCloudy,
    Pouring,
    Rainy,
    Snowy,
    SnowyRainy,
    Sunny,
    Windy,
}

impl ConditionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionTag::ClearNight => "clear-night",
            ConditionTag::Cloudy => "cloudy",
            ConditionTag::Fog => "fog",
            ConditionTag::Hail => "hail",
            ConditionTag::Lightning => "lightning",
            ConditionTag::LightningRainy => "lightning-rainy",
            ConditionTag::PartlyCloudy => "partly-cloudy",
            ConditionTag::Pouring => "pouring",
            ConditionTag::Rainy => "rainy",
            ConditionTag::Snowy => "snowy",
            ConditionTag::SnowyRainy => "snowy-rainy",
            ConditionTag::Sunny => "sunny",
            ConditionTag::Windy => "windy",
        }
    }
}

impl fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest ground measurements. Fields are sticky across refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSnapshot {
    /// Hectopascals.
    pub pressure: Option<f64>,
    /// Percent.
    pub humidity: Option<f64>,
    /// Kilometers.
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// km/h, upper bound when the API reports a range.
    pub speed: Option<f64>,
    pub bearing: Option<String>,
    pub gusts: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub condition: Option<ConditionTag>,
    pub temperature: Option<f64>,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub datetime: DateTime<Utc>,
    pub condition: Option<ConditionTag>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub datetime: DateTime<Utc>,
    pub condition: Option<ConditionTag>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub uv_index: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Forecast data for one location, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub city: City,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub fetched_at: DateTime<Utc>,
}

/// Everything published for one configured location.
///
/// The refresh task is the only writer; readers receive clones through a
/// `tokio::sync::watch` channel.
#[derive(Debug, Clone, Default)]
pub struct WeatherState {
    pub observation: ObservationSnapshot,
    /// Last forecast that was fetched successfully, kept across failed cycles.
    pub forecast: Option<Arc<ForecastSnapshot>>,
    pub phase: RefreshPhase,
    pub last_result: Option<RefreshResult>,
}

impl WeatherState {
    pub fn last_update_succeeded(&self) -> bool {
        matches!(self.last_result, Some(RefreshResult::Success { .. }))
    }
}
