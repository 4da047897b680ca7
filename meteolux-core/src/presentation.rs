//! Read-only projections of a [`WeatherState`] into display values.

use serde::Serialize;

use crate::model::{ConditionTag, DailyForecast, HourlyForecast, WeatherState};

pub const ATTRIBUTION: &str = "Data provided by MeteoLux";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeUnits {
    pub temperature: &'static str,
    pub precipitation: &'static str,
    pub pressure: &'static str,
    pub wind_speed: &'static str,
    pub visibility: &'static str,
}

pub const NATIVE_UNITS: NativeUnits = NativeUnits {
    temperature: "°C",
    precipitation: "mm",
    pressure: "hPa",
    wind_speed: "km/h",
    visibility: "km",
};

/// One forecast row, hourly or daily.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub datetime: String,
    pub condition: Option<ConditionTag>,
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templow: Option<f64>,
    pub precipitation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_bearing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
}

impl From<&HourlyForecast> for ForecastRow {
    fn from(h: &HourlyForecast) -> Self {
        Self {
            datetime: h.datetime.to_rfc3339(),
            condition: h.condition,
            temperature: h.temperature,
            templow: None,
            precipitation: h.precipitation,
            wind_speed: h.wind.speed,
            wind_bearing: h.wind.bearing.clone(),
            uv_index: None,
        }
    }
}

impl From<&DailyForecast> for ForecastRow {
    fn from(d: &DailyForecast) -> Self {
        Self {
            datetime: d.datetime.to_rfc3339(),
            condition: d.condition,
            temperature: d.temperature_max,
            templow: d.temperature_min,
            precipitation: d.precipitation,
            wind_speed: None,
            wind_bearing: None,
            uv_index: d.uv_index,
        }
    }
}

/// The weather entity of a location.
#[derive(Debug, Clone, Copy)]
pub struct WeatherView<'a> {
    state: &'a WeatherState,
}

impl<'a> WeatherView<'a> {
    pub fn new(state: &'a WeatherState) -> Self {
        Self { state }
    }

    pub fn attribution(&self) -> &'static str {
        ATTRIBUTION
    }

    pub fn name(&self) -> Option<&'a str> {
        self.state.forecast.as_deref().map(|f| f.city.name.as_str())
    }

    pub fn unique_id(&self) -> Option<String> {
        self.state.forecast.as_deref().map(|f| format!("{},{}", f.city.lat, f.city.long))
    }

    pub fn condition(&self) -> Option<ConditionTag> {
        self.state.forecast.as_deref().and_then(|f| f.current.condition)
    }

    pub fn temperature(&self) -> Option<f64> {
        self.state.forecast.as_deref().and_then(|f| f.current.temperature)
    }

    pub fn pressure(&self) -> Option<f64> {
        self.state.observation.pressure
    }

    pub fn humidity(&self) -> Option<f64> {
        self.state.observation.humidity
    }

    pub fn visibility(&self) -> Option<f64> {
        self.state.observation.visibility
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.state.forecast.as_deref().and_then(|f| f.current.wind.speed)
    }

    pub fn wind_gust_speed(&self) -> Option<f64> {
        self.state.forecast.as_deref().and_then(|f| f.current.wind.gusts)
    }

    pub fn wind_bearing(&self) -> Option<&'a str> {
        self.state.forecast.as_deref().and_then(|f| f.current.wind.bearing.as_deref())
    }

    pub fn forecast_hourly(&self) -> Vec<ForecastRow> {
        self.state
            .forecast
            .as_deref()
            .map(|f| f.hourly.iter().map(ForecastRow::from).collect())
            .unwrap_or_default()
    }

    pub fn forecast_daily(&self) -> Vec<ForecastRow> {
        self.state
            .forecast
            .as_deref()
            .map(|f| f.daily.iter().map(ForecastRow::from).collect())
            .unwrap_or_default()
    }
}

/// The sensors exposed next to the weather entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Pressure,
    WindSpeed,
    Temperature,
    Humidity,
}

impl SensorKind {
    pub const fn all() -> &'static [SensorKind] {
        &[
            SensorKind::Pressure,
            SensorKind::WindSpeed,
            SensorKind::Temperature,
            SensorKind::Humidity,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            SensorKind::Pressure => "pressure",
            SensorKind::WindSpeed => "wind_speed",
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Pressure => "Pressure",
            SensorKind::WindSpeed => "Wind speed",
            SensorKind::Temperature => "Temperature",
            SensorKind::Humidity => "Humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Pressure => NATIVE_UNITS.pressure,
            SensorKind::WindSpeed => NATIVE_UNITS.wind_speed,
            SensorKind::Temperature => NATIVE_UNITS.temperature,
            SensorKind::Humidity => "%",
        }
    }

    /// Only humidity is shown without opting in.
    pub fn enabled_by_default(&self) -> bool {
        matches!(self, SensorKind::Humidity)
    }

    /// `"<city> <sensor name>"`, once the city is known.
    pub fn display_name(&self, state: &WeatherState) -> Option<String> {
        WeatherView::new(state).name().map(|city| format!("{city} {}", self.name()))
    }

    pub fn unique_id(&self, state: &WeatherState) -> Option<String> {
        WeatherView::new(state).unique_id().map(|id| format!("{id}_{}", self.key()))
    }

    pub fn value(&self, state: &WeatherState) -> Option<f64> {
        let view = WeatherView::new(state);
        match self {
            SensorKind::Pressure => view.pressure(),
            SensorKind::WindSpeed => view.wind_speed(),
            SensorKind::Temperature => view.temperature(),
            SensorKind::Humidity => view.humidity(),
        }
    }
}
