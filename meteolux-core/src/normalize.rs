//! Conversion of raw MeteoLux field encodings into scalar quantities.
//!
//! The API reports several values in loose shapes: ranges such as `"3-7"`,
//! the `9999` visibility sentinel, temperature bands given as lists. Every
//! function here is pure; callers decide whether a parse failure is fatal.

use thiserror::Error;
use tracing::warn;

use crate::model::{ConditionTag, RawScalar, TemperatureValue};

/// Raw visibility value meaning "at or beyond the instrument ceiling".
pub const VISIBILITY_SENTINEL: f64 = 9999.0;

/// Value the sentinel is replaced with, in the raw unit (meters).
pub const VISIBILITY_CAP: f64 = 10000.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {input:?} as a number")]
pub struct ParseError {
    pub input: String,
}

/// Parse `"lo-hi"` as its upper bound, anything else as a plain number.
pub fn normalize_range_or_scalar(raw: &str) -> Result<f64, ParseError> {
    let candidate = raw.split('-').nth(1).unwrap_or(raw);

    candidate.trim().parse::<f64>().map_err(|_| ParseError { input: raw.to_string() })
}

/// Soft-failing variant of [`normalize_range_or_scalar`] for wind speeds and gusts.
pub fn normalize_wind_speed(raw: &RawScalar) -> Option<f64> {
    let text = match raw {
        RawScalar::Number(n) => return Some(*n),
        RawScalar::Text(text) => text,
    };

    match normalize_range_or_scalar(text) {
        Ok(speed) => Some(speed),
        Err(err) => {
            warn!("Could not parse wind speed from API response: {err}");
            None
        }
    }
}

/// Temperature as a scalar; for a band the second element is authoritative.
///
/// Returns `None` (with a warning) when no number can be extracted.
pub fn normalize_temperature(raw: &TemperatureValue) -> Option<f64> {
    let value = match raw {
        TemperatureValue::List(items) => items.get(1),
        TemperatureValue::Single(scalar) => Some(scalar),
    };

    match value.and_then(scalar_to_f64) {
        Some(temp) => Some(temp),
        None => {
            warn!("Could not parse temperature from API response: {raw:?}");
            None
        }
    }
}

pub fn normalize_visibility(raw: f64) -> f64 {
    if raw == VISIBILITY_SENTINEL {
        VISIBILITY_CAP
    } else {
        raw
    }
}

/// Precipitation from the alternative rain/snow encodings of one event.
///
/// Both missing means "no precipitation" (`0.0`), not "unknown".
pub fn normalize_precipitation(rain: Option<&str>, snow: Option<&str>) -> Option<f64> {
    let rain = rain.filter(|s| !s.is_empty());
    let snow = snow.filter(|s| !s.is_empty());

    if rain.is_none() && snow.is_none() {
        return Some(0.0);
    }

    rain.and_then(|r| normalize_range_or_scalar(r).ok())
        .or_else(|| snow.and_then(|s| normalize_range_or_scalar(s).ok()))
}

/// Classify a MeteoLux icon code. Unknown codes have no condition.
pub fn map_condition_code(icon_id: i64) -> Option<ConditionTag> {
    let tag = match icon_id {
        0 | 6 | 7 | 11 | 16 | 46 => ConditionTag::ClearNight,
        4 | 5 | 10 => ConditionTag::Cloudy,
        14 | 15 => ConditionTag::Fog,
        28 | 29 | 35 | 41 => ConditionTag::Hail,
        42 | 47 | 57 => ConditionTag::Lightning,
        48..=53 | 58 | 59 => ConditionTag::LightningRainy,
        2 | 3 | 8 | 9 => ConditionTag::PartlyCloudy,
        17..=23 | 30 | 31 | 36 | 37 => ConditionTag::Rainy,
        25 | 26 | 33 | 34 | 39 | 40 => ConditionTag::Snowy,
        24 | 27 | 32 | 38 | 43 | 44 | 45 => ConditionTag::SnowyRainy,
        1 => ConditionTag::Sunny,
        54 => ConditionTag::Windy,
        _ => return None,
    };

    Some(tag)
}

pub(crate) fn scalar_to_f64(scalar: &RawScalar) -> Option<f64> {
    match scalar {
        RawScalar::Number(n) => Some(*n),
        RawScalar::Text(s) => s.trim().parse().ok(),
    }
}
