//! Folding fetched payloads into the published snapshots.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::{
    model::{
        CurrentConditions, DailyForecast, ForecastSnapshot, HourlyForecast, ObservationSnapshot,
        RawDaily, RawForecastPayload, RawHourly, RawObservation, RawWind, Wind,
    },
    normalize::{
        map_condition_code, normalize_precipitation, normalize_temperature, normalize_visibility,
        normalize_wind_speed, scalar_to_f64,
    },
};

/// Observation id for QNH pressure, hPa.
pub const OBSERVATION_PRESSURE: &str = "sqnh";
/// Observation id for relative humidity, percent.
pub const OBSERVATION_HUMIDITY: &str = "su";
/// Observation id for horizontal visibility, meters.
pub const OBSERVATION_VISIBILITY: &str = "svv";

/// Overwrite the fields present in `payload`; everything else is left as is.
///
/// Only the known ids are parsed. A value that is not a number is skipped
/// like a missing one.
pub fn merge_observations(snapshot: &mut ObservationSnapshot, payload: &[RawObservation]) {
    for entry in payload {
        let field = match entry.id.as_str() {
            OBSERVATION_PRESSURE => &mut snapshot.pressure,
            OBSERVATION_HUMIDITY => &mut snapshot.humidity,
            OBSERVATION_VISIBILITY => &mut snapshot.visibility,
            _ => continue,
        };

        let Some(raw) = &entry.value else {
            continue;
        };

        let Some(value) = scalar_to_f64(raw) else {
            warn!(id = %entry.id, value = %raw, "Ignoring non-numeric observation value");
            continue;
        };

        if value < 0.0 {
            warn!(id = %entry.id, value, "Ignoring negative observation value");
            continue;
        }

        *field = Some(match entry.id.as_str() {
            OBSERVATION_VISIBILITY => normalize_visibility(value) / 1000.0,
            _ => value,
        });
    }
}

/// Normalize a forecast payload, dropping entries dated before `now`.
pub fn build_forecast(payload: RawForecastPayload, now: DateTime<Utc>) -> ForecastSnapshot {
    let RawForecastPayload { city, forecast } = payload;

    let current = CurrentConditions {
        condition: map_condition_code(forecast.current.icon.id),
        temperature: normalize_temperature(&forecast.current.temperature.temperature),
        wind: normalize_wind(&forecast.current.wind),
    };

    let hourly: Vec<HourlyForecast> = forecast
        .hourly
        .iter()
        .filter(|h| !is_past(h.date, now))
        .map(hourly_entry)
        .collect();

    let daily: Vec<DailyForecast> = forecast
        .daily
        .iter()
        .filter(|d| !is_past(d.date, now))
        .map(daily_entry)
        .collect();

    debug!(
        city = %city.name,
        hourly = hourly.len(),
        daily = daily.len(),
        "Built forecast snapshot"
    );

    ForecastSnapshot { city, current, hourly, daily, fetched_at: now }
}

fn hourly_entry(raw: &RawHourly) -> HourlyForecast {
    HourlyForecast {
        datetime: raw.date.and_utc(),
        condition: map_condition_code(raw.icon.id),
        temperature: normalize_temperature(&raw.temperature.temperature),
        precipitation: normalize_precipitation(raw.rain.as_deref(), raw.snow.as_deref()),
        wind: normalize_wind(&raw.wind),
    }
}

fn daily_entry(raw: &RawDaily) -> DailyForecast {
    DailyForecast {
        datetime: raw.date.and_utc(),
        condition: map_condition_code(raw.icon.id),
        temperature_max: normalize_temperature(&raw.temperature_max.temperature),
        temperature_min: normalize_temperature(&raw.temperature_min.temperature),
        uv_index: raw.uv_index,
        precipitation: normalize_precipitation(raw.rain.as_deref(), raw.snow.as_deref()),
    }
}

fn normalize_wind(raw: &RawWind) -> Wind {
    Wind {
        speed: normalize_wind_speed(&raw.speed),
        bearing: raw.direction.as_ref().map(ToString::to_string),
        gusts: raw.gusts.as_ref().and_then(normalize_wind_speed),
    }
}

// Timestamps are naive in the payload and interpreted as UTC.
fn is_past(date: NaiveDateTime, now: DateTime<Utc>) -> bool {
    date.and_utc() < now
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{
        City, RawCurrent, RawForecast, RawIcon, RawScalar, RawTemperature, TemperatureValue,
    };
    use chrono::{Duration, TimeZone};

    fn obs(id: &str, value: f64) -> RawObservation {
        RawObservation { id: id.to_string(), value: Some(RawScalar::Number(value)) }
    }

    fn temp(value: f64) -> RawTemperature {
        RawTemperature { temperature: TemperatureValue::Single(RawScalar::Number(value)) }
    }

    fn wind(speed: &str) -> RawWind {
        RawWind {
            speed: RawScalar::Text(speed.to_string()),
            direction: Some(RawScalar::Text("SW".into())),
            gusts: None,
        }
    }

    pub(crate) fn hourly_at(date: DateTime<Utc>, temperature: f64) -> RawHourly {
        RawHourly {
            date: date.naive_utc(),
            icon: RawIcon { id: 1, name: None },
            temperature: temp(temperature),
            wind: wind("5-10"),
            rain: None,
            snow: None,
        }
    }

    pub(crate) fn daily_at(date: DateTime<Utc>) -> RawDaily {
        RawDaily {
            date: date.naive_utc(),
            icon: RawIcon { id: 17, name: None },
            temperature_max: temp(20.0),
            temperature_min: RawTemperature {
                temperature: TemperatureValue::List(vec![
                    RawScalar::Number(8.0),
                    RawScalar::Number(11.0),
                ]),
            },
            uv_index: Some(4.0),
            rain: Some("2-5".into()),
            snow: None,
        }
    }

    pub(crate) fn payload(hourly: Vec<RawHourly>, daily: Vec<RawDaily>) -> RawForecastPayload {
        RawForecastPayload {
            city: City { id: Some(1), name: "Luxembourg".into(), lat: 49.61, long: 6.13 },
            forecast: RawForecast {
                current: RawCurrent {
                    icon: RawIcon { id: 3, name: Some("Partly cloudy".into()) },
                    temperature: RawTemperature {
                        temperature: TemperatureValue::List(vec![
                            RawScalar::Number(12.0),
                            RawScalar::Number(18.0),
                        ]),
                    },
                    wind: RawWind {
                        speed: RawScalar::Text("10-20".into()),
                        direction: Some(RawScalar::Text("W".into())),
                        gusts: Some(RawScalar::Text("45".into())),
                    },
                },
                hourly,
                daily,
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn observation_fields_are_sticky() {
        let mut snapshot = ObservationSnapshot { pressure: Some(1013.0), ..Default::default() };

        merge_observations(&mut snapshot, &[obs(OBSERVATION_HUMIDITY, 81.0)]);

        assert_eq!(snapshot.pressure, Some(1013.0));
        assert_eq!(snapshot.humidity, Some(81.0));
        assert_eq!(snapshot.visibility, None);
    }

    #[test]
    fn unknown_ids_and_missing_values_are_ignored() {
        let mut snapshot = ObservationSnapshot { humidity: Some(50.0), ..Default::default() };

        merge_observations(
            &mut snapshot,
            &[
                obs("stt", 17.2),
                RawObservation { id: OBSERVATION_HUMIDITY.into(), value: None },
            ],
        );

        assert_eq!(snapshot, ObservationSnapshot { humidity: Some(50.0), ..Default::default() });
    }

    #[test]
    fn visibility_sentinel_becomes_ten_kilometers() {
        let mut snapshot = ObservationSnapshot::default();

        merge_observations(&mut snapshot, &[obs(OBSERVATION_VISIBILITY, 9999.0)]);
        assert_eq!(snapshot.visibility, Some(10.0));

        merge_observations(&mut snapshot, &[obs(OBSERVATION_VISIBILITY, 250.0)]);
        assert_eq!(snapshot.visibility, Some(0.25));
    }

    #[test]
    fn negative_observation_keeps_previous_value() {
        let mut snapshot = ObservationSnapshot { pressure: Some(1009.0), ..Default::default() };

        merge_observations(&mut snapshot, &[obs(OBSERVATION_PRESSURE, -1.0)]);

        assert_eq!(snapshot.pressure, Some(1009.0));
    }

    #[test]
    fn non_numeric_values_do_not_reject_the_payload() {
        let payload: Vec<RawObservation> = serde_json::from_value(serde_json::json!([
            { "id": "sqnh", "value": 1018.0 },
            { "id": "ww", "value": "RA" },
            { "id": "su", "value": "n/a" },
            { "id": "svv", "value": "9999" }
        ]))
        .unwrap();
        let mut snapshot = ObservationSnapshot { humidity: Some(64.0), ..Default::default() };

        merge_observations(&mut snapshot, &payload);

        assert_eq!(snapshot.pressure, Some(1018.0));
        assert_eq!(snapshot.humidity, Some(64.0));
        assert_eq!(snapshot.visibility, Some(10.0));
    }

    #[test]
    fn numeric_wind_speed_and_gust_ranges() {
        let mut raw = payload(vec![], vec![]);
        raw.forecast.current.wind = serde_json::from_value(serde_json::json!({
            "direction": "N", "speed": 15, "gusts": "40-60"
        }))
        .unwrap();

        let snapshot = build_forecast(raw, now());

        assert_eq!(snapshot.current.wind.speed, Some(15.0));
        assert_eq!(snapshot.current.wind.gusts, Some(60.0));
    }

    #[test]
    fn forecast_current_is_normalized() {
        let snapshot = build_forecast(payload(vec![], vec![]), now());

        assert_eq!(snapshot.city.name, "Luxembourg");
        assert_eq!(snapshot.current.temperature, Some(18.0));
        assert_eq!(snapshot.current.condition, Some(crate::model::ConditionTag::PartlyCloudy));
        assert_eq!(snapshot.current.wind.speed, Some(20.0));
        assert_eq!(snapshot.current.wind.gusts, Some(45.0));
        assert_eq!(snapshot.current.wind.bearing.as_deref(), Some("W"));
        assert_eq!(snapshot.fetched_at, now());
    }

    #[test]
    fn past_entries_are_dropped() {
        let hourly = vec![
            hourly_at(now() - Duration::hours(1), 10.0),
            hourly_at(now(), 11.0),
            hourly_at(now() + Duration::hours(1), 12.0),
        ];
        let daily = vec![daily_at(now() - Duration::days(1)), daily_at(now() + Duration::days(1))];

        let snapshot = build_forecast(payload(hourly, daily), now());

        let temps: Vec<_> = snapshot.hourly.iter().map(|h| h.temperature).collect();
        assert_eq!(temps, vec![Some(11.0), Some(12.0)]);
        assert_eq!(snapshot.hourly[0].datetime, now());

        assert_eq!(snapshot.daily.len(), 1);
        let day = &snapshot.daily[0];
        assert_eq!(day.temperature_max, Some(20.0));
        assert_eq!(day.temperature_min, Some(11.0));
        assert_eq!(day.precipitation, Some(5.0));
        assert_eq!(day.uv_index, Some(4.0));
        assert_eq!(day.condition, Some(crate::model::ConditionTag::Rainy));
    }

    #[test]
    fn hourly_precipitation_defaults_to_zero() {
        let snapshot = build_forecast(payload(vec![hourly_at(now(), 9.0)], vec![]), now());

        assert_eq!(snapshot.hourly[0].precipitation, Some(0.0));
        assert_eq!(snapshot.hourly[0].wind.speed, Some(10.0));
    }
}
