use std::fmt::Write;

use meteolux_core::{
    RefreshResult, SensorKind, WeatherState, WeatherView,
    presentation::NATIVE_UNITS,
};

fn fmt_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => "n/a".to_string(),
    }
}

/// Human-readable summary of one location.
pub fn render(state: &WeatherState) -> String {
    let view = WeatherView::new(state);
    let mut out = String::new();

    let _ = writeln!(out, "{}", view.name().unwrap_or("Unknown location"));
    let _ = writeln!(
        out,
        "  Condition:   {}",
        view.condition().map(|c| c.as_str()).unwrap_or("unknown")
    );
    let _ = writeln!(
        out,
        "  Temperature: {}",
        fmt_value(view.temperature(), NATIVE_UNITS.temperature)
    );
    let _ = writeln!(
        out,
        "  Wind:        {} {} (gusts {})",
        fmt_value(view.wind_speed(), NATIVE_UNITS.wind_speed),
        view.wind_bearing().unwrap_or(""),
        fmt_value(view.wind_gust_speed(), NATIVE_UNITS.wind_speed),
    );
    for kind in [SensorKind::Pressure, SensorKind::Humidity] {
        let label = format!("{}:", kind.name());
        let _ = writeln!(out, "  {label:<12} {}", fmt_value(kind.value(state), kind.unit()));
    }
    let _ = writeln!(
        out,
        "  Visibility:  {}",
        fmt_value(view.visibility(), NATIVE_UNITS.visibility)
    );

    for day in view.forecast_daily() {
        let _ = writeln!(
            out,
            "  {}  {:<15} {} / {}  precip {}",
            day.datetime.get(..10).unwrap_or(&day.datetime),
            day.condition.map(|c| c.as_str()).unwrap_or("unknown"),
            fmt_value(day.templow, NATIVE_UNITS.temperature),
            fmt_value(day.temperature, NATIVE_UNITS.temperature),
            fmt_value(day.precipitation, NATIVE_UNITS.precipitation),
        );
    }

    if let Some(RefreshResult::Failed(failed)) = &state.last_result {
        let _ = writeln!(out, "  ! {failed} (showing last known data)");
    }
    let _ = writeln!(out, "  {}", view.attribution());

    out
}

pub fn render_hourly(state: &WeatherState) -> String {
    let mut out = String::new();
    for hour in WeatherView::new(state).forecast_hourly() {
        let _ = writeln!(
            out,
            "  {}  {:<15} {}  wind {}  precip {}",
            hour.datetime.get(..16).unwrap_or(&hour.datetime),
            hour.condition.map(|c| c.as_str()).unwrap_or("unknown"),
            fmt_value(hour.temperature, NATIVE_UNITS.temperature),
            fmt_value(hour.wind_speed, NATIVE_UNITS.wind_speed),
            fmt_value(hour.precipitation, NATIVE_UNITS.precipitation),
        );
    }
    out
}
