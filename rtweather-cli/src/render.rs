use std::fmt::Display;

use rtweather_core::{Reading, RequestState, WeatherRecord};

pub fn state(state: &RequestState) -> String {
    match state {
        RequestState::Loading => "Loading...".to_string(),
        RequestState::Success(record) => details(record),
        RequestState::Error(message) => format!("Error: {message}"),
    }
}

/// Header, big temperature and the detail rows, like the app's detail card.
pub fn details(data: &WeatherRecord) -> String {
    let current = &data.current;
    let mut out = String::new();

    out.push_str(&format!("{}, {}\n", data.location.name, data.location.country));
    if let Some(localtime) = &data.location.localtime {
        out.push_str(&format!("Local time: {localtime}\n"));
    }
    out.push('\n');
    out.push_str(&format!("  {:.1}°C  {}\n", current.temp_c, current.condition.text));
    out.push_str(&format!("  {}\n\n", current.condition.icon_url()));

    let rows: [(&str, String); 12] = [
        ("Humidity", format!("{}%", current.humidity)),
        ("Wind", format!("{} km/h", current.wind_kph)),
        ("Pressure", format!("{} mb", current.pressure_mb)),
        ("UV", current.uv.to_string()),
        ("Feels like", celsius(&current.feelslike_c)),
        ("Wind chill", optional_celsius(current.windchill_c.as_ref())),
        ("Heat index", optional_celsius(current.heatindex_c.as_ref())),
        ("Dew point", optional_celsius(current.dewpoint_c.as_ref())),
        ("Wind direction", current.wind_dir.clone()),
        ("Wind gust", format!("{} km/h", current.gust_kph)),
        ("Cloud", format!("{}%", current.cloud)),
        ("Condition", current.condition.text.clone()),
    ];

    let width = rows.iter().map(|(title, _)| title.len()).max().unwrap_or(0);
    for (title, value) in &rows {
        out.push_str(&format!("  {title:<width$}  {value}\n"));
    }

    if let Some(observed) = current.observed_at() {
        out.push_str(&format!("\nUpdated {}\n", observed.format("%Y-%m-%d %H:%M UTC")));
    }

    out
}

fn celsius(value: &impl Display) -> String {
    format!("{value}°C")
}

fn optional_celsius(value: Option<&Reading>) -> String {
    value.map(celsius).unwrap_or_else(|| "-".to_string())
}
