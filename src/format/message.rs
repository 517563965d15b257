//! Chat-ready messages built from observations and forecast periods.

use crate::format::emoji::{weather_emoji, wind_arrow};
use crate::format::units::{c_to_f, deg_to_compass, kmh_to_mph, meters_to_miles};
use crate::format::MISSING;
use crate::types::forecast::ForecastPeriod;
use crate::types::location::Units;
use crate::types::observation::Observation;
use chrono::DateTime;
use chrono_tz::Tz;
use std::fmt;

pub const NOW_COLOUR: u32 = 0x3182CE;
pub const FORECAST_COLOUR: u32 = 0x2F855A;
pub const FOOTER: &str = "Source: NWS (weather.gov)";
pub const FORECAST_TITLE: &str = "NWS Forecast";
pub const DEFAULT_FORECAST_LIMIT: usize = 6;
pub const CODEBLOCK_THRESHOLD: usize = 8;

/// A titled card with inline fields, the shape chat platforms call an embed.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
    pub colour: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Message {
    pub fn new(title: impl Into<String>, description: impl Into<String>, colour: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            fields: Vec::new(),
            footer: None,
            colour,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Plain-text rendering for terminals and logs.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.description)?;
        for field in &self.fields {
            let value = field.value.replace('\n', "\n    ");
            writeln!(f, "  {}: {}", field.name, value)?;
        }
        if let Some(footer) = &self.footer {
            write!(f, "{}", footer)?;
        }
        Ok(())
    }
}

/// Wraps `text` in a code fence once it reaches `threshold` lines.
pub fn maybe_codeblock(text: &str, threshold: usize) -> String {
    if text.lines().count() >= threshold {
        format!("```\n{text}\n```")
    } else {
        text.to_string()
    }
}

/// `18:53 UTC` when `tz` is UTC, `1:53 PM CDT` style otherwise.
pub fn format_timestamp(iso: Option<&str>, tz: Tz) -> String {
    let Some(parsed) = iso.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok()) else {
        return MISSING.to_string();
    };
    if tz == Tz::UTC {
        parsed.with_timezone(&tz).format("%H:%M UTC").to_string()
    } else {
        parsed.with_timezone(&tz).format("%-I:%M %p %Z").to_string()
    }
}

// Display-unit view of the numbers an observation card needs.
struct Readings {
    temperature: Option<f64>,
    heat_index: Option<f64>,
    wind_chill: Option<f64>,
    wind_speed: Option<f64>,
    wind_gust: Option<f64>,
    visibility: Option<f64>,
    temp_unit: &'static str,
    speed_unit: &'static str,
    distance_unit: &'static str,
}

impl Readings {
    fn new(obs: &Observation, units: Units) -> Self {
        match units {
            Units::Imperial => Self {
                temperature: c_to_f(obs.temperature.value),
                heat_index: c_to_f(obs.heat_index.value),
                wind_chill: c_to_f(obs.wind_chill.value),
                wind_speed: kmh_to_mph(obs.wind_speed.value),
                wind_gust: kmh_to_mph(obs.wind_gust.value),
                visibility: meters_to_miles(obs.visibility.value),
                temp_unit: "°F",
                speed_unit: "mph",
                distance_unit: "mi",
            },
            Units::Metric => Self {
                temperature: obs.temperature.value,
                heat_index: obs.heat_index.value,
                wind_chill: obs.wind_chill.value,
                wind_speed: obs.wind_speed.value,
                wind_gust: obs.wind_gust.value,
                visibility: obs.visibility.value.map(|m| m / 1000.0),
                temp_unit: "°C",
                speed_unit: "km/h",
                distance_unit: "km",
            },
        }
    }

    /// Heat index, else wind chill, when it differs from the air temperature
    /// by at least 2 degrees.
    fn feels_like(&self) -> Option<f64> {
        let t = self.temperature?;
        [self.heat_index, self.wind_chill]
            .into_iter()
            .flatten()
            .find(|feels| (feels - t).abs() >= 2.0)
    }
}

/// Current-conditions card for `station`.
pub fn observation_message(obs: &Observation, station: &str, units: Units, tz: Tz) -> Message {
    let when = format_timestamp(obs.timestamp.as_deref(), tz);
    let description = obs
        .text_description
        .as_deref()
        .filter(|d| !d.trim().is_empty());
    let icon = weather_emoji(description);
    let readings = Readings::new(obs, units);

    let temperature = match readings.temperature {
        Some(t) => {
            let mut text = format!("**{:.0}{}**", t, readings.temp_unit);
            if let Some(feels) = readings.feels_like() {
                text.push_str(&format!(" (feels **{:.0}{}**)", feels, readings.temp_unit));
            }
            text
        }
        None => MISSING.to_string(),
    };

    let humidity = obs
        .relative_humidity
        .value
        .map(|rh| format!("{rh:.0}%"))
        .unwrap_or_else(|| MISSING.to_string());

    let compass = deg_to_compass(obs.wind_direction.value);
    let arrow = wind_arrow(compass);
    let mut wind = match readings.wind_speed {
        Some(speed) => format!("{} {} {:.0} {}", arrow, compass, speed, readings.speed_unit),
        None => format!("{} {} {}", arrow, compass, MISSING),
    };
    if let (Some(gust), Some(speed)) = (readings.wind_gust, readings.wind_speed) {
        if gust > speed {
            wind.push_str(&format!("\nGusting **{:.0} {}**", gust, readings.speed_unit));
        }
    }

    let visibility = readings
        .visibility
        .map(|v| format!("{:.1} {}", v, readings.distance_unit))
        .unwrap_or_else(|| MISSING.to_string());

    Message::new(
        format!("{} — {}", station, when),
        format!("{} {}", icon, description.unwrap_or(MISSING)),
        NOW_COLOUR,
    )
    .field("Temperature", temperature)
    .field("Humidity", humidity)
    .field("Wind", wind.trim_start())
    .field("Visibility", visibility)
    .footer(FOOTER)
}

fn forecast_line(period: &ForecastPeriod) -> String {
    let name = period.name.as_deref().unwrap_or(MISSING);
    let short = [&period.short_forecast, &period.detailed_forecast]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|s| !s.is_empty())
        .unwrap_or(MISSING);
    let icon = weather_emoji(Some(short));

    let temperature = match period.temperature_value() {
        Some(t) => format!(
            "**{:.0}°{}**",
            t,
            period.temperature_unit.as_deref().unwrap_or("F")
        ),
        None => MISSING.to_string(),
    };

    let direction = period.wind_direction.as_deref().unwrap_or("").trim();
    let speed = period.wind_speed.as_deref().unwrap_or("").trim();
    let wind = format!("{} {} {}", wind_arrow(direction), direction, speed);
    let wind = match wind.trim() {
        "" => MISSING,
        w => w,
    };

    format!("**{name}** — {icon} {short} | {temperature} | Wind {wind}")
}

/// Multi-period forecast card showing at most `limit` periods.
pub fn forecast_message(periods: &[ForecastPeriod], limit: usize) -> Message {
    let lines: Vec<String> = periods.iter().take(limit).map(forecast_line).collect();
    let text = if lines.is_empty() {
        "No forecast data available.".to_string()
    } else {
        lines.join("\n")
    };
    Message::new(
        FORECAST_TITLE,
        maybe_codeblock(&text, CODEBLOCK_THRESHOLD),
        FORECAST_COLOUR,
    )
    .footer(FOOTER)
}
