//! Lookup tables turning descriptions and directions into emoji.

// Checked in order; the first matching keyword wins.
const WEATHER_KEYWORDS: &[(&[&str], &str)] = &[
    (&["thunder", "t-storm"], "⛈️"),
    (&["heavy snow"], "❄️❄️"),
    (&["heavy rain"], "🌧️🌧️"),
    (&["snow"], "❄️"),
    (&["sleet", "ice", "freezing"], "🌨️"),
    (&["rain", "showers"], "🌧️"),
    (&["drizzle", "sprinkles"], "🌦️"),
    (&["fog", "mist"], "🌫️"),
    (&["haze", "smoke"], "🌁"),
    (&["windy", "breezy", "gust"], "💨"),
    (&["overcast"], "☁️"),
    (&["mostly cloudy", "partly sunny"], "🌥️"),
    (&["partly cloudy"], "⛅"),
    (&["mostly sunny"], "🌤️"),
    (&["sunny"], "☀️"),
    (&["clear"], "✨"),
];

const UNKNOWN_WEATHER: &str = "❔";

/// Emoji for a free-text weather description such as "Chance Showers And
/// Thunderstorms".
pub fn weather_emoji(description: Option<&str>) -> &'static str {
    let Some(text) = description.filter(|t| !t.trim().is_empty()) else {
        return UNKNOWN_WEATHER;
    };
    let text = text.to_lowercase();
    WEATHER_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(UNKNOWN_WEATHER)
}

/// Eight-way arrow for a 16-point compass name; empty when unrecognized.
pub fn wind_arrow(compass: &str) -> &'static str {
    match compass.trim().to_uppercase().as_str() {
        "N" | "NNE" => "⬆️",
        "NE" | "ENE" => "↗️",
        "E" | "ESE" => "➡️",
        "SE" | "SSE" => "↘️",
        "S" | "SSW" => "⬇️",
        "SW" | "WSW" => "↙️",
        "W" | "WNW" => "⬅️",
        "NW" | "NNW" => "↖️",
        _ => "",
    }
}
