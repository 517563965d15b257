pub mod emoji;
pub mod message;
pub mod units;

pub use emoji::{weather_emoji, wind_arrow};
pub use message::{
    forecast_message, format_timestamp, maybe_codeblock, observation_message, Field, Message,
};
pub use units::{c_to_f, deg_to_compass, kmh_to_mph, meters_to_miles};

/// Shown wherever a value is missing.
pub const MISSING: &str = "—";
