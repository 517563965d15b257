//! Command surface: argument parsing and the replies each command produces.

use crate::error::WxBotError;
use crate::format::message::Message;
use crate::stations::error::LocateStationError;
use crate::types::location::Units;
use crate::wxbot::WxBot;
use clap::{Parser, Subcommand};
use log::error;
use std::fmt;

/// WxBot - current conditions and forecasts from the National Weather Service
#[derive(Parser, Debug)]
#[command(name = "wxbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Identity the command runs as; saved locations are kept per user
    #[arg(short, long, global = true, env = "WXBOT_USER", default_value = "local")]
    pub user: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Health check
    Ping,

    /// Current conditions from NWS
    #[command(alias = "wxnow")]
    Now,

    /// NWS forecast for your location (next few periods)
    #[command(alias = "wxforecast")]
    Forecast {
        /// Number of periods to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Save your default location (home) manually
    #[command(alias = "wx_save")]
    Save {
        /// NWS station ID (e.g., KMWL)
        #[arg(short, long)]
        station: Option<String>,

        /// Latitude (e.g., 32.7932)
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude (e.g., -98.0891)
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,

        /// imperial or metric
        #[arg(long, default_value = "imperial")]
        units: String,
    },

    /// Set your home by place name (e.g., 'Mineral Wells, TX')
    #[command(alias = "wx_set")]
    Set {
        /// City, State or address
        location: String,

        /// imperial or metric
        #[arg(long, default_value = "imperial")]
        units: String,
    },

    /// List your saved locations
    Locations,

    /// Delete a saved location
    Delete {
        /// Location name
        #[arg(default_value = "home")]
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Text(String),
    Message(Message),
}

/// What a command sends back. `ephemeral` replies are meant for the caller
/// only.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: ReplyBody,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            body: ReplyBody::Text(text.into()),
            ephemeral: false,
        }
    }

    pub fn message(message: Message) -> Self {
        Self {
            body: ReplyBody::Message(message),
            ephemeral: false,
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.body {
            ReplyBody::Text(text) => Some(text),
            ReplyBody::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match &self.body {
            ReplyBody::Message(message) => Some(message),
            ReplyBody::Text(_) => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ReplyBody::Text(text) => f.write_str(text),
            ReplyBody::Message(message) => fmt::Display::fmt(message, f),
        }
    }
}

/// Runs `command` for `user_id`. Failures are turned into reply text, never
/// returned.
pub async fn dispatch(bot: &WxBot, user_id: &str, command: Command) -> Reply {
    match command {
        Command::Ping => Reply::text("pong"),
        Command::Now => match bot.current_conditions(user_id).await {
            Ok(message) => Reply::message(message),
            Err(e) => error_reply(&e, "Error from NWS"),
        },
        Command::Forecast { limit } => {
            match bot.forecast().user_id(user_id).maybe_limit(limit).call().await {
                Ok(message) => Reply::message(message),
                Err(e) => error_reply(&e, "Error from NWS"),
            }
        }
        Command::Save {
            station,
            lat,
            lon,
            units,
        } => save(bot, user_id, station.as_deref(), lat, lon, &units)
            .await
            .ephemeral(),
        Command::Set { location, units } => set(bot, user_id, &location, &units).await.ephemeral(),
        Command::Locations => locations(bot, user_id).await.ephemeral(),
        Command::Delete { name } => delete(bot, user_id, &name).await.ephemeral(),
    }
}

async fn save(
    bot: &WxBot,
    user_id: &str,
    station: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
    units: &str,
) -> Reply {
    let units = match units.parse::<Units>() {
        Ok(units) => units,
        Err(e) => return Reply::text(e.to_string()),
    };
    let saved = bot
        .save_home()
        .user_id(user_id)
        .maybe_station(station)
        .maybe_lat(lat)
        .maybe_lon(lon)
        .units(units)
        .call()
        .await;
    match saved {
        Ok(entry) => Reply::text(format!(
            "Saved **home** → station `{}`, lat `{:.4}`, lon `{:.4}`, units `{}`.",
            entry.station_id, entry.lat, entry.lon, entry.units
        )),
        Err(WxBotError::InvalidCoordinate(e)) => Reply::text(e.to_string()),
        Err(e) => error_reply(&e, "Error from NWS"),
    }
}

async fn set(bot: &WxBot, user_id: &str, location: &str, units: &str) -> Reply {
    let units = match units.parse::<Units>() {
        Ok(units) => units,
        Err(e) => return Reply::text(e.to_string()),
    };
    let place = match bot.geocode_place(location).await {
        Ok(place) => place,
        Err(WxBotError::PlaceNotFound(_)) => {
            return Reply::text(format!(
                "I couldn't find '{location}'. Try a more specific place."
            ))
        }
        Err(e) => return error_reply(&e, "Geocoding/NWS error"),
    };
    match bot.set_home_at(user_id, &place, units).await {
        Ok(entry) => Reply::text(format!(
            "Home set to **{}**\nNearest NWS station: `{}`\nCoords: `{:.4}, {:.4}` | Units: `{}`\n\nTry `wxbot now` or `wxbot forecast`.",
            place.display_name, entry.station_id, entry.lat, entry.lon, entry.units
        )),
        Err(WxBotError::LocateStation(LocateStationError::EmptyCandidates { .. })) => {
            Reply::text(format!(
                "Found {}, but couldn't find a nearby NWS station.",
                place.display_name
            ))
        }
        Err(e) => error_reply(&e, "Geocoding/NWS error"),
    }
}

async fn locations(bot: &WxBot, user_id: &str) -> Reply {
    match bot.list_locations(user_id).await {
        Ok(names) if names.is_empty() => {
            Reply::text("No saved locations. Use `wxbot set <place>` to add one.")
        }
        Ok(names) => {
            let names: Vec<String> = names.iter().map(|n| format!("`{n}`")).collect();
            Reply::text(format!("Saved locations: {}", names.join(", ")))
        }
        Err(e) => error_reply(&e, "Error from NWS"),
    }
}

async fn delete(bot: &WxBot, user_id: &str, name: &str) -> Reply {
    match bot.delete_location(user_id, name).await {
        Ok(true) => Reply::text(format!("Deleted **{name}**.")),
        Ok(false) => Reply::text(format!("No saved location named **{name}**.")),
        Err(e) => error_reply(&e, "Error from NWS"),
    }
}

// `<prefix>: <status>` for upstream HTTP failures, a generic line otherwise.
fn error_reply(err: &WxBotError, upstream_prefix: &str) -> Reply {
    match err.upstream_status() {
        Some(status) => Reply::text(format!("{}: {}", upstream_prefix, status.as_u16())),
        None => {
            error!("Command failed: {}", err);
            Reply::text(format!("Unexpected error: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn bot_for(server: &MockServer) -> WxBot {
        let config = Config::builder()
            .user_agent("wxbot-test")
            .nws_base_url(server.uri())
            .nominatim_base_url(server.uri())
            .build();
        WxBot::connect()
            .config(config)
            .store(Arc::new(MemoryStore::new()))
            .call()
            .await
            .unwrap()
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["wxbot", "--user", "42", "save", "--lon", "-98.1", "--units", "metric"]);
        assert_eq!(cli.user, "42");
        assert_eq!(
            cli.command,
            Command::Save {
                station: None,
                lat: None,
                lon: Some(-98.1),
                units: "metric".into(),
            }
        );

        let cli = Cli::parse_from(["wxbot", "wx_set", "Mineral Wells, TX"]);
        assert_eq!(
            cli.command,
            Command::Set {
                location: "Mineral Wells, TX".into(),
                units: "imperial".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start().await;
        let reply = dispatch(&bot_for(&server).await, "1", Command::Ping).await;
        assert_eq!(reply, Reply::text("pong"));
    }

    #[tokio::test]
    async fn test_save_rejects_bad_units() {
        let server = MockServer::start().await;
        let bot = bot_for(&server).await;
        let reply = dispatch(
            &bot,
            "1",
            Command::Save {
                station: Some("KDFW".into()),
                lat: None,
                lon: None,
                units: "kelvin".into(),
            },
        )
        .await;
        assert_eq!(reply.as_text(), Some("Units must be 'imperial' or 'metric'."));
        assert!(reply.ephemeral);
        assert!(bot.list_locations("1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_bad_coordinates() {
        let server = MockServer::start().await;
        let bot = bot_for(&server).await;
        bot.save_home().user_id("2").call().await.unwrap();

        let cli = Cli::parse_from(["wxbot", "--user", "1", "save", "--lat", "NaN"]);
        let reply = dispatch(&bot, &cli.user, cli.command).await;
        assert_eq!(
            reply.as_text(),
            Some("Latitude must be between -90 and 90 degrees, got NaN.")
        );
        assert!(reply.ephemeral);

        let cli = Cli::parse_from(["wxbot", "--user", "2", "save", "--lat", "95.5"]);
        let reply = dispatch(&bot, &cli.user, cli.command).await;
        assert_eq!(
            reply.as_text(),
            Some("Latitude must be between -90 and 90 degrees, got 95.5.")
        );

        assert!(bot.list_locations("1").await.unwrap().is_empty());
        assert_eq!(bot.resolve_user_location("2").await.unwrap().lat, 32.793195);
    }

    #[tokio::test]
    async fn test_save_reply() {
        let server = MockServer::start().await;
        let bot = bot_for(&server).await;
        let reply = dispatch(
            &bot,
            "1",
            Command::Save {
                station: Some("kdfw".into()),
                lat: Some(32.8998),
                lon: None,
                units: "Metric".into(),
            },
        )
        .await;
        assert_eq!(
            reply.as_text(),
            Some("Saved **home** → station `KDFW`, lat `32.8998`, lon `-98.0891`, units `metric`.")
        );
    }

    #[tokio::test]
    async fn test_now_reports_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reply = dispatch(&bot_for(&server).await, "1", Command::Now).await;
        assert_eq!(reply.as_text(), Some("Error from NWS: 500"));
        assert!(!reply.ephemeral);
    }

    #[tokio::test]
    async fn test_set_reports_geocoder_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let reply = dispatch(
            &bot_for(&server).await,
            "1",
            Command::Set {
                location: "Austin".into(),
                units: "imperial".into(),
            },
        )
        .await;
        assert_eq!(reply.as_text(), Some("Geocoding/NWS error: 403"));
    }

    #[tokio::test]
    async fn test_locations_and_delete_replies() {
        let server = MockServer::start().await;
        let bot = bot_for(&server).await;

        let reply = dispatch(&bot, "5", Command::Locations).await;
        assert!(reply.as_text().unwrap().starts_with("No saved locations."));

        bot.save_home().user_id("5").call().await.unwrap();
        let reply = dispatch(&bot, "5", Command::Locations).await;
        assert_eq!(reply.as_text(), Some("Saved locations: `home`"));

        let delete = Command::Delete {
            name: "home".into(),
        };
        let reply = dispatch(&bot, "5", delete.clone()).await;
        assert_eq!(reply.as_text(), Some("Deleted **home**."));
        let reply = dispatch(&bot, "5", delete).await;
        assert_eq!(reply.as_text(), Some("No saved location named **home**."));
    }
}
