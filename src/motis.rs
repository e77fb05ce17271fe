//! MOTIS intermodal routing adapter (public transit plus walking).
//!
//! Unlike road routing, transit durations depend on the timetable. Each leg
//! is searched backwards from the course start: the trip must arrive within
//! `[start - 10 min, start + 1 min]`.

use chrono::{Duration, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::{GeoPoint, TravelTimeProvider};

/// How early before the course start a trip may arrive.
const ARRIVAL_EARLY_MINUTES: i64 = 10;
/// How late after the course start a trip may arrive.
const ARRIVAL_LATE_MINUTES: i64 = 1;

#[derive(Debug, Clone)]
pub struct MotisConfig {
    pub base_url: String,
    /// Longest walk to or from a stop, in seconds.
    pub walk_limit_secs: u32,
    pub timeout_secs: u64,
}

impl Default for MotisConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            walk_limit_secs: 900,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotisClient {
    config: MotisConfig,
    client: reqwest::blocking::Client,
}

impl MotisClient {
    pub fn new(config: MotisConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Backward search: the request's start is the destination.
    fn routing_request(&self, from: GeoPoint, to: GeoPoint, arrival: NaiveDateTime) -> Value {
        let walk = json!([{
            "mode_type": "FootPPR",
            "mode": {
                "search_options": {
                    "profile": "default",
                    "duration_limit": self.config.walk_limit_secs,
                }
            }
        }]);
        let window_begin = unix_seconds(arrival - Duration::minutes(ARRIVAL_EARLY_MINUTES));
        let window_end = unix_seconds(arrival + Duration::minutes(ARRIVAL_LATE_MINUTES));

        json!({
            "destination": { "type": "Module", "target": "/intermodal" },
            "content_type": "IntermodalRoutingRequest",
            "content": {
                "start_type": "IntermodalPretripStart",
                "start": {
                    "position": { "lat": to.lat, "lng": to.lng },
                    "interval": { "begin": window_begin, "end": window_end },
                    "min_connection_count": 1,
                    "extend_interval_earlier": true,
                    "extend_interval_later": false,
                },
                "start_modes": walk.clone(),
                "destination_type": "InputPosition",
                "destination": { "lat": from.lat, "lng": from.lng },
                "destination_modes": walk,
                "search_type": "Default",
                "search_dir": "Backward",
            }
        })
    }
}

/// Course times are wall-clock times at the event location.
fn unix_seconds(time: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&time).earliest() {
        Some(local) => local.timestamp(),
        None => time.and_utc().timestamp(),
    }
}

impl TravelTimeProvider for MotisClient {
    fn name(&self) -> &str {
        "motis"
    }

    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        let request = self.routing_request(from, to, at);
        debug!(from = %from.key(), to = %to.key(), %at, "requesting motis connection");

        let body = self
            .client
            .post(format!("{}/", self.config.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<MotisResponse>())?;

        minutes_from_response(body, from, to)
    }
}

/// Door-to-door minutes of the last connection found.
fn minutes_from_response(
    body: MotisResponse,
    from: GeoPoint,
    to: GeoPoint,
) -> Result<u32, ProviderError> {
    let no_route = || ProviderError::NoRoute {
        from: from.key(),
        to: to.key(),
    };
    let connection = body.content.connections.last().ok_or_else(no_route)?;
    let (Some(first), Some(last)) = (connection.stops.first(), connection.stops.last()) else {
        return Err(ProviderError::MalformedResponse(
            "connection without stops".to_string(),
        ));
    };
    let seconds = last.arrival.time - first.departure.time;
    if seconds < 0 {
        return Err(ProviderError::MalformedResponse(format!(
            "connection arrives {} s before it departs",
            -seconds
        )));
    }
    Ok((seconds / 60) as u32)
}

#[derive(Debug, Deserialize)]
struct MotisResponse {
    content: MotisContent,
}

#[derive(Debug, Deserialize)]
struct MotisContent {
    #[serde(default)]
    connections: Vec<MotisConnection>,
}

#[derive(Debug, Deserialize)]
struct MotisConnection {
    stops: Vec<MotisStop>,
}

#[derive(Debug, Deserialize)]
struct MotisStop {
    arrival: MotisEvent,
    departure: MotisEvent,
}

#[derive(Debug, Deserialize)]
struct MotisEvent {
    /// Unix seconds.
    time: i64,
}
