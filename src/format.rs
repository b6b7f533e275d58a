use std::fmt;

use chrono::{DateTime, Local};

use crate::config::LogConfig;
use crate::packet::Packet;
use crate::serialize;

/// Formatting of captured events into immutable log lines.
///
/// A line is `[timestamp] [direction] - payload`. The timestamp is captured
/// by the caller at the moment of the event and rendered here in the local
/// time zone with millisecond resolution; a delayed flush never changes the
/// embedded time.

/// Timestamp pattern: hour:minute:second:millisecond, local time.
const TIMESTAMP_PATTERN: &str = "%H:%M:%S:%3f";

/// Direction of a captured event relative to the proxied connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client → server traffic.
    ServerBound,
    /// Server → client traffic.
    ClientBound,
}

impl Direction {
    pub fn from_upstream(upstream: bool) -> Self {
        if upstream {
            Direction::ServerBound
        } else {
            Direction::ClientBound
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ServerBound => f.write_str("SERVER BOUND"),
            Direction::ClientBound => f.write_str("CLIENT BOUND"),
        }
    }
}

/// How a payload is turned into text: its default `Display` form, or
/// structured pretty-printed encoding through the serializer. Selected from
/// configuration once per event rather than branching inside the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRendering {
    Display,
    Json,
}

impl PayloadRendering {
    pub fn from_config(config: &LogConfig) -> Self {
        if config.log_to_json {
            PayloadRendering::Json
        } else {
            PayloadRendering::Display
        }
    }

    /// Renders the payload text. Structured rendering can fail; that failure
    /// is propagated to the capture call as a fatal encoding error.
    pub fn render<P: Packet>(&self, packet: &P) -> Result<String, serde_json::Error> {
        match self {
            PayloadRendering::Display => Ok(packet.to_string()),
            PayloadRendering::Json => serialize::to_pretty(packet),
        }
    }
}

/// Renders one log line. Pure function; the timestamp comes from the caller.
pub fn format_line(time: DateTime<Local>, direction: Direction, payload: &str) -> String {
    format!(
        "[{}] [{}] - {}",
        time.format(TIMESTAMP_PATTERN),
        direction,
        payload
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn direction_maps_upstream_flag() {
        assert_eq!(Direction::from_upstream(true), Direction::ServerBound);
        assert_eq!(Direction::from_upstream(false), Direction::ClientBound);
        assert_eq!(Direction::ServerBound.to_string(), "SERVER BOUND");
        assert_eq!(Direction::ClientBound.to_string(), "CLIENT BOUND");
    }

    #[test]
    fn line_has_fixed_shape() {
        let time = Local
            .with_ymd_and_hms(2024, 3, 5, 14, 30, 59)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(123))
            .unwrap();
        let line = format_line(time, Direction::ServerBound, "Ping{}");
        assert_eq!(line, "[14:30:59:123] [SERVER BOUND] - Ping{}");
    }

    #[test]
    fn millisecond_field_is_zero_padded() {
        let time = Local
            .with_ymd_and_hms(2024, 3, 5, 1, 2, 3)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(7))
            .unwrap();
        let line = format_line(time, Direction::ClientBound, "x");
        assert!(line.starts_with("[01:02:03:007]"), "got {line}");
    }
}
