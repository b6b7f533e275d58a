use serde::Deserialize;

/// Read-only logging configuration, supplied by the host proxy.
///
/// The three toggles are independent and may all be active at once:
/// `logging_packets` gates the whole subsystem, `log_to_json` selects
/// structured rendering over the payload's default textual form, and
/// `log_to` selects the destination set. Loading this from a config file is
/// the host's concern; the `Deserialize` derive is provided so its loader
/// can produce one directly.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Master switch for packet logging. When off, `start()` does nothing
    /// and capture calls skip formatting entirely.
    #[serde(default)]
    pub logging_packets: bool,

    /// Render payloads as pretty-printed structured text instead of their
    /// default single-line textual form.
    #[serde(default)]
    pub log_to_json: bool,

    /// Destination set for captured lines.
    #[serde(default)]
    pub log_to: LogTo,
}

/// Destinations for captured log lines. File output is batched through the
/// buffer; console output is written immediately, never batched.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LogTo {
    #[serde(default)]
    pub file: bool,
    #[serde(default)]
    pub console: bool,
}

impl LogConfig {
    /// Convenience constructor for hosts that assemble configuration in
    /// code rather than deserializing it.
    pub fn new(logging_packets: bool, log_to_json: bool, log_to: LogTo) -> Self {
        Self {
            logging_packets,
            log_to_json,
            log_to,
        }
    }

    /// Configuration with packet logging switched off entirely.
    pub fn disabled() -> Self {
        Self::new(false, false, LogTo::default())
    }
}
