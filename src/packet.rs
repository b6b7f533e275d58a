use std::any::Any;
use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;

/// A protocol message captured by the logger.
///
/// The logger treats payloads as opaque: `kind` feeds the ignored-packet
/// predicate, `Display` provides the default single-line textual form, and
/// `Serialize` provides the structural shape for structured rendering. The
/// `Any` bound lets the serializer consult the custom-encoder registry for
/// whole-payload overrides.
pub trait Packet: Serialize + fmt::Display + Any {
    /// Stable identifier for this packet's kind, used only for filtering.
    fn kind(&self) -> &'static str;
}

/// Predicate deciding whether a packet kind is excluded from capture.
/// Supplied by the host proxy; consulted before any formatting cost is paid.
pub type IgnoredPackets = dyn Fn(&str) -> bool + Send + Sync;

/// The per-session view the logger needs from the host's session object.
pub trait SessionInfo {
    /// Whether fine-grained tracing was requested for this session. When
    /// set, every captured packet is also emitted immediately through the
    /// logging facade at trace level.
    fn trace_enabled(&self) -> bool;

    /// Remote address of the session, included in trace lines.
    fn endpoint(&self) -> SocketAddr;
}
