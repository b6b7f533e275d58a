//! # Session Logger
//!
//! A per-session diagnostic logging sink for a network proxy. Each proxied
//! session gets its own logger that records a chronological trace of the
//! protocol messages exchanged between the two endpoints, plus any
//! associated artifacts (images, structured documents), under its own output
//! directory.
//!
//! ## Key Properties
//!
//! * Cheap synchronous capture: filtering runs before any formatting cost,
//!   and a captured line only touches an in-memory buffer
//! * Batched persistence: a single shared background timer drains every
//!   session's buffer to `packets.log` on a fixed schedule; a failed flush
//!   drops at most one interval's worth of lines and never stalls the proxy
//! * Pluggable structured rendering: payloads are encoded through serde with
//!   a process-wide registry of custom encoders for value types that have no
//!   natural structural representation
//!
//! ## Main Components
//!
//! * `SessionLogger`: per-session orchestrator exposing the capture and
//!   artifact-saving API
//! * `LogBuffer`: lock-guarded append/drain queue of formatted lines
//! * `flush_scheduler`: the process-wide flush timer shared by all sessions
//! * `serialize`: structured payload encoding and the custom-encoder registry
//! * `format`: direction tags, timestamp pattern, and the line format
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use session_logger::{IgnoredPackets, LogConfig, LogTo, SessionLogger};
//!
//! let config = Arc::new(LogConfig::new(
//!     true,                                  // logging_packets
//!     false,                                 // log_to_json
//!     LogTo { file: true, console: false },
//! ));
//! let ignored: Arc<IgnoredPackets> = Arc::new(|_kind: &str| false);
//!
//! let logger = SessionLogger::new(config, ignored, Path::new("sessions"), "steve", 1700000000);
//! logger.start().expect("session directory should be writable");
//! // ... per-event: logger.log_packet(&session, &packet, upstream)
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod flush_scheduler;
pub mod format;
pub mod packet;
pub mod serialize;
pub mod session_logger;

pub use buffer::LogBuffer;
pub use config::{LogConfig, LogTo};
pub use error::SessionLogError;
pub use flush_scheduler::{FlushTarget, FLUSH_INTERVAL};
pub use format::{Direction, PayloadRendering};
pub use packet::{IgnoredPackets, Packet, SessionInfo};
pub use serialize::Vector3i;
pub use session_logger::SessionLogger;
