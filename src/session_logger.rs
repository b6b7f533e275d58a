use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use chrono::Local;
use image::RgbaImage;
use serde::Serialize;

use crate::buffer::LogBuffer;
use crate::config::LogConfig;
use crate::error::SessionLogError;
use crate::flush_scheduler::{self, FlushTarget};
use crate::format::{self, Direction, PayloadRendering};
use crate::packet::{IgnoredPackets, Packet, SessionInfo};

/// Name of the buffered packet log inside each session directory.
const LOG_FILE_NAME: &str = "packets.log";

/// Per-session diagnostic logging sink.
///
/// One instance exists per proxied session and owns that session's output
/// directory (`{sessions_dir}/{display_name}-{timestamp}`) and its
/// `packets.log`. The capture path (`log_packet`) is synchronous and cheap:
/// filtering happens before any formatting cost, and a captured line only
/// ever touches the in-memory buffer and optionally stdout. Persistence is
/// asynchronous — the shared flush timer drains the buffer and appends to
/// the log file on a fixed schedule.
///
/// Artifact saves (`save_image`, `save_json`, `save_json_bytes`) bypass the
/// buffer and write synchronously; their failures are loud, unlike flush
/// failures which drop the batch and only report through the logging facade.
///
/// # Usage
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use session_logger::{IgnoredPackets, LogConfig, LogTo, SessionLogger};
///
/// let config = Arc::new(LogConfig::new(
///     true,
///     false,
///     LogTo { file: true, console: false },
/// ));
/// let ignored: Arc<IgnoredPackets> = Arc::new(|kind: &str| kind == "NetworkStackLatency");
/// let logger = SessionLogger::new(config, ignored, Path::new("sessions"), "steve", 1700000000);
/// logger.start().expect("session directory");
/// ```
pub struct SessionLogger {
    config: Arc<LogConfig>,
    ignored: Arc<IgnoredPackets>,
    data_path: PathBuf,
    log_path: PathBuf,
    buffer: LogBuffer,
}

impl SessionLogger {
    /// Creates the logger for one session. Paths are derived here; nothing
    /// is created on disk until `start`.
    pub fn new(
        config: Arc<LogConfig>,
        ignored: Arc<IgnoredPackets>,
        sessions_dir: &Path,
        display_name: &str,
        timestamp: i64,
    ) -> Arc<Self> {
        let data_path = sessions_dir.join(format!("{display_name}-{timestamp}"));
        let log_path = data_path.join(LOG_FILE_NAME);
        Arc::new(Self {
            config,
            ignored,
            data_path,
            log_path,
            buffer: LogBuffer::new(),
        })
    }

    /// Starts the logger: creates the session directory (when file output is
    /// enabled) and registers with the shared flush timer.
    ///
    /// When packet logging is disabled this does nothing at all — no
    /// directory, no timer registration — so a disabled logger costs
    /// nothing. A directory that cannot be created is a startup
    /// configuration error and is returned as fatal.
    pub fn start(self: &Arc<Self>) -> Result<(), SessionLogError> {
        if !self.config.logging_packets {
            return Ok(());
        }
        if self.config.log_to.file {
            log::debug!("packets will be logged under {}", self.log_path.display());
            fs::create_dir_all(&self.data_path).map_err(|source| SessionLogError::CreateDir {
                path: self.data_path.clone(),
                source,
            })?;
        }
        // Registered whenever packet logging is on, even console-only: the
        // flush still has to empty the buffer.
        flush_scheduler::register(Arc::downgrade(self) as Weak<dyn FlushTarget>);
        Ok(())
    }

    /// Captures one protocol event. Hot path, called once per packet.
    ///
    /// Order matters: the ignored-kind predicate runs first so filtered
    /// packets pay no formatting cost; the per-session trace line is emitted
    /// immediately and independently of the buffered path; the formatted
    /// line is buffered for the file and, when the console destination is
    /// on, printed right away — console output is never batched.
    ///
    /// A structured-rendering failure is a defect in the payload type or
    /// encoder registry and is returned as fatal rather than producing a
    /// silently truncated trace.
    pub fn log_packet<P: Packet>(
        &self,
        session: &dyn SessionInfo,
        packet: &P,
        upstream: bool,
    ) -> Result<(), SessionLogError> {
        if (self.ignored)(packet.kind()) {
            return Ok(());
        }

        let direction = Direction::from_upstream(upstream);
        if session.trace_enabled() && log::log_enabled!(log::Level::Trace) {
            log::trace!("{} {}: {}", direction, session.endpoint(), packet);
        }

        if self.config.logging_packets {
            let rendering = PayloadRendering::from_config(&self.config);
            let payload = rendering.render(packet)?;
            let line = format::format_line(Local::now(), direction, &payload);
            if self.config.log_to.console {
                println!("{line}");
            }
            self.buffer.append(line);
        }
        Ok(())
    }

    /// Writes a bitmap artifact to `{dir}/{name}.png`, replacing any
    /// existing file. Synchronous; bypasses the buffer.
    pub fn save_image(&self, name: &str, image: &RgbaImage) -> Result<(), SessionLogError> {
        let path = self.data_path.join(format!("{name}.png"));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| SessionLogError::Image { path, source })
    }

    /// Writes a structured document, pretty-printed, to `{dir}/{name}.json`,
    /// replacing any existing file. Synchronous; bypasses the buffer.
    pub fn save_json<T: Serialize>(&self, name: &str, document: &T) -> Result<(), SessionLogError> {
        let path = self.data_path.join(format!("{name}.json"));
        let file = File::create(&path).map_err(|source| SessionLogError::Artifact {
            path: path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), document).map_err(|source| {
            if source.is_io() {
                SessionLogError::Artifact {
                    path: path.clone(),
                    source: source.into(),
                }
            } else {
                SessionLogError::Encode(source)
            }
        })
    }

    /// Writes an already-encoded document verbatim to `{dir}/{name}.json`,
    /// replacing any existing file.
    pub fn save_json_bytes(&self, name: &str, encoded: &[u8]) -> Result<(), SessionLogError> {
        let path = self.data_path.join(format!("{name}.json"));
        fs::write(&path, encoded).map_err(|source| SessionLogError::Artifact { path, source })
    }

    /// Drains the buffer and appends the batch to `packets.log`.
    ///
    /// Invoked by the shared flush timer; public because it is part of the
    /// logger's contract and hosts may trigger a final flush themselves. The
    /// buffer is emptied regardless of the outcome: a failed write drops the
    /// batch — reported through the logging facade, never re-queued and
    /// never propagated, so a transient disk issue bounds the loss to one
    /// flush interval and cannot stall the proxy.
    pub fn flush(&self) {
        let lines = self.buffer.drain_all();
        if lines.is_empty() || !self.config.log_to.file {
            return;
        }
        if let Err(e) = self.append_to_log(&lines) {
            log::error!(
                "unable to flush packet log to {}: {e}",
                self.log_path.display()
            );
        }
    }

    fn append_to_log(&self, lines: &[String]) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }

    /// The session's output directory, for hosts placing adjacent artifacts.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Number of lines currently awaiting the next flush.
    pub fn buffered_lines(&self) -> usize {
        self.buffer.len()
    }
}

impl FlushTarget for SessionLogger {
    fn flush(&self) {
        SessionLogger::flush(self);
    }
}
