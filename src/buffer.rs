use parking_lot::Mutex;

/// Append-only in-memory queue of formatted log lines.
///
/// One buffer exists per session, guarded by its own lock, so capture calls
/// from different sessions never contend with each other. `append` never
/// blocks on I/O; the scheduled flush drains the whole buffer atomically and
/// performs file writes outside the capture path. Growth is unbounded by
/// design: the flush interval is short and a stalled flush delaying a drain
/// is an accepted risk.
#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: Mutex<Vec<String>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line at the tail.
    pub fn append(&self, line: String) {
        self.lines.lock().push(line);
    }

    /// Atomically removes and returns every buffered line, in append order,
    /// leaving the buffer empty. Each appended line appears in exactly one
    /// drain's result.
    pub fn drain_all(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn drain_preserves_append_order() {
        let buffer = LogBuffer::new();
        buffer.append("a".into());
        buffer.append("b".into());
        buffer.append("c".into());
        assert_eq!(buffer.drain_all(), vec!["a", "b", "c"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn drain_on_empty_buffer_returns_nothing() {
        let buffer = LogBuffer::new();
        assert!(buffer.drain_all().is_empty());
    }

    #[test]
    fn concurrent_appends_and_drains_partition_all_lines() {
        let buffer = Arc::new(LogBuffer::new());
        let writers = 4;
        let per_writer = 250;

        let mut handles = Vec::new();
        for w in 0..writers {
            let buffer = Arc::clone(&buffer);
            handles.push(thread::spawn(move || {
                for i in 0..per_writer {
                    buffer.append(format!("{w}:{i}"));
                }
            }));
        }

        // Drain repeatedly while writers are running, then once more after
        // they finish.
        let drainer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut collected = Vec::new();
                for _ in 0..50 {
                    collected.extend(buffer.drain_all());
                    thread::yield_now();
                }
                collected
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        let mut collected = drainer.join().unwrap();
        collected.extend(buffer.drain_all());

        assert_eq!(collected.len(), writers * per_writer, "no loss, no duplication");
        let unique: HashSet<_> = collected.iter().collect();
        assert_eq!(unique.len(), collected.len());

        // Per-writer relative order survives the partition across drains.
        for w in 0..writers {
            let ordered: Vec<_> = collected
                .iter()
                .filter(|line| line.starts_with(&format!("{w}:")))
                .collect();
            for (i, line) in ordered.iter().enumerate() {
                assert_eq!(**line, format!("{w}:{i}"));
            }
        }
    }
}
