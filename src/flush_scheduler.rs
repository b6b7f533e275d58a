use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lazy_static::lazy_static;
use parking_lot::Mutex;

/// The process-wide flush timer.
///
/// One background thread serves every active session logger: flush work is
/// lightweight and infrequent, so a dedicated timer per session would be
/// waste. The thread is created on first use and ticks at a fixed interval,
/// upgrading each registered weak handle and flushing the sessions that are
/// still alive — all sessions' flushes are serialized on this one timeline.
/// Abandoned sessions are pruned on the next tick; no explicit deregistration
/// is needed.

/// Fixed flush period; the first tick fires after one full period.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// A flushable session registered with the scheduler.
pub trait FlushTarget: Send + Sync {
    /// Drain buffered lines and persist them. Must not panic on I/O
    /// failure; a failed batch is reported and dropped.
    fn flush(&self);
}

struct FlushScheduler {
    targets: Mutex<Vec<Weak<dyn FlushTarget>>>,
    worker: Mutex<Option<(Sender<()>, JoinHandle<()>)>>,
}

lazy_static! {
    static ref SCHEDULER: FlushScheduler = FlushScheduler::start();
}

impl FlushScheduler {
    fn start() -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("session-log-flush".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(FLUSH_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => SCHEDULER.tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .expect("failed to spawn session-log-flush thread");

        Self {
            targets: Mutex::new(Vec::new()),
            worker: Mutex::new(Some((stop_tx, handle))),
        }
    }

    fn tick(&self) {
        // Upgrade under the lock, flush outside it: a slow file write must
        // not block registration of new sessions.
        let live: Vec<Arc<dyn FlushTarget>> = {
            let mut targets = self.targets.lock();
            targets.retain(|weak| weak.strong_count() > 0);
            targets.iter().filter_map(Weak::upgrade).collect()
        };
        for target in live {
            target.flush();
        }
    }
}

/// Registers a session with the shared timer. The scheduler holds only a
/// weak handle; dropping the session is enough to stop its flushes.
pub fn register(target: Weak<dyn FlushTarget>) {
    SCHEDULER.targets.lock().push(target);
}

/// Stops the shared timer and performs one final flush of every still-live
/// session, so lines buffered at process exit are not lost. Idempotent;
/// after shutdown no further scheduled flushes occur.
pub fn shutdown() {
    let worker = SCHEDULER.worker.lock().take();
    if let Some((stop_tx, handle)) = worker {
        let _ = stop_tx.send(());
        let _ = handle.join();
        SCHEDULER.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTarget(AtomicUsize);

    impl FlushTarget for CountingTarget {
        fn flush(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dropped_targets_are_pruned_on_tick() {
        let live = Arc::new(CountingTarget(AtomicUsize::new(0)));
        let dead = Arc::new(CountingTarget(AtomicUsize::new(0)));

        register(Arc::downgrade(&live) as Weak<dyn FlushTarget>);
        register(Arc::downgrade(&dead) as Weak<dyn FlushTarget>);
        drop(dead);

        SCHEDULER.tick();
        assert!(live.0.load(Ordering::SeqCst) >= 1);

        let registered = SCHEDULER.targets.lock().len();
        assert_eq!(registered, 1, "dead weak handle should be pruned");
    }
}
