//! Wall-clock sources consumed by the writer and by record construction.

use {
    chrono::{DateTime, TimeZone as _, Utc},
    std::sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

/// Source of the current time.
///
/// The writer consults the clock once per record to decide whether the
/// active window has expired, and producers consult it to stamp records.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock with second resolution.
///
/// Clones share the same instant, so a test can hand one copy to the logger
/// and keep another to move time forward.
///
/// ```
/// use logspool::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_700_000_000);
/// clock.advance(60);
/// assert_eq!(clock.now().timestamp(), 1_700_000_060);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    secs: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `secs` seconds since the Unix epoch.
    pub fn new(secs: i64) -> Self {
        ManualClock {
            secs: Arc::new(AtomicI64::new(secs)),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.secs.load(Ordering::SeqCst), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        other.advance(5);
        assert_eq!(clock.now().timestamp(), 105);
        clock.set(7);
        assert_eq!(other.now().timestamp(), 7);
    }
}
