use hg_core::*;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Source of wall-clock time for starting, timing, and closing games.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct Wall;

impl Clock for Wall {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct Manual(AtomicU64);

impl Manual {
    pub fn at(now: Timestamp) -> Self {
        Self(AtomicU64::new(now))
    }
    pub fn set(&self, now: Timestamp) {
        self.0.store(now, Ordering::SeqCst);
    }
    pub fn advance(&self, seconds: Seconds) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for Manual {
    fn now(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

/// Elapsed play time. Recomputed from the start instant on every call so a
/// resumed session never depends on a cached counter. A clock that stepped
/// backwards yields zero rather than wrapping.
pub fn elapsed(started: Timestamp, now: Timestamp) -> Seconds {
    now.saturating_sub(started)
}

/// Formats a duration as `HH:MM:SS`.
pub fn hms(seconds: Seconds) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn manual_clock_advances() {
        let clock = Manual::at(1_000);
        clock.advance(30);
        assert_eq!(clock.now(), 1_030);
        clock.set(5);
        assert_eq!(clock.now(), 5);
    }
    #[test]
    fn elapsed_never_wraps() {
        assert_eq!(elapsed(100, 250), 150);
        assert_eq!(elapsed(250, 100), 0);
    }
    #[test]
    fn hms_pads_fields() {
        assert_eq!(hms(0), "00:00:00");
        assert_eq!(hms(3_723), "01:02:03");
        assert_eq!(hms(36_000), "10:00:00");
    }
    #[test]
    fn wall_clock_is_past_epoch() {
        assert!(Wall.now() > 1_600_000_000);
    }
}
