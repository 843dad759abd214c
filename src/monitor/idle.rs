use std::time::{Duration, Instant};

use crate::spooler::models::SpoolerSnapshot;

/// Debounces the spooler's idle signal.
///
/// The spooler reports an empty queue a few seconds before the print
/// engine physically stops, and reading the vendor counters mid-print
/// returns garbage. The tracker therefore remembers when activity was
/// last seen and only calls the printer idle once a grace window has
/// passed on top of the spooler saying so.
#[derive(Debug)]
pub struct IdleTracker {
    grace: Duration,
    last_activity: Instant,
}

impl IdleTracker {
    /// A tracker that counts the grace window from `now`, i.e. treats
    /// construction time as the last seen activity.
    pub fn new(grace: Duration, now: Instant) -> Self {
        Self { grace, last_activity: now }
    }

    /// A tracker whose grace window has already elapsed at `now`. Used by
    /// one-shot checks where there is no history to wait out.
    pub fn with_elapsed_grace(grace: Duration, now: Instant) -> Self {
        let last_activity = now.checked_sub(grace).unwrap_or(now);
        Self { grace, last_activity }
    }

    /// Records a snapshot; any sign of activity advances the timestamp.
    pub fn observe(&mut self, snapshot: &SpoolerSnapshot, now: Instant) {
        if snapshot.indicates_activity() {
            self.last_activity = now;
        }
    }

    /// True only when the snapshot is quiet and the grace window has fully
    /// elapsed since the last observed activity (boundary inclusive).
    pub fn is_effectively_idle(&self, snapshot: &SpoolerSnapshot, now: Instant) -> bool {
        !snapshot.indicates_activity() && now.duration_since(self.last_activity) >= self.grace
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_activity)
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spooler::models::{JobStatus, PrinterStatus};

    const GRACE: Duration = Duration::from_secs(15);

    fn quiet() -> SpoolerSnapshot {
        SpoolerSnapshot::default()
    }

    fn printing() -> SpoolerSnapshot {
        SpoolerSnapshot {
            printer_status: PrinterStatus(0x400),
            pending_jobs: 1,
            job_statuses: vec![JobStatus(0x10)],
        }
    }

    #[test]
    fn busy_snapshot_is_never_idle() {
        let start = Instant::now();
        let tracker = IdleTracker::new(GRACE, start);
        let much_later = start + Duration::from_secs(3600);
        assert!(!tracker.is_effectively_idle(&printing(), much_later));
    }

    #[test]
    fn idle_exactly_at_the_grace_boundary() {
        let start = Instant::now();
        let tracker = IdleTracker::new(GRACE, start);
        assert!(tracker.is_effectively_idle(&quiet(), start + GRACE));
    }

    #[test]
    fn not_idle_one_tick_below_the_boundary() {
        let start = Instant::now();
        let tracker = IdleTracker::new(GRACE, start);
        let just_short = start + GRACE - Duration::from_millis(1);
        assert!(!tracker.is_effectively_idle(&quiet(), just_short));
    }

    #[test]
    fn activity_restarts_the_grace_window() {
        let start = Instant::now();
        let mut tracker = IdleTracker::new(GRACE, start);

        // Quiet long enough to be idle...
        assert!(tracker.is_effectively_idle(&quiet(), start + GRACE));

        // ...then a job shows up and the clock restarts.
        let activity_at = start + Duration::from_secs(60);
        tracker.observe(&printing(), activity_at);
        assert!(!tracker.is_effectively_idle(&quiet(), activity_at + GRACE - Duration::from_secs(1)));
        assert!(tracker.is_effectively_idle(&quiet(), activity_at + GRACE));
    }

    #[test]
    fn quiet_observation_does_not_advance_the_timestamp() {
        let start = Instant::now();
        let mut tracker = IdleTracker::new(GRACE, start);
        tracker.observe(&quiet(), start + Duration::from_secs(10));
        assert!(tracker.is_effectively_idle(&quiet(), start + GRACE));
    }

    #[test]
    fn elapsed_grace_tracker_is_idle_immediately() {
        let now = Instant::now();
        let tracker = IdleTracker::with_elapsed_grace(GRACE, now);
        assert!(tracker.is_effectively_idle(&quiet(), now));
    }
}
