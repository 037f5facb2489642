//! Local playback clock for the now-playing item.
//!
//! Between fetches the elapsed time is simulated one second at a time; every
//! successful fetch resyncs it to what the server reported.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackClock {
    current: u32,
    total: u32,
}

impl PlaybackClock {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    /// Advance by one second. Returns `false` (and does nothing) once the
    /// end of the track has been reached locally.
    pub fn advance(&mut self) -> bool {
        if self.current >= self.total {
            return false;
        }
        self.current += 1;
        true
    }

    /// Replace the simulated position with the authoritative one.
    pub fn resync(&mut self, current: u32, total: u32) {
        if self.current != current || self.total != total {
            tracing::trace!(
                "clock resync {}/{} -> {}/{}",
                self.current,
                self.total,
                current,
                total
            );
        }
        self.current = current;
        self.total = total;
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.total
    }

    /// 0.0..=1.0; zero for a track of unknown length.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

/// `mm:ss`, minutes not wrapped at the hour.
pub fn format_mmss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_reaches_end_and_stops() {
        let mut clock = PlaybackClock::default();
        clock.resync(170, 180);
        let steps = clock.remaining();
        for _ in 0..steps {
            assert!(clock.advance());
        }
        assert_eq!(clock.current(), 180);
        assert!(clock.is_finished());
        assert!(!clock.advance());
        assert!(!clock.advance());
        assert_eq!(clock.current(), 180);
    }

    #[test]
    fn test_resync_corrects_drift_both_ways() {
        let mut clock = PlaybackClock::new(10, 200);
        for _ in 0..5 {
            clock.advance();
        }
        clock.resync(12, 200);
        assert_eq!(clock.current(), 12);
        clock.resync(40, 200);
        assert_eq!(clock.remaining(), 160);
    }

    #[test]
    fn test_remaining_saturates() {
        let clock = PlaybackClock::new(200, 180);
        assert_eq!(clock.remaining(), 0);
        assert!(clock.is_finished());
    }

    #[test]
    fn test_progress() {
        assert_eq!(PlaybackClock::new(0, 0).progress(), 0.0);
        assert_eq!(PlaybackClock::new(90, 180).progress(), 0.5);
        assert_eq!(PlaybackClock::new(500, 180).progress(), 1.0);
    }

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(3725), "62:05");
    }
}
