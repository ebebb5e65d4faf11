use std::time::{
    Duration,
    Instant,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckCursor {
    pub position: usize,
    pub flipped: bool,
    pub transitioning: bool,
}

/// Deadline for a pending advance. Polled by the host loop, never slept on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    due: Instant,
}

impl SettleTimer {
    pub fn start(now: Instant, delay: Duration) -> Self {
        Self { due: now + delay }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_once_deadline_passes() {
        let start = Instant::now();
        let timer = SettleTimer::start(start, Duration::from_millis(250));

        assert!(!timer.is_due(start));
        assert_eq!(timer.remaining(start), Duration::from_millis(250));
        assert!(timer.is_due(start + Duration::from_millis(250)));
        assert_eq!(timer.remaining(start + Duration::from_secs(1)), Duration::ZERO);
    }
}
