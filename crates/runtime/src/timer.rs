use std::time::{Duration, Instant};

/// A single cancellable deadline carrying a payload.
///
/// The timer never fires on its own; the owner polls it with the current
/// instant. Scheduling again replaces whatever was pending. A delay too large
/// to represent as an `Instant` stays pending without ever coming due.
#[derive(Debug, Clone)]
pub struct DelayTimer<T> {
    pending: Option<(Option<Instant>, T)>,
}

impl<T> DelayTimer<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Returns the payload that was displaced, if any.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> Option<T> {
        self.pending
            .replace((now.checked_add(delay), payload))
            .map(|(_, old)| old)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, p)| p)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// `None` when nothing is pending or the deadline is unreachable.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and_then(|(d, _)| *d)
    }

    /// Takes the payload once `now` has reached the deadline.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((Some(deadline), _)) if now >= *deadline => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }
}

impl<T> Default for DelayTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::DelayTimer;
    use std::time::{Duration, Instant};

    #[test]
    fn fires_only_after_deadline() {
        let t0 = Instant::now();
        let mut timer = DelayTimer::new();
        timer.schedule(t0, Duration::from_millis(300), "tip");

        assert_eq!(timer.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(timer.poll(t0 + Duration::from_millis(300)), Some("tip"));
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn rescheduling_replaces_pending_payload() {
        let t0 = Instant::now();
        let mut timer = DelayTimer::new();
        timer.schedule(t0, Duration::from_millis(100), 1);
        let displaced = timer.schedule(t0 + Duration::from_millis(50), Duration::from_millis(100), 2);
        assert_eq!(displaced, Some(1));

        assert_eq!(timer.poll(t0 + Duration::from_millis(120)), None);
        assert_eq!(timer.poll(t0 + Duration::from_millis(150)), Some(2));
    }

    #[test]
    fn cancel_clears() {
        let t0 = Instant::now();
        let mut timer = DelayTimer::new();
        timer.schedule(t0, Duration::ZERO, ());
        assert_eq!(timer.cancel(), Some(()));
        assert_eq!(timer.poll(t0), None);
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn overflowing_delay_stays_pending() {
        let t0 = Instant::now();
        let mut timer = DelayTimer::new();
        assert_eq!(timer.schedule(t0, Duration::MAX, "never"), None);
        assert!(timer.is_pending());
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.poll(t0 + Duration::from_secs(365 * 86_400)), None);

        timer.schedule(t0, Duration::from_millis(10), "soon");
        assert_eq!(timer.poll(t0 + Duration::from_millis(10)), Some("soon"));
    }
}
