/// Trailing-edge debounce timer driven by an external clock.
///
/// Time is whatever monotonic seconds the caller supplies (the frame clock in
/// the app, plain numbers in tests). There is at most one pending deadline:
/// restarting replaces it, cancelling clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer {
    window_secs: f64,
    pending: Option<f64>,
}

impl Debouncer {
    pub fn new(window_secs: f64) -> Self {
        Self {
            window_secs,
            pending: None,
        }
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Start the window again from `now`, dropping any earlier deadline
    pub fn restart(&mut self, now: f64) {
        self.pending = Some(now + self.window_secs);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds until the pending deadline, if any
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending.map(|deadline| (deadline - now).max(0.0))
    }

    /// Returns true exactly once when the quiet period has elapsed
    pub fn poll(&mut self, now: f64) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_quiet_period() {
        let mut debounce = Debouncer::new(0.5);
        debounce.restart(10.0);
        assert!(!debounce.poll(10.49));
        assert!(debounce.poll(10.5));
        assert!(!debounce.poll(11.0));
    }

    #[test]
    fn test_restart_pushes_deadline_back() {
        let mut debounce = Debouncer::new(0.5);
        debounce.restart(0.0);
        debounce.restart(0.3);
        assert!(!debounce.poll(0.6));
        assert!(debounce.poll(0.8));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut debounce = Debouncer::new(0.5);
        debounce.restart(0.0);
        debounce.cancel();
        assert!(!debounce.poll(5.0));
        assert_eq!(debounce.remaining(5.0), None);
    }
}
