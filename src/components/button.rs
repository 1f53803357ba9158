use core::time::Duration;

/// Fires once a press has been held for `threshold`.
///
/// Only one hold is pending at a time, a new press restarts the measurement.
pub struct HoldButton {
    threshold: Duration,
    pressed_at: Option<Duration>,
}

impl HoldButton {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold, pressed_at: None }
    }

    pub fn press(&mut self, now: Duration) {
        self.pressed_at = Some(now);
    }

    pub fn release(&mut self, now: Duration) -> bool {
        let held = self.poll(now);
        self.pressed_at = None;
        held
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        match self.pressed_at {
            Some(pressed_at) if now.saturating_sub(pressed_at) >= self.threshold => {
                self.pressed_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pressed_at.is_some()
    }
}

mod test {
    #[test]
    fn test_hold_button() {
        use core::time::Duration;

        use super::HoldButton;

        let secs = Duration::from_secs;
        let mut button = HoldButton::new(secs(4));

        button.press(secs(0));
        assert!(!button.poll(secs(3)));
        assert!(!button.release(secs(3)));
        assert!(!button.is_pending());
        assert!(!button.poll(secs(10)));

        button.press(secs(10));
        button.press(secs(12));
        assert!(!button.poll(secs(15)));
        assert!(button.poll(secs(16)));
        assert!(!button.poll(secs(30)));
        assert!(!button.release(secs(30)));

        button.press(secs(40));
        assert!(button.release(secs(45)));
    }
}
