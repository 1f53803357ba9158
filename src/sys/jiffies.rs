use std::sync::OnceLock;
use std::time::{Duration, Instant};

static START: OnceLock<Instant> = OnceLock::new();

pub fn init() {
    START.get_or_init(Instant::now);
}

/// Monotonic time since `init`, or since the first call
pub fn get() -> Duration {
    START.get_or_init(Instant::now).elapsed()
}

mod test {
    #[test]
    fn test_monotonic() {
        super::init();
        let first = super::get();
        let second = super::get();
        assert!(second >= first);
    }
}
