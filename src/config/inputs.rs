use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Back button of the goggles
pub const EV_CODE_BACK: u16 = 0xc9;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Button {
    pub device: PathBuf,
    pub code: u16,
    pub hold_ms: u64,
}

impl Default for Button {
    fn default() -> Self {
        Self { device: PathBuf::from("/dev/input/event0"), code: EV_CODE_BACK, hold_ms: 4000 }
    }
}

impl Button {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}
