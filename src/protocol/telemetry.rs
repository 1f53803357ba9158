use core::fmt::{self, Write};

use heapless::String;

pub const RECORD_SIZE: usize = 8;
/// Overlay texts never exceed 7 characters
pub const MAX_TEXT_LENGTH: usize = 7;
const VOLTAGE_SCALE: f32 = 64.0;

fn truncated(args: fmt::Arguments) -> String<8> {
    let mut full: String<16> = String::new();
    full.write_fmt(args).ok();
    let length = full.len().min(MAX_TEXT_LENGTH);
    let mut text = String::new();
    text.push_str(&full[..length]).ok();
    text
}

/// Fixed-layout little-endian record from the air unit
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    /// kbit/s
    pub bitrate: u32,
    pub temperature: u16,
    pub voltage: u16,
}

impl Telemetry {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RECORD_SIZE {
            return None;
        }
        Some(Self {
            bitrate: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            temperature: u16::from_le_bytes([bytes[4], bytes[5]]),
            voltage: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }

    pub fn volts(&self) -> f32 {
        self.voltage as f32 / VOLTAGE_SCALE
    }

    pub fn temperature_text(&self) -> String<8> {
        truncated(format_args!("{} C", self.temperature))
    }

    pub fn voltage_text(&self) -> String<8> {
        truncated(format_args!("A {:2.1}V", self.volts()))
    }
}

mod test {
    #[test]
    fn test_parse() {
        use hex_literal::hex;

        use super::Telemetry;

        let record = hex!("10 27 00 00 2A 00 80 00");
        let telemetry = Telemetry::parse(&record).unwrap();
        assert_eq!(telemetry, Telemetry { bitrate: 10000, temperature: 42, voltage: 128 });
        assert_eq!(telemetry.temperature_text().as_str(), "42 C");
        assert_eq!(telemetry.voltage_text().as_str(), "A 2.0V");
        assert_eq!(Telemetry::parse(&record[..7]), None);
    }

    #[test]
    fn test_voltage_text() {
        use super::Telemetry;

        let telemetry = Telemetry { voltage: 800, ..Default::default() };
        assert_eq!(telemetry.voltage_text().as_str(), "A 12.5V");
    }

    #[test]
    fn test_text_truncated() {
        use super::Telemetry;

        let telemetry = Telemetry { temperature: 65535, voltage: 65535, ..Default::default() };
        assert_eq!(telemetry.voltage_text().as_str(), "A 1024.");
        assert_eq!(telemetry.temperature_text().as_str(), "65535 C");
    }
}
