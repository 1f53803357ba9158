use std::path::PathBuf;

use ascii::AsciiString;
use hal::display::Mode;
use serde::Deserialize;

use super::Error;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Display {
    pub device: PathBuf,
    pub width: usize,
    pub height: usize,
    pub plane_id: u8,
}

impl Default for Display {
    fn default() -> Self {
        Self { device: PathBuf::from("/dev/fb0"), width: 1440, height: 810, plane_id: 6 }
    }
}

impl Display {
    pub fn mode(&self) -> Mode {
        Mode { width: self.width, height: self.height, plane_id: self.plane_id }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub startup: String,
    pub shutdown: String,
}

impl Default for Banner {
    fn default() -> Self {
        Self { startup: "OSD WAITING...".into(), shutdown: "SHUTTING DOWN...".into() }
    }
}

impl Banner {
    pub fn validate(&self) -> Result<(), Error> {
        self.to_ascii().map(|_| ())
    }

    pub fn to_ascii(&self) -> Result<(AsciiString, AsciiString), Error> {
        let startup = AsciiString::from_ascii(self.startup.as_str())
            .map_err(|_| Error::NotAscii("banner.startup"))?;
        let shutdown = AsciiString::from_ascii(self.shutdown.as_str())
            .map_err(|_| Error::NotAscii("banner.shutdown"))?;
        Ok((startup, shutdown))
    }
}
