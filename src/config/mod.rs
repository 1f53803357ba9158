pub mod display;
pub mod inputs;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_more::{Display, From};
use serde::Deserialize;

pub use display::Banner;
pub use inputs::Button;

pub const SDCARD_FONT_PATH: &str = "/storage/sdcard0/font";
pub const ENTWARE_FONT_PATH: &str = "/opt/fonts/font";
pub const FALLBACK_FONT_PATH: &str = "/blackbox/font";

#[derive(Debug, Display, From)]
pub enum Error {
    #[display(fmt = "Read config failed: {}", _0)]
    Io(io::Error),
    #[display(fmt = "Malformed config: {}", _0)]
    Parse(toml::de::Error),
    #[display(fmt = "{} must be ASCII", _0)]
    #[from(ignore)]
    NotAscii(&'static str),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Network {
    pub bind_address: String,
    pub msp_port: u16,
    pub data_port: u16,
}

impl Default for Network {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".into(), msp_port: 7654, data_port: 7655 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Font {
    /// Base names tried in order, see `osd::font::font_path`
    pub search_paths: Vec<PathBuf>,
}

impl Default for Font {
    fn default() -> Self {
        let paths = [SDCARD_FONT_PATH, ENTWARE_FONT_PATH, FALLBACK_FONT_PATH];
        Self { search_paths: paths.iter().map(PathBuf::from).collect() }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Session {
    pub start_enabled: bool,
    pub settle_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self { start_enabled: false, settle_ms: 1000, poll_interval_ms: 100 }
    }
}

impl Session {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Commands handing the display plane over to and back from the stock UI
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Service {
    pub relinquish: Vec<String>,
    pub resume: Vec<String>,
}

impl Default for Service {
    fn default() -> Self {
        let command = |value: &str| ["setprop", "dji.glasses_service", value].map(String::from);
        Self { relinquish: command("0").to_vec(), resume: command("1").to_vec() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub network: Network,
    pub font: Font,
    pub button: Button,
    pub session: Session,
    pub display: display::Display,
    pub banner: Banner,
    pub service: Service,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.banner.validate()?;
        Ok(config)
    }

    /// Defaults when `path` does not exist
    pub fn load(path: &Path) -> Result<Self, Error> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

mod test {
    #[test]
    fn test_parse() {
        use std::path::PathBuf;

        use indoc::indoc;

        use super::Config;

        let text = indoc! {"
            [network]
            msp-port = 8000

            [font]
            search-paths = ['/tmp/font']

            [button]
            code = 100
            hold-ms = 2500

            [session]
            start-enabled = true

            [banner]
            startup = 'HELLO'
        "};
        let config = Config::parse(text).unwrap();
        assert_eq!(config.network.msp_port, 8000);
        assert_eq!(config.network.data_port, 7655);
        assert_eq!(config.font.search_paths, vec![PathBuf::from("/tmp/font")]);
        assert_eq!(config.button.code, 100);
        assert_eq!(config.button.hold().as_millis(), 2500);
        assert!(config.session.start_enabled);
        assert_eq!(config.session.settle_ms, 1000);
        assert_eq!(config.banner.startup, "HELLO");
        assert_eq!(config.banner.shutdown, "SHUTTING DOWN...");
        assert_eq!(config.display.mode().buffer_size(), 1440 * 810 * 4);
    }

    #[test]
    fn test_defaults() {
        use std::path::Path;

        use super::Config;

        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.font.search_paths.len(), 3);
        assert_eq!(config.service.relinquish, vec!["setprop", "dji.glasses_service", "0"]);

        let missing = Config::load(Path::new("/nonexistent/msp-osd.toml")).unwrap();
        assert_eq!(missing, Config::default());
    }

    #[test]
    fn test_invalid() {
        use super::{Config, Error};

        assert!(matches!(Config::parse("[banner]\nstartup = 'OSD ÜBER'"), Err(Error::NotAscii(_))));
        assert!(matches!(Config::parse("[network]\nmsp-port = 'x'"), Err(Error::Parse(_))));
    }
}
