use core::time::Duration;

use ascii::AsciiString;
use hal::display::FrameSink;
use hal::service::DisplayService;

use super::button::HoldButton;
use crate::config::{self, Banner};
use crate::osd::Screen;
use crate::protocol::displayport::{self, Renderer};
use crate::protocol::msp::MSP;
use crate::protocol::telemetry::Telemetry;
use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DisplayMode {
    Disabled,
    Waiting,
    Running,
}

pub struct Banners {
    pub startup: AsciiString,
    pub shutdown: AsciiString,
}

impl TryFrom<&Banner> for Banners {
    type Error = config::Error;

    fn try_from(banner: &Banner) -> Result<Self, config::Error> {
        let (startup, shutdown) = banner.to_ascii()?;
        Ok(Self { startup, shutdown })
    }
}

/// Overlay lifecycle driven by a held button.
///
/// Disabled -> Waiting when the hold fires, the stock UI is asked to release
/// the display. Waiting -> Running once `settle` has elapsed, the screen is
/// opened. Another hold goes back to Disabled from either state.
pub struct Session<S, D> {
    mode: DisplayMode,
    screen: Screen<S>,
    service: D,
    decoder: MSP,
    button: HoldButton,
    settle: Duration,
    waiting_since: Duration,
    banners: Banners,
}

impl<S: FrameSink, D: DisplayService> Session<S, D> {
    pub fn new(
        screen: Screen<S>,
        service: D,
        button: HoldButton,
        settle: Duration,
        banners: Banners,
    ) -> Self {
        Self {
            mode: DisplayMode::Disabled,
            screen,
            service,
            decoder: MSP::new(),
            button,
            settle,
            waiting_since: Duration::ZERO,
            banners,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn screen(&self) -> &Screen<S> {
        &self.screen
    }

    pub fn service(&self) -> &D {
        &self.service
    }

    /// Straight to Running, for hosts that already own the display
    pub fn start(&mut self) -> Result<(), Error> {
        if self.mode != DisplayMode::Running {
            self.start_display()?;
        }
        Ok(())
    }

    pub fn on_button(&mut self, pressed: bool, now: Duration) -> Result<(), Error> {
        if pressed {
            self.button.press(now);
            return Ok(());
        }
        if self.button.release(now) {
            self.toggle(now);
        }
        self.tick(now)
    }

    pub fn tick(&mut self, now: Duration) -> Result<(), Error> {
        if self.button.poll(now) {
            self.toggle(now);
        }
        if self.mode == DisplayMode::Waiting && now.saturating_sub(self.waiting_since) >= self.settle {
            self.start_display()?;
        }
        Ok(())
    }

    pub fn on_msp_data(&mut self, bytes: &[u8]) {
        if self.mode != DisplayMode::Running {
            return;
        }
        let screen = &mut self.screen;
        self.decoder.receive(bytes, |message| displayport::process(&mut *screen, message));
    }

    pub fn on_telemetry(&mut self, bytes: &[u8]) {
        if self.mode != DisplayMode::Running {
            return;
        }
        match Telemetry::parse(bytes) {
            Some(telemetry) => {
                debug!(
                    "Telemetry {} kbps {} C {:.1} V",
                    telemetry.bitrate,
                    telemetry.temperature,
                    telemetry.volts()
                );
                self.screen.update_telemetry(&telemetry);
            }
            None => debug!("Drop telemetry record of {} bytes", bytes.len()),
        }
    }

    /// Orderly stop on termination, same as holding the button while enabled
    pub fn shutdown(&mut self) {
        if self.mode != DisplayMode::Disabled {
            self.disable();
        }
    }

    fn toggle(&mut self, now: Duration) {
        match self.mode {
            DisplayMode::Disabled => {
                info!("Switching Disabled -> Waiting");
                self.service.relinquish();
                self.waiting_since = now;
                self.mode = DisplayMode::Waiting;
            }
            DisplayMode::Waiting | DisplayMode::Running => {
                info!("Switching {:?} -> Disabled", self.mode);
                self.disable();
            }
        }
    }

    fn start_display(&mut self) -> Result<(), Error> {
        self.decoder.reset();
        if let Err(e) = self.screen.open() {
            return Err(Error::Display(format!("{:?}", e)));
        }
        info!("Display running");
        self.screen.print_banner(&self.banners.startup);
        self.screen.draw_complete();
        self.mode = DisplayMode::Running;
        Ok(())
    }

    fn disable(&mut self) {
        if self.mode == DisplayMode::Running {
            self.screen.print_banner(&self.banners.shutdown);
            self.screen.draw_complete();
        }
        self.screen.close();
        self.mode = DisplayMode::Disabled;
        self.service.resume();
    }
}

#[cfg(test)]
mod test {
    use core::time::Duration;
    use std::path::PathBuf;

    use hal::display::Mode;
    use hal::service::DisplayService;
    use hex_literal::hex;

    use super::{Banners, DisplayMode, Session};
    use crate::components::button::HoldButton;
    use crate::config::Banner;
    use crate::drivers::memory::MemorySink;
    use crate::osd::profile::{OVERLAY, SD};
    use crate::osd::{FontStore, Screen};
    use crate::protocol::msp::{Direction, Message};

    #[derive(Default)]
    struct Service(Vec<&'static str>);

    impl DisplayService for Service {
        fn relinquish(&mut self) {
            self.0.push("relinquish")
        }

        fn resume(&mut self) {
            self.0.push("resume")
        }
    }

    const MODE: Mode = Mode { width: 1440, height: 810, plane_id: 6 };

    fn secs(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    fn session(sink: MemorySink) -> Session<MemorySink, Service> {
        let fonts = FontStore::new(vec![PathBuf::from("/nonexistent/font")]);
        let screen = Screen::new(sink, MODE, fonts);
        let banners = Banners::try_from(&Banner::default()).unwrap();
        Session::new(screen, Service::default(), HoldButton::new(secs(4)), secs(1), banners)
    }

    fn overlay_row(session: &Session<MemorySink, Service>, y: u32) -> String {
        let map = session.screen().overlay();
        (0..OVERLAY.columns as u32).map(|x| map.get(x, y)).filter(|&c| c != 0).map(|c| c as u8 as char).collect()
    }

    fn displayport(payload: &[u8]) -> Vec<u8> {
        Message::new(Direction::Response, 182, payload).encode().unwrap().to_vec()
    }

    #[test]
    fn test_enable() {
        let mut session = session(MemorySink::default());
        session.on_button(true, secs(0)).unwrap();
        session.tick(secs(4)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Waiting);
        assert_eq!(session.service().0, vec!["relinquish"]);

        session.on_button(false, secs(4)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Waiting);
        assert!(!session.screen().is_open());

        session.tick(secs(5)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Running);
        assert_eq!(overlay_row(&session, OVERLAY.rows as u32 - 1), "OSD WAITING...");
        assert_eq!(session.screen().sink().presented(), &[0]);
    }

    #[test]
    fn test_short_hold_discarded() {
        let mut session = session(MemorySink::default());
        session.on_button(true, secs(0)).unwrap();
        session.on_button(false, secs(3)).unwrap();
        session.tick(secs(10)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Disabled);
        assert!(session.service().0.is_empty());
    }

    #[test]
    fn test_msp_gated_by_mode() {
        let mut session = session(MemorySink::default());
        let write = displayport(&hex!("03 01 02 00 41"));
        session.on_msp_data(&write);
        session.on_telemetry(&hex!("00 00 00 00 2A 00 80 00"));

        session.start().unwrap();
        assert_eq!(session.screen().primary().get(2, 1), 0);
        assert_eq!(overlay_row(&session, 2), "");

        session.on_msp_data(&write);
        session.on_msp_data(&displayport(&[4]));
        assert_eq!(session.screen().primary().get(2, 1), 0x41);
        assert_eq!(session.screen().sink().presented(), &[0, 1]);

        session.on_telemetry(&hex!("00 00 00 00 2A 00 80 00"));
        assert_eq!(overlay_row(&session, 2), "42 C");
        assert_eq!(overlay_row(&session, 3), "A 2.0V");
    }

    #[test]
    fn test_waiting_ignores_input() {
        let mut session = session(MemorySink::default());
        session.on_button(true, secs(0)).unwrap();
        session.on_button(false, secs(4)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Waiting);

        session.on_msp_data(&displayport(&hex!("03 01 02 00 41")));
        session.on_msp_data(&displayport(&[4]));
        session.on_telemetry(&hex!("00 00 00 00 2A 00 80 00"));
        assert_eq!(session.mode(), DisplayMode::Waiting);
        assert_eq!(session.screen().primary().cells(&SD).count(), 0);
        assert_eq!(session.screen().overlay().cells(&OVERLAY).count(), 0);
        assert!(session.screen().sink().presented().is_empty());
        assert!(!session.screen().sink().is_open());
        assert!(!session.screen().is_open());
    }

    #[test]
    fn test_disable() {
        let mut session = session(MemorySink::default());
        session.start().unwrap();
        session.on_button(true, secs(10)).unwrap();
        session.tick(secs(14)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Disabled);
        assert_eq!(overlay_row(&session, OVERLAY.rows as u32 - 1), "SHUTTING DOWN...");
        assert_eq!(session.screen().sink().presented(), &[0, 1]);
        assert!(!session.screen().sink().is_open());
        assert_eq!(session.service().0, vec!["resume"]);

        session.on_button(true, secs(20)).unwrap();
        session.tick(secs(24)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Waiting);
        session.on_button(true, secs(24)).unwrap();
        session.on_button(false, secs(28)).unwrap();
        assert_eq!(session.mode(), DisplayMode::Disabled);
        assert!(!session.screen().sink().is_open());
        assert_eq!(session.service().0, vec!["resume", "relinquish", "resume"]);
    }

    #[test]
    fn test_open_failure() {
        let mut session = session(MemorySink::unavailable());
        session.on_button(true, secs(0)).unwrap();
        session.tick(secs(4)).unwrap();
        assert!(session.tick(secs(5)).is_err());
        assert_eq!(session.mode(), DisplayMode::Waiting);

        session.shutdown();
        assert_eq!(session.mode(), DisplayMode::Disabled);
        assert_eq!(session.service().0, vec!["relinquish", "resume"]);
    }

    #[test]
    fn test_shutdown() {
        let mut session = session(MemorySink::default());
        session.shutdown();
        assert!(session.service().0.is_empty());

        session.start().unwrap();
        session.shutdown();
        assert_eq!(session.mode(), DisplayMode::Disabled);
        assert_eq!(session.screen().sink().presented(), &[0, 1]);
        assert_eq!(session.service().0, vec!["resume"]);
    }
}
