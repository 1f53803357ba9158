use ascii::AsciiStr;
use hal::display::{FrameSink, Mode, NUM_BUFFERS};

use super::compositor::{composite, Layer};
use super::font::FontStore;
use super::grid::CharacterMap;
use super::profile::{self, Profile};
use crate::protocol::displayport::Renderer;
use crate::protocol::telemetry::Telemetry;

/// Double buffered character display on top of a frame sink.
///
/// The primary map is driven by DisplayPort, the overlay map carries status
/// text and is always composited with the overlay profile on top.
pub struct Screen<S> {
    sink: S,
    mode: Mode,
    fonts: FontStore,
    primary: CharacterMap,
    overlay: CharacterMap,
    profile: Profile,
    which: usize,
    opened: bool,
}

impl<S: FrameSink> Screen<S> {
    pub fn new(sink: S, mode: Mode, fonts: FontStore) -> Self {
        Self {
            sink,
            mode,
            fonts,
            primary: CharacterMap::new(),
            overlay: CharacterMap::new(),
            profile: profile::SD,
            which: 0,
            opened: false,
        }
    }

    /// Loads fonts and opens the sink, fonts are released again if that fails.
    pub fn open(&mut self) -> Result<(), S::Error> {
        self.fonts.load();
        if let Err(e) = self.sink.open(&self.mode) {
            self.fonts.unload();
            return Err(e);
        }
        self.primary.clear();
        self.overlay.clear();
        self.which = 0;
        self.opened = true;
        Ok(())
    }

    pub fn close(&mut self) {
        if self.opened {
            self.sink.close();
            self.opened = false;
        }
        self.fonts.unload();
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn print_overlay(&mut self, x: u32, y: u32, text: &AsciiStr) {
        self.overlay.print(&profile::OVERLAY, x, y, text);
    }

    /// Bottom overlay row
    pub fn print_banner(&mut self, text: &AsciiStr) {
        self.print_overlay(0, profile::OVERLAY.rows as u32 - 1, text);
    }

    pub fn update_telemetry(&mut self, telemetry: &Telemetry) {
        let (columns, rows) = (profile::OVERLAY.columns as u32, profile::OVERLAY.rows as u32);
        self.overlay.clear();
        let temperature = telemetry.temperature_text();
        if let Ok(text) = AsciiStr::from_ascii(temperature.as_str()) {
            self.print_overlay(columns - 5, rows - 8, text);
        }
        let voltage = telemetry.voltage_text();
        if let Ok(text) = AsciiStr::from_ascii(voltage.as_str()) {
            self.print_overlay(columns - 7, rows - 7, text);
        }
    }

    pub fn primary(&self) -> &CharacterMap {
        &self.primary
    }

    pub fn overlay(&self) -> &CharacterMap {
        &self.overlay
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn draw_screen(&mut self) -> bool {
        let surface = match self.sink.buffer(self.which) {
            Some(surface) => surface,
            None => {
                warn!("Frame buffer {} not available", self.which);
                return false;
            }
        };
        let layers = [
            Layer {
                map: &self.primary,
                profile: &self.profile,
                fonts: self.fonts.pages(self.profile.font),
            },
            Layer {
                map: &self.overlay,
                profile: &profile::OVERLAY,
                fonts: self.fonts.pages(profile::OVERLAY.font),
            },
        ];
        composite(surface, &self.mode, &layers);
        true
    }
}

impl<S: FrameSink> Renderer for Screen<S> {
    fn draw_character(&mut self, x: u32, y: u32, c: u16) {
        self.primary.draw_character(&self.profile, x, y, c);
    }

    fn clear_screen(&mut self) {
        self.primary.clear();
    }

    fn draw_complete(&mut self) {
        if !self.opened || !self.draw_screen() {
            return;
        }
        if let Err(e) = self.sink.present(self.which) {
            warn!("Present frame buffer {} failed: {:?}", self.which, e);
            return;
        }
        self.which = (self.which + 1) % NUM_BUFFERS;
        if log_enabled!(log::Level::Trace) {
            trace!("Drew a frame\n{}", self.primary.dump(&self.profile));
        }
    }

    fn set_options(&mut self, font_variant: u8, is_hd: bool) {
        debug!("Set options font variant {} hd {}", font_variant, is_hd);
        self.primary.clear();
        self.profile = if is_hd { profile::HD } else { profile::SD };
    }
}

#[cfg(test)]
mod test {
    use std::io;
    use std::path::PathBuf;

    use ascii::AsciiStr;
    use hal::display::{FrameSink, Mode};

    use super::Screen;
    use crate::drivers::memory::MemorySink;
    use crate::osd::font::FontStore;
    use crate::osd::profile::{HD, SD};
    use crate::protocol::displayport::Renderer;
    use crate::protocol::telemetry::Telemetry;

    const MODE: Mode = Mode { width: 1440, height: 810, plane_id: 6 };

    fn screen() -> Screen<MemorySink> {
        let fonts = FontStore::new(vec![PathBuf::from("/nonexistent/font")]);
        Screen::new(MemorySink::default(), MODE, fonts)
    }

    fn row(screen: &Screen<MemorySink>, y: u32) -> String {
        let cells = (0..20).map(|x| screen.overlay().get(x, y));
        cells.map(|c| if c == 0 { '.' } else { c as u8 as char }).collect()
    }

    #[test]
    fn test_double_buffering() {
        let mut screen = screen();
        screen.draw_complete();
        assert!(screen.sink().presented().is_empty());

        screen.open().unwrap();
        screen.draw_complete();
        screen.draw_complete();
        screen.draw_complete();
        assert_eq!(screen.sink().presented(), &[0, 1, 0]);

        screen.close();
        assert!(!screen.is_open());
        assert!(!screen.sink().is_open());
    }

    /// Fails the first `failures` presents
    struct FlakySink {
        inner: MemorySink,
        failures: usize,
        attempts: Vec<usize>,
    }

    impl FrameSink for FlakySink {
        type Error = io::Error;

        fn open(&mut self, mode: &Mode) -> io::Result<()> {
            self.inner.open(mode)
        }

        fn mode(&self) -> Option<Mode> {
            self.inner.mode()
        }

        fn buffer(&mut self, index: usize) -> Option<&mut [u8]> {
            self.inner.buffer(index)
        }

        fn present(&mut self, index: usize) -> io::Result<()> {
            self.attempts.push(index);
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::Other, "vsync lost"));
            }
            self.inner.present(index)
        }

        fn close(&mut self) {
            self.inner.close()
        }
    }

    #[test]
    fn test_failed_present_keeps_buffer() {
        let fonts = FontStore::new(vec![PathBuf::from("/nonexistent/font")]);
        let sink = FlakySink { inner: MemorySink::default(), failures: 1, attempts: Vec::new() };
        let mut screen = Screen::new(sink, MODE, fonts);
        screen.open().unwrap();
        screen.draw_complete();
        screen.draw_complete();
        screen.draw_complete();
        assert_eq!(screen.sink().attempts, vec![0, 0, 1]);
        assert_eq!(screen.sink().inner.presented(), &[0, 1]);
    }

    #[test]
    fn test_set_options() {
        let mut screen = screen();
        screen.draw_character(40, 16, 0x41);
        assert_eq!(screen.primary().get(40, 16), 0);
        screen.draw_character(1, 1, 0x41);

        screen.set_options(0, true);
        assert_eq!(screen.profile(), &HD);
        assert_eq!(screen.primary().get(1, 1), 0);
        screen.draw_character(40, 16, 0x41);
        assert_eq!(screen.primary().get(40, 16), 0x41);

        screen.set_options(0, false);
        assert_eq!(screen.profile(), &SD);
        assert_eq!(screen.primary().get(40, 16), 0);
    }

    #[test]
    fn test_telemetry() {
        let mut screen = screen();
        screen.print_banner(AsciiStr::from_ascii("OSD WAITING...").unwrap());
        screen.update_telemetry(&Telemetry { bitrate: 25000, temperature: 42, voltage: 128 });
        assert_eq!(row(&screen, 2), "...............42 C.");
        assert_eq!(row(&screen, 3), ".............A 2.0V.");
        for y in (0..10).filter(|&y| y != 2 && y != 3) {
            assert_eq!(row(&screen, y), "....................");
        }
    }
}
