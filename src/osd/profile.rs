use hal::display::Mode;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FontVariant {
    SD,
    HD,
}

/// Character grid geometry and the font pages backing it
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Profile {
    pub columns: u8,
    pub rows: u8,
    pub glyph_width: u8,
    pub glyph_height: u8,
    pub x_offset: u16,
    pub y_offset: u16,
    pub font: FontVariant,
}

pub const SD: Profile = Profile {
    columns: 31,
    rows: 15,
    glyph_width: 36,
    glyph_height: 54,
    x_offset: 180,
    y_offset: 0,
    font: FontVariant::SD,
};

pub const HD: Profile = Profile {
    columns: 50,
    rows: 18,
    glyph_width: 24,
    glyph_height: 36,
    x_offset: 120,
    y_offset: 80,
    font: FontVariant::HD,
};

/// Status readout in the lower right corner, always HD glyphs
pub const OVERLAY: Profile = Profile {
    columns: 20,
    rows: 10,
    glyph_width: 24,
    glyph_height: 36,
    x_offset: 960,
    y_offset: 450,
    font: FontVariant::HD,
};

impl Profile {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.columns as u32 && y < self.rows as u32
    }

    pub fn glyph_size(&self) -> usize {
        self.glyph_width as usize * self.glyph_height as usize * hal::display::BYTES_PER_PIXEL
    }

    pub fn font_page_size(&self) -> usize {
        self.glyph_size() * 256
    }

    pub fn fits(&self, mode: &Mode) -> bool {
        let width = self.x_offset as usize + self.columns as usize * self.glyph_width as usize;
        let height = self.y_offset as usize + self.rows as usize * self.glyph_height as usize;
        width <= mode.width && height <= mode.height
    }
}

mod test {
    #[test]
    fn test_profiles_fit_surface() {
        use hal::display::Mode;

        use super::{HD, OVERLAY, SD};

        let mode = Mode { width: 1440, height: 810, plane_id: 6 };
        assert!(SD.fits(&mode));
        assert!(HD.fits(&mode));
        assert!(OVERLAY.fits(&mode));
        assert!(!SD.fits(&Mode { width: 1280, height: 720, plane_id: 6 }));
        assert_eq!(HD.font_page_size(), 24 * 36 * 256 * 4);
    }
}
