use hal::display::{Mode, BYTES_PER_PIXEL};

use super::{font::FontPages, grid::CharacterMap, profile::Profile};

/// The sink's alpha is inverted, 0xFF is fully transparent and 0x00 opaque.
pub const TRANSPARENT: u8 = 0xFF;

pub struct Layer<'a> {
    pub map: &'a CharacterMap,
    pub profile: &'a Profile,
    pub fonts: &'a FontPages,
}

/// Swaps the first and third channel and inverts alpha.
#[inline]
fn blit_pixel(dst: &mut [u8], src: &[u8]) {
    dst[0] = src[2];
    dst[1] = src[1];
    dst[2] = src[0];
    dst[3] = !src[3];
}

fn draw_layer(surface: &mut [u8], mode: &Mode, layer: &Layer) {
    let profile = layer.profile;
    if !profile.fits(mode) || surface.len() < mode.buffer_size() {
        warn!("Profile {}x{} does not fit surface", profile.columns, profile.rows);
        return;
    }
    let stride = mode.stride();
    let (glyph_width, glyph_height) = (profile.glyph_width as usize, profile.glyph_height as usize);
    let row_size = glyph_width * BYTES_PER_PIXEL;
    for (x, y, c) in layer.map.cells(profile) {
        let glyph = match layer.fonts.glyph(c) {
            Some(glyph) => glyph,
            None => continue,
        };
        let pixel_x = x as usize * glyph_width + profile.x_offset as usize;
        let pixel_y = y as usize * glyph_height + profile.y_offset as usize;
        for (gy, src) in glyph.chunks_exact(row_size).enumerate() {
            let offset = (pixel_y + gy) * stride + pixel_x * BYTES_PER_PIXEL;
            let dst = &mut surface[offset..offset + row_size];
            let pixels = dst.chunks_exact_mut(BYTES_PER_PIXEL).zip(src.chunks_exact(BYTES_PER_PIXEL));
            for (d, s) in pixels {
                blit_pixel(d, s);
            }
        }
    }
}

/// Clears `surface` then draws `layers` in order, later layers on top.
pub fn composite(surface: &mut [u8], mode: &Mode, layers: &[Layer]) {
    surface.fill(TRANSPARENT);
    for layer in layers.iter() {
        draw_layer(surface, mode, layer);
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use hal::display::Mode;
    use tempfile::TempDir;

    use super::{composite, Layer, TRANSPARENT};
    use crate::osd::font::{font_path, test::TINY, FontPages};
    use crate::osd::grid::CharacterMap;
    use crate::osd::profile::Profile;

    const MODE: Mode = Mode { width: 16, height: 12, plane_id: 0 };
    const PRIMARY: Profile = Profile { columns: 4, rows: 2, x_offset: 1, y_offset: 2, ..TINY };
    const OVERLAY: Profile = Profile { columns: 2, rows: 1, x_offset: 3, y_offset: 2, ..TINY };

    /// Glyph `c` pixels are R=c, G=0x20, B=0x40, A=0x0F
    fn load_fonts(page2: bool) -> (TempDir, FontPages) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("font");
        let mut bytes = Vec::new();
        for c in 0..=255u8 {
            for _ in 0..TINY.glyph_width as usize * TINY.glyph_height as usize {
                bytes.extend_from_slice(&[c, 0x20, 0x40, 0x0F]);
            }
        }
        fs::write(font_path(&base, TINY.font, 0), &bytes).unwrap();
        if page2 {
            bytes.iter_mut().for_each(|b| *b = !*b);
            fs::write(font_path(&base, TINY.font, 1), &bytes).unwrap();
        }
        let pages = FontPages::load(&[base], &TINY);
        (dir, pages)
    }

    fn pixel(surface: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * MODE.width + x) * 4;
        [surface[offset], surface[offset + 1], surface[offset + 2], surface[offset + 3]]
    }

    fn render(map: &CharacterMap, fonts: &FontPages) -> Vec<u8> {
        let mut surface = vec![0u8; MODE.buffer_size()];
        let overlay = CharacterMap::new();
        let layers = [
            Layer { map, profile: &PRIMARY, fonts },
            Layer { map: &overlay, profile: &OVERLAY, fonts },
        ];
        composite(&mut surface, &MODE, &layers);
        surface
    }

    #[test]
    fn test_blit() {
        let (_dir, fonts) = load_fonts(false);
        let mut map = CharacterMap::new();
        map.draw_character(&PRIMARY, 1, 1, 0x41);
        let surface = render(&map, &fonts);

        // cell (1, 1) starts at pixel (1 + 2, 2 + 3)
        for (x, y) in [(3, 5), (4, 5), (3, 7), (4, 7)] {
            assert_eq!(pixel(&surface, x, y), [0x40, 0x20, 0x41, 0xF0]);
        }
        for (x, y) in [(2, 5), (5, 5), (3, 4), (3, 8), (0, 0), (15, 11)] {
            assert_eq!(pixel(&surface, x, y), [TRANSPARENT; 4]);
        }
    }

    #[test]
    fn test_empty_cell_is_transparent() {
        let (_dir, fonts) = load_fonts(false);
        let surface = render(&CharacterMap::new(), &fonts);
        assert!(surface.iter().all(|&b| b == TRANSPARENT));
    }

    #[test]
    fn test_extended_code() {
        let (_dir, fonts) = load_fonts(false);
        let mut map = CharacterMap::new();
        map.draw_character(&PRIMARY, 0, 0, 260);
        let surface = render(&map, &fonts);
        assert_eq!(pixel(&surface, 1, 2), [0x40, 0x20, 4, 0xF0]);

        let (_dir, fonts) = load_fonts(true);
        let surface = render(&map, &fonts);
        assert_eq!(pixel(&surface, 1, 2), [!0x40u8, !0x20, !4, 0x0F]);
    }

    #[test]
    fn test_missing_font() {
        let mut map = CharacterMap::new();
        map.draw_character(&PRIMARY, 0, 0, 0x41);
        let surface = render(&map, &FontPages::default());
        assert!(surface.iter().all(|&b| b == TRANSPARENT));
    }

    #[test]
    fn test_clear_then_replay() {
        let (_dir, fonts) = load_fonts(false);
        let writes = [(0, 0, 0x31), (3, 1, 0x32), (9, 9, 0x33), (2, 0, 0x134)];

        let mut dirty = CharacterMap::new();
        for y in 0..2 {
            for x in 0..4 {
                dirty.draw_character(&PRIMARY, x, y, 0x7F);
            }
        }
        dirty.clear();
        let mut fresh = CharacterMap::new();
        for &(x, y, c) in writes.iter() {
            dirty.draw_character(&PRIMARY, x, y, c);
            fresh.draw_character(&PRIMARY, x, y, c);
        }
        assert_eq!(render(&dirty, &fonts), render(&fresh, &fonts));
    }

    #[test]
    fn test_overlay_on_top() {
        let (_dir, fonts) = load_fonts(false);
        let mut map = CharacterMap::new();
        map.draw_character(&PRIMARY, 1, 0, 0x41);
        let mut overlay = CharacterMap::new();
        overlay.draw_character(&OVERLAY, 0, 0, 0x42);

        let mut surface = vec![0u8; MODE.buffer_size()];
        let layers = [
            Layer { map: &map, profile: &PRIMARY, fonts: &fonts },
            Layer { map: &overlay, profile: &OVERLAY, fonts: &fonts },
        ];
        composite(&mut surface, &MODE, &layers);
        assert_eq!(pixel(&surface, 3, 2), [0x40, 0x20, 0x42, 0xF0]);
    }

    #[test]
    fn test_profile_outside_surface() {
        let (_dir, fonts) = load_fonts(false);
        let wide = Profile { x_offset: 10, ..PRIMARY };
        let mut map = CharacterMap::new();
        map.draw_character(&wide, 0, 0, 0x41);

        let mut surface = vec![0u8; MODE.buffer_size()];
        composite(&mut surface, &MODE, &[Layer { map: &map, profile: &wide, fonts: &fonts }]);
        assert!(surface.iter().all(|&b| b == TRANSPARENT));
    }
}
