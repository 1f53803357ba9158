use ascii::AsciiStr;

use super::profile::Profile;

pub const MAX_COLUMNS: usize = 50;
pub const MAX_ROWS: usize = 18;

/// Glyph codes indexed by column then row, 0 means empty.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterMap([[u16; MAX_ROWS]; MAX_COLUMNS]);

impl Default for CharacterMap {
    fn default() -> Self {
        Self([[0; MAX_ROWS]; MAX_COLUMNS])
    }
}

fn visible(profile: &Profile, x: u32, y: u32) -> bool {
    profile.contains(x, y) && (x as usize) < MAX_COLUMNS && (y as usize) < MAX_ROWS
}

impl CharacterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|column| column.fill(0));
    }

    /// Out of bounds writes are dropped, returns whether the cell was written.
    pub fn draw_character(&mut self, profile: &Profile, x: u32, y: u32, c: u16) -> bool {
        if !visible(profile, x, y) {
            return false;
        }
        self.0[x as usize][y as usize] = c;
        true
    }

    pub fn get(&self, x: u32, y: u32) -> u16 {
        match (x as usize) < MAX_COLUMNS && (y as usize) < MAX_ROWS {
            true => self.0[x as usize][y as usize],
            false => 0,
        }
    }

    pub fn print(&mut self, profile: &Profile, x: u32, y: u32, text: &AsciiStr) {
        for (i, &ch) in text.as_slice().iter().enumerate() {
            self.draw_character(profile, x + i as u32, y, ch.as_byte() as u16);
        }
    }

    /// Non-empty cells inside `profile`, row-major
    pub fn cells<'a>(&'a self, profile: &Profile) -> impl Iterator<Item = (u32, u32, u16)> + 'a {
        let columns = (profile.columns as usize).min(MAX_COLUMNS) as u32;
        let rows = (profile.rows as usize).min(MAX_ROWS) as u32;
        (0..rows)
            .flat_map(move |y| (0..columns).map(move |x| (x, y)))
            .map(move |(x, y)| (x, y, self.0[x as usize][y as usize]))
            .filter(|&(_, _, c)| c != 0)
    }

    pub fn dump(&self, profile: &Profile) -> String {
        let mut text = String::new();
        for y in 0..profile.rows as u32 {
            for x in 0..profile.columns as u32 {
                text.push(match self.get(x, y) {
                    0 => '.',
                    c @ 0x20..=0x7E => c as u8 as char,
                    _ => '#',
                });
            }
            text.push('\n');
        }
        text
    }
}

mod test {
    #[test]
    fn test_draw_character() {
        use super::CharacterMap;
        use crate::osd::profile::{HD, SD};

        let mut map = CharacterMap::new();
        assert!(map.draw_character(&SD, 30, 14, 0x41));
        assert_eq!(map.get(30, 14), 0x41);

        let snapshot = map.clone();
        assert!(!map.draw_character(&SD, 31, 0, 0x41));
        assert!(!map.draw_character(&SD, 0, 15, 0x41));
        assert!(!map.draw_character(&HD, 50, 0, 0x41));
        assert!(!map.draw_character(&HD, u32::MAX, u32::MAX, 0x41));
        assert_eq!(map, snapshot);

        assert!(map.draw_character(&HD, 49, 17, 0x141));
        assert_eq!(map.get(49, 17), 0x141);
        map.clear();
        assert_eq!(map, CharacterMap::new());
    }

    #[test]
    fn test_cells_row_major() {
        use ascii::AsciiStr;

        use super::CharacterMap;
        use crate::osd::profile::OVERLAY;

        let mut map = CharacterMap::new();
        map.print(&OVERLAY, 18, 1, AsciiStr::from_ascii("XYZ").unwrap());
        map.draw_character(&OVERLAY, 3, 0, 0x20);
        let cells: Vec<_> = map.cells(&OVERLAY).collect();
        assert_eq!(cells, vec![(3, 0, 0x20), (18, 1, 0x58), (19, 1, 0x59)]);
    }

    #[test]
    fn test_dump() {
        use ascii::AsciiStr;

        use super::CharacterMap;
        use crate::osd::profile::Profile;

        let profile = Profile { columns: 4, rows: 2, ..crate::osd::profile::HD };
        let mut map = CharacterMap::new();
        map.print(&profile, 1, 1, AsciiStr::from_ascii("OK").unwrap());
        map.draw_character(&profile, 0, 0, 0x101);
        assert_eq!(map.dump(&profile), "#...\n.OK.\n");
    }
}
