use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::profile::{self, FontVariant, Profile};

pub const NUM_PAGES: usize = 2;

pub fn font_path(base: &Path, variant: FontVariant, page: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    if variant == FontVariant::HD {
        name.push("_hd");
    }
    if page > 0 {
        name.push(format!("_{}", page + 1));
    }
    name.push(".bin");
    PathBuf::from(name)
}

/// Read-only mapping of 256 glyph bitmaps, unmapped on drop
pub struct FontPage {
    map: Mmap,
    glyph_size: usize,
}

impl FontPage {
    pub fn map(path: &Path, profile: &Profile) -> io::Result<Self> {
        let file = File::open(path)?;
        let map = unsafe { Mmap::map(&file)? };
        if map.len() != profile.font_page_size() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "font size changed"));
        }
        Ok(Self { map, glyph_size: profile.glyph_size() })
    }

    pub fn glyph(&self, code: u8) -> &[u8] {
        let offset = code as usize * self.glyph_size;
        &self.map[offset..offset + self.glyph_size]
    }
}

fn load_page(search_paths: &[PathBuf], profile: &Profile, page: usize) -> Option<FontPage> {
    let expected = profile.font_page_size() as u64;
    for base in search_paths.iter() {
        let path = font_path(base, profile.font, page);
        let length = match fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(_) => continue,
        };
        if length != expected {
            warn!("Font {} has wrong size {} != {}", path.display(), length, expected);
            continue;
        }
        return match FontPage::map(&path, profile) {
            Ok(font_page) => {
                info!("Loaded font {}", path.display());
                Some(font_page)
            }
            Err(e) => {
                warn!("Could not map font {}: {}", path.display(), e);
                None
            }
        };
    }
    None
}

#[derive(Default)]
pub struct FontPages([Option<FontPage>; NUM_PAGES]);

impl FontPages {
    pub fn load(search_paths: &[PathBuf], profile: &Profile) -> Self {
        let mut pages = Self::default();
        for (index, page) in pages.0.iter_mut().enumerate() {
            *page = load_page(search_paths, profile, index);
        }
        if pages.0[0].is_none() {
            warn!("No {:?} font found, glyphs will not be drawn", profile.font);
        }
        pages
    }

    pub fn unload(&mut self) {
        self.0.iter_mut().for_each(|page| *page = None);
    }

    pub fn is_loaded(&self, page: usize) -> bool {
        self.0.get(page).map(|page| page.is_some()).unwrap_or(false)
    }

    /// Codes above 255 use page 2, falling back to page 1 when absent
    pub fn glyph(&self, code: u16) -> Option<&[u8]> {
        let page = match code > 0xFF {
            true => self.0[1].as_ref().or(self.0[0].as_ref()),
            false => self.0[0].as_ref(),
        };
        page.map(|page| page.glyph((code & 0xFF) as u8))
    }
}

/// SD and HD font pages, the overlay shares the HD pages
pub struct FontStore {
    search_paths: Vec<PathBuf>,
    sd: FontPages,
    hd: FontPages,
}

impl FontStore {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths, sd: FontPages::default(), hd: FontPages::default() }
    }

    pub fn load(&mut self) {
        self.sd = FontPages::load(&self.search_paths, &profile::SD);
        self.hd = FontPages::load(&self.search_paths, &profile::HD);
    }

    pub fn unload(&mut self) {
        self.sd.unload();
        self.hd.unload();
    }

    pub fn pages(&self, variant: FontVariant) -> &FontPages {
        match variant {
            FontVariant::SD => &self.sd,
            FontVariant::HD => &self.hd,
        }
    }
}
