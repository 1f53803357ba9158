pub mod compositor;
pub mod font;
pub mod grid;
pub mod profile;
pub mod screen;

pub use font::{FontPages, FontStore};
pub use grid::CharacterMap;
pub use profile::{FontVariant, Profile};
pub use screen::Screen;
