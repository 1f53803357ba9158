use derive_more::{Display, From};

use crate::config;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display(fmt = "{}", _0)]
    Config(config::Error),
    #[display(fmt = "Open display failed: {}", _0)]
    #[from(ignore)]
    Display(String),
}
