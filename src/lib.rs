extern crate ascii;
extern crate heapless;
#[macro_use]
extern crate log;
extern crate memmap2;

pub mod components;
pub mod config;
pub mod drivers;
pub mod error;
pub mod osd;
pub mod protocol;
pub mod sys;

pub use error::Error;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
