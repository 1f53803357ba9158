#[macro_use]
extern crate log;

pub mod fbdev;
pub mod input;
pub mod lifecycle;
pub mod net;
pub mod service;
