pub mod display;
pub mod service;
