pub mod button;
pub mod session;
