pub mod injected;
pub mod memory;
