pub mod displayport;
pub mod msp;
pub mod telemetry;
