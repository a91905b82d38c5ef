pub mod config;
pub mod error;
pub mod mastery;
pub mod telemetry;
