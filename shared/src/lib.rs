pub mod sanitize;
pub mod telemetry;
pub mod types;
