pub mod models;
pub mod ports;
pub mod profile;
pub mod validate;
