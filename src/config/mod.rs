//! Application configuration.
//!
//! - `layout`: Display dimensions and the fixed screen-coordinate table
//! - `settings`: Network, broker, time-sync, and cadence settings

pub mod layout;
pub mod settings;

pub use settings::Config;
