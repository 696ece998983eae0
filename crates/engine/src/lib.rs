//! Almanac Engine library.
//!
//! Host-facing runtime around the calendar core.
//!
//! ## Structure
//!
//! - `config` - Environment configuration
//! - `infrastructure/` - Calendar document importer
//! - `use_cases/` - Calendar registry and activation

pub mod config;
pub mod infrastructure;
pub mod use_cases;

pub use config::EngineConfig;
pub use use_cases::calendar::{CalendarService, CalendarServiceError};
