//! Content importers for external data sources.
//!
//! Calendar definitions are loaded from JSON documents on disk.

mod calendar_json;

pub use calendar_json::{CalendarImporter, ImportError};
