//! Calendar registry use cases.
//!
//! Keeps one engine per loaded calendar and hands out the active one.

mod calendar_service;

pub use calendar_service::{CalendarService, CalendarServiceError};
