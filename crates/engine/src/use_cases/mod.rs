//! Use cases - host-facing orchestration over the calendar core.

pub mod calendar;
