//! Almanac domain: calendar schemas and the date conversion engine.
//!
//! Everything here is synchronous and free of I/O. A host keeps one
//! elapsed-seconds world clock and asks a [`CalendarEngine`] what date it is.

pub mod calendar;
pub mod error;

pub use calendar::{
    decimal_hours_to_time, CalendarDate, CalendarDefinition, CalendarDefinitionBuilder,
    CalendarEngine, CalendarId, CalendarVariant, ClockTime, EpochAnchor, IntercalaryDefinition,
    LeapRule, LeapYearConfig, MonthDefinition, MoonDefinition, MoonPhaseDefinition,
    MoonPhaseInfo, MoonReference, SeasonDefinition, SunTimes, TimeConfig, VariantOverride,
    WeekdayDefinition, YearConfig, MAX_SECONDS_PER_DAY, MAX_YEAR_DAYS,
};
pub use error::CalendarError;
