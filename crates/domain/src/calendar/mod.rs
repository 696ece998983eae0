//! Calendar definitions and the conversion engine
//!
//! - `definition`: the declarative calendar schema and its validation
//! - `resolver`: leap years, month lengths and intercalary placement per year
//! - `engine`: world clock <-> `CalendarDate` conversion and date arithmetic
//! - `astronomy`: seasons, sunrise/sunset and moon phases
//! - `variant`: derived calendars built from override sets

mod astronomy;
mod builtin;
mod date;
mod definition;
mod engine;
mod resolver;
mod variant;

pub use astronomy::{decimal_hours_to_time, MoonPhaseInfo, SunTimes};
pub use date::{CalendarDate, ClockTime};
pub use definition::{
    CalendarDefinition, CalendarDefinitionBuilder, CalendarId, IntercalaryDefinition, LeapRule,
    LeapYearConfig, MonthDefinition, MoonDefinition, MoonPhaseDefinition, MoonReference,
    SeasonDefinition, TimeConfig, WeekdayDefinition, YearConfig, MAX_SECONDS_PER_DAY,
    MAX_YEAR_DAYS,
};
pub use engine::{CalendarEngine, EpochAnchor};
pub use variant::{CalendarVariant, VariantOverride};
