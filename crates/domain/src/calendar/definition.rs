//! Calendar definition value objects
//!
//! A `CalendarDefinition` is the declarative schema of a calendar: months,
//! weekdays, leap-year rule, intercalary days, time units, and optional
//! seasons and moons. It is pure data. Once validated it is never mutated;
//! variants produce new definitions (see `variant.rs`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::variant::CalendarVariant;
use crate::error::CalendarError;

/// Maximum length for calendar identifiers
const MAX_CALENDAR_ID_LENGTH: usize = 100;

// ============================================================================
// CalendarId
// ============================================================================

/// A validated calendar identifier (e.g., "gregorian", "harptos-shieldmeet")
///
/// Validation rules:
/// - Non-empty
/// - Maximum 100 characters
/// - Lowercase alphanumeric with underscores and hyphens only
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarId(String);

impl CalendarId {
    /// Create a new validated calendar identifier.
    ///
    /// The input is trimmed and lowercased before validation.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::InvalidId` if the identifier is empty, longer
    /// than 100 characters, or contains anything other than lowercase
    /// alphanumerics, `_` and `-`.
    pub fn new(id: impl Into<String>) -> Result<Self, CalendarError> {
        let id = id.into();
        let trimmed = id.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(CalendarError::invalid_id("Calendar ID cannot be empty"));
        }
        if trimmed.len() > MAX_CALENDAR_ID_LENGTH {
            return Err(CalendarError::invalid_id(format!(
                "Calendar ID cannot exceed {} characters",
                MAX_CALENDAR_ID_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(CalendarError::invalid_id(
                "Calendar ID must contain only lowercase alphanumeric characters, underscores and hyphens",
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CalendarId {
    type Error = CalendarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CalendarId> for String {
    fn from(id: CalendarId) -> String {
        id.0
    }
}

// ============================================================================
// Year numbering
// ============================================================================

/// Year numbering: which year second 0 falls in and how years are displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearConfig {
    /// Year at second 0 of the world clock
    #[serde(default)]
    pub epoch: i32,
    /// Weekday index of day 1 of the epoch year
    #[serde(default)]
    pub start_day: u32,
    /// Display prefix (e.g., "Year ")
    #[serde(default)]
    pub prefix: String,
    /// Display suffix (e.g., " DR")
    #[serde(default)]
    pub suffix: String,
}

// ============================================================================
// Months and weekdays
// ============================================================================

/// Configuration for a single month in a calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDefinition {
    /// Month name (e.g., "Hammer", "January")
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    /// Number of days in a common year
    pub days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MonthDefinition {
    /// Create a new month definition.
    pub fn new(name: impl Into<String>, days: u32) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
            days,
            description: None,
        }
    }

    /// Set the abbreviation.
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = Some(abbreviation.into());
        self
    }
}

/// A named day of the week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

impl WeekdayDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
        }
    }
}

// ============================================================================
// Leap years
// ============================================================================

/// Family of leap-year rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeapRule {
    /// No leap years
    #[default]
    None,
    /// Divisible by 4, not by 100 unless by 400
    Gregorian,
    /// Every `interval` years counting from `offset`
    Custom,
}

/// Leap-year rule paired with the month adjustment it applies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeapYearConfig {
    #[serde(default)]
    pub rule: LeapRule,
    /// Cycle length for `custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    /// Era offset subtracted from the year before the rule is evaluated
    #[serde(default)]
    pub offset: i32,
    /// Month whose length changes in leap years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// Signed day delta applied to `month` in leap years
    #[serde(default)]
    pub extra_days: i32,
}

impl LeapYearConfig {
    /// No leap years.
    pub fn none() -> Self {
        Self::default()
    }

    /// Gregorian rule adjusting `month` by `extra_days`.
    pub fn gregorian(month: impl Into<String>, extra_days: i32) -> Self {
        Self {
            rule: LeapRule::Gregorian,
            month: Some(month.into()),
            extra_days,
            ..Self::default()
        }
    }

    /// Every `interval` years from `offset`, with no month adjustment.
    pub fn custom(interval: u32, offset: i32) -> Self {
        Self {
            rule: LeapRule::Custom,
            interval: Some(interval),
            offset,
            ..Self::default()
        }
    }

    /// Set the month adjustment.
    pub fn adjusting(mut self, month: impl Into<String>, extra_days: i32) -> Self {
        self.month = Some(month.into());
        self.extra_days = extra_days;
        self
    }
}

// ============================================================================
// Intercalary days
// ============================================================================

/// A block of days outside the month grid (e.g., Midwinter, Shieldmeet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntercalaryDefinition {
    /// Day name (e.g., "Midwinter", "Shieldmeet")
    pub name: String,
    /// Name of the month this block immediately follows
    pub after: String,
    #[serde(default = "default_one")]
    pub days: u32,
    #[serde(default)]
    pub leap_year_only: bool,
    #[serde(default = "default_true")]
    pub counts_for_weekdays: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IntercalaryDefinition {
    /// A single day after `after` that counts for weekdays every year.
    pub fn new(name: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            after: after.into(),
            days: 1,
            leap_year_only: false,
            counts_for_weekdays: true,
            description: None,
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn leap_year_only(mut self) -> Self {
        self.leap_year_only = true;
        self
    }

    pub fn outside_week(mut self) -> Self {
        self.counts_for_weekdays = false;
        self
    }
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Time units
// ============================================================================

/// Length of the day and its subdivisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeConfig {
    pub hours_in_day: u32,
    pub minutes_in_hour: u32,
    pub seconds_in_minute: u32,
}

impl TimeConfig {
    pub fn new(hours_in_day: u32, minutes_in_hour: u32, seconds_in_minute: u32) -> Self {
        Self {
            hours_in_day,
            minutes_in_hour,
            seconds_in_minute,
        }
    }

    pub fn seconds_per_minute(&self) -> i64 {
        self.seconds_in_minute as i64
    }

    pub fn seconds_per_hour(&self) -> i64 {
        (self.minutes_in_hour as i64).saturating_mul(self.seconds_per_minute())
    }

    /// Saturates at `i64::MAX`; validated calendars stay within
    /// [`MAX_SECONDS_PER_DAY`].
    pub fn seconds_per_day(&self) -> i64 {
        (self.hours_in_day as i64).saturating_mul(self.seconds_per_hour())
    }
}

/// Longest day a calendar may define, in seconds
pub const MAX_SECONDS_PER_DAY: i64 = 1_000_000_000;

/// Longest year a calendar may define, in days (leap years included)
pub const MAX_YEAR_DAYS: u64 = 100_000_000;

impl Default for TimeConfig {
    fn default() -> Self {
        Self::new(24, 60, 60)
    }
}

// ============================================================================
// Seasons and moons
// ============================================================================

/// A season starting on a given month/day and running until the next one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDefinition {
    pub name: String,
    /// 1-based month the season starts in
    pub start_month: u32,
    #[serde(default = "default_one")]
    pub start_day: u32,
    /// Sunrise in decimal hours (6.5 = half past six)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<f64>,
    /// Sunset in decimal hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SeasonDefinition {
    pub fn new(name: impl Into<String>, start_month: u32, start_day: u32) -> Self {
        Self {
            name: name.into(),
            start_month,
            start_day,
            sunrise: None,
            sunset: None,
            description: None,
        }
    }

    pub fn with_sun(mut self, sunrise: f64, sunset: f64) -> Self {
        self.sunrise = Some(sunrise);
        self.sunset = Some(sunset);
        self
    }
}

/// A calendar date used as the reference new moon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoonReference {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// One named slice of a lunar cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonPhaseDefinition {
    pub name: String,
    /// Length in days
    pub length: f64,
    #[serde(default)]
    pub single_day: bool,
}

impl MoonPhaseDefinition {
    pub fn new(name: impl Into<String>, length: f64) -> Self {
        Self {
            name: name.into(),
            length,
            single_day: length <= 1.0,
        }
    }
}

/// A lunar cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonDefinition {
    pub name: String,
    /// Days per full cycle
    pub cycle_length: f64,
    pub first_new_moon: MoonReference,
    #[serde(default)]
    pub phases: Vec<MoonPhaseDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ============================================================================
// CalendarDefinition
// ============================================================================

/// Full calendar schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDefinition {
    pub(super) id: CalendarId,
    pub(super) name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) description: Option<String>,
    #[serde(default)]
    pub(super) year: YearConfig,
    #[serde(default)]
    pub(super) leap_year: LeapYearConfig,
    pub(super) months: Vec<MonthDefinition>,
    pub(super) weekdays: Vec<WeekdayDefinition>,
    #[serde(default)]
    pub(super) intercalary: Vec<IntercalaryDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) time: Option<TimeConfig>,
    #[serde(default)]
    pub(super) seasons: Vec<SeasonDefinition>,
    #[serde(default)]
    pub(super) moons: Vec<MoonDefinition>,
    #[serde(default)]
    pub(super) date_formats: BTreeMap<String, String>,
    #[serde(default)]
    pub(super) variants: BTreeMap<String, CalendarVariant>,
}

impl CalendarDefinition {
    /// Start building a definition.
    pub fn builder(id: CalendarId, name: impl Into<String>) -> CalendarDefinitionBuilder {
        CalendarDefinitionBuilder::new(id, name)
    }

    pub fn id(&self) -> &CalendarId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn year(&self) -> &YearConfig {
        &self.year
    }

    pub fn leap_year(&self) -> &LeapYearConfig {
        &self.leap_year
    }

    pub fn months(&self) -> &[MonthDefinition] {
        &self.months
    }

    pub fn weekdays(&self) -> &[WeekdayDefinition] {
        &self.weekdays
    }

    pub fn intercalary(&self) -> &[IntercalaryDefinition] {
        &self.intercalary
    }

    /// Explicit time configuration, if the calendar declares one.
    pub fn time(&self) -> Option<&TimeConfig> {
        self.time.as_ref()
    }

    /// Time configuration with the 24/60/60 default applied.
    pub fn time_config(&self) -> TimeConfig {
        self.time.unwrap_or_default()
    }

    pub fn seasons(&self) -> &[SeasonDefinition] {
        &self.seasons
    }

    pub fn moons(&self) -> &[MoonDefinition] {
        &self.moons
    }

    pub fn date_formats(&self) -> &BTreeMap<String, String> {
        &self.date_formats
    }

    pub fn variants(&self) -> &BTreeMap<String, CalendarVariant> {
        &self.variants
    }

    /// 1-based index of the month called `name`.
    pub fn month_index(&self, name: &str) -> Option<u32> {
        self.months
            .iter()
            .position(|m| m.name == name)
            .map(|idx| idx as u32 + 1)
    }

    /// Look up an intercalary entry by name.
    pub fn intercalary_named(&self, name: &str) -> Option<&IntercalaryDefinition> {
        self.intercalary.iter().find(|entry| entry.name == name)
    }

    /// Checks every structural invariant the conversion engine relies on.
    ///
    /// Dangling month references (intercalary `after`, leap-adjustment
    /// `month`) are not errors; those entries are simply inert.
    pub fn validate(&self) -> Result<(), CalendarError> {
        let fail = |reason: String| Err(CalendarError::validation(&self.id, reason));

        if self.months.is_empty() {
            return fail("at least one month is required".to_string());
        }
        if let Some(month) = self.months.iter().find(|m| m.days == 0) {
            return fail(format!("month '{}' must have at least one day", month.name));
        }
        if self.weekdays.is_empty() {
            return fail("at least one weekday is required".to_string());
        }
        if self.year.start_day as usize >= self.weekdays.len() {
            return fail(format!(
                "start day {} is outside the {}-day week",
                self.year.start_day,
                self.weekdays.len()
            ));
        }

        let time = self.time_config();
        if time.hours_in_day == 0 || time.minutes_in_hour == 0 || time.seconds_in_minute == 0 {
            return fail("hours, minutes and seconds must all be positive".to_string());
        }
        if time.seconds_per_day() > MAX_SECONDS_PER_DAY {
            return fail(format!(
                "a day of {}x{}x{} seconds exceeds {} seconds",
                time.hours_in_day, time.minutes_in_hour, time.seconds_in_minute, MAX_SECONDS_PER_DAY
            ));
        }

        if self.leap_year.rule == LeapRule::Custom && self.leap_year.interval.unwrap_or(0) == 0 {
            return fail("custom leap rule needs a positive interval".to_string());
        }

        if let Some(entry) = self.intercalary.iter().find(|e| e.days == 0) {
            return fail(format!(
                "intercalary period '{}' must have at least one day",
                entry.name
            ));
        }
        if let Some(entry) = self
            .intercalary
            .iter()
            .enumerate()
            .find(|(idx, e)| self.intercalary[..*idx].iter().any(|earlier| earlier.name == e.name))
            .map(|(_, e)| e)
        {
            return fail(format!(
                "intercalary period '{}' is defined more than once",
                entry.name
            ));
        }

        let longest = self
            .days_in_year_kind(false, false)
            .max(self.days_in_year_kind(true, false));
        if longest > MAX_YEAR_DAYS {
            return fail(format!(
                "a year of {} days exceeds {} days",
                longest, MAX_YEAR_DAYS
            ));
        }

        for moon in &self.moons {
            if !moon.cycle_length.is_finite() || moon.cycle_length <= 0.0 {
                return fail(format!("moon '{}' needs a positive cycle length", moon.name));
            }
            if let Some(phase) = moon
                .phases
                .iter()
                .find(|p| !p.length.is_finite() || p.length <= 0.0)
            {
                return fail(format!(
                    "phase '{}' of moon '{}' needs a positive length",
                    phase.name, moon.name
                ));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder producing a validated [`CalendarDefinition`]
#[derive(Debug, Clone)]
pub struct CalendarDefinitionBuilder {
    def: CalendarDefinition,
}

impl CalendarDefinitionBuilder {
    pub fn new(id: CalendarId, name: impl Into<String>) -> Self {
        Self {
            def: CalendarDefinition {
                id,
                name: name.into(),
                description: None,
                year: YearConfig::default(),
                leap_year: LeapYearConfig::none(),
                months: Vec::new(),
                weekdays: Vec::new(),
                intercalary: Vec::new(),
                time: None,
                seasons: Vec::new(),
                moons: Vec::new(),
                date_formats: BTreeMap::new(),
                variants: BTreeMap::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.def.description = Some(description.into());
        self
    }

    pub fn epoch(mut self, year: i32) -> Self {
        self.def.year.epoch = year;
        self
    }

    pub fn start_day(mut self, weekday_index: u32) -> Self {
        self.def.year.start_day = weekday_index;
        self
    }

    pub fn year_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.def.year.suffix = suffix.into();
        self
    }

    pub fn year_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.def.year.prefix = prefix.into();
        self
    }

    pub fn month(mut self, name: impl Into<String>, days: u32) -> Self {
        self.def.months.push(MonthDefinition::new(name, days));
        self
    }

    pub fn month_definition(mut self, month: MonthDefinition) -> Self {
        self.def.months.push(month);
        self
    }

    pub fn weekday(mut self, name: impl Into<String>) -> Self {
        self.def.weekdays.push(WeekdayDefinition::new(name));
        self
    }

    pub fn weekdays<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def
            .weekdays
            .extend(names.into_iter().map(WeekdayDefinition::new));
        self
    }

    pub fn leap_year(mut self, leap_year: LeapYearConfig) -> Self {
        self.def.leap_year = leap_year;
        self
    }

    pub fn intercalary(mut self, entry: IntercalaryDefinition) -> Self {
        self.def.intercalary.push(entry);
        self
    }

    pub fn time(mut self, time: TimeConfig) -> Self {
        self.def.time = Some(time);
        self
    }

    pub fn season(mut self, season: SeasonDefinition) -> Self {
        self.def.seasons.push(season);
        self
    }

    pub fn moon(mut self, moon: MoonDefinition) -> Self {
        self.def.moons.push(moon);
        self
    }

    pub fn date_format(mut self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.def.date_formats.insert(key.into(), pattern.into());
        self
    }

    pub fn variant(mut self, key: impl Into<String>, variant: CalendarVariant) -> Self {
        self.def.variants.insert(key.into(), variant);
        self
    }

    /// Validate and return the definition.
    pub fn build(self) -> Result<CalendarDefinition, CalendarError> {
        self.def.validate()?;
        Ok(self.def)
    }
}

// ============================================================================
// Tests
// ============================================================================
