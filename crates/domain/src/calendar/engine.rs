//! Calendar conversion engine
//!
//! Converts between the world clock (signed seconds since the start of the
//! epoch year) and `CalendarDate`s for one immutable definition. All date
//! arithmetic goes through the two conversions so that every result is a
//! date the inverse conversion maps back to the same instant.
//!
//! A year's length depends only on whether it is a leap year, so the engine
//! measures one common and one leap year at construction. Year spans are then
//! closed-form: span times the common length plus the leap count times the
//! leap difference. Locating the year of a day is a binary search over that
//! formula, so no conversion walks years one at a time.

use chrono::{DateTime, Datelike, Utc};

use super::date::{CalendarDate, ClockTime};
use super::definition::{CalendarDefinition, CalendarId, TimeConfig};
use crate::error::CalendarError;

/// Reference point that overrides which year second 0 falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochAnchor {
    /// Second 0 falls in this calendar year
    Year(i32),
    /// Second 0 falls in the UTC Gregorian year of this Unix timestamp
    UnixTimestamp(i64),
}

impl EpochAnchor {
    /// The anchored year; `fallback` when the timestamp is out of range.
    pub fn resolve(&self, fallback: i32) -> i32 {
        match *self {
            EpochAnchor::Year(year) => year,
            EpochAnchor::UnixTimestamp(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
                .map(|dt| dt.year())
                .unwrap_or(fallback),
        }
    }
}

/// Which days an ordinal count includes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayCount {
    All,
    Weekdays,
}

/// Conversion engine bound to one validated calendar definition
#[derive(Debug, Clone)]
pub struct CalendarEngine {
    definition: CalendarDefinition,
    time: TimeConfig,
    common_days: i64,
    leap_days: i64,
    common_weekday_days: i64,
    leap_weekday_days: i64,
}

impl CalendarEngine {
    /// Validate `definition` and build an engine for it.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::Validation` when the definition breaks a
    /// structural invariant; nothing is partially constructed.
    pub fn new(definition: CalendarDefinition) -> Result<Self, CalendarError> {
        definition.validate()?;

        let time = definition.time_config();
        // Bounded by validation, so these fit comfortably in i64
        let common_days = definition.days_in_year_kind(false, false) as i64;
        let leap_days = definition.days_in_year_kind(true, false) as i64;
        let common_weekday_days = definition.days_in_year_kind(false, true) as i64;
        let leap_weekday_days = definition.days_in_year_kind(true, true) as i64;

        tracing::debug!(
            calendar = %definition.id(),
            common_days,
            leap_days,
            "Constructed calendar engine"
        );

        Ok(Self {
            definition,
            time,
            common_days,
            leap_days,
            common_weekday_days,
            leap_weekday_days,
        })
    }

    pub fn id(&self) -> &CalendarId {
        self.definition.id()
    }

    pub fn definition(&self) -> &CalendarDefinition {
        &self.definition
    }

    pub fn time_config(&self) -> TimeConfig {
        self.time
    }

    pub fn seconds_per_day(&self) -> i64 {
        self.time.seconds_per_day()
    }

    fn epoch(&self) -> i64 {
        self.definition.year().epoch as i64
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// World-clock seconds for `date`.
    ///
    /// Never fails. Months outside the calendar are clamped; an intercalary
    /// name that is not active after `date.month` that year is logged and the
    /// date is read as the ordinary day with the same number.
    pub fn date_to_clock(&self, date: &CalendarDate) -> i64 {
        self.date_to_clock_from(date, self.epoch())
    }

    /// [`date_to_clock`](Self::date_to_clock) with year zero rebased to `anchor`.
    pub fn date_to_clock_anchored(&self, date: &CalendarDate, anchor: EpochAnchor) -> i64 {
        let epoch = anchor.resolve(self.definition.year().epoch) as i64;
        self.date_to_clock_from(date, epoch)
    }

    /// Date and time for world-clock `seconds`; negative values precede the epoch.
    pub fn clock_to_date(&self, seconds: i64) -> CalendarDate {
        self.clock_to_date_from(seconds, self.epoch())
    }

    /// [`clock_to_date`](Self::clock_to_date) with year zero rebased to `anchor`.
    pub fn clock_to_date_anchored(&self, seconds: i64, anchor: EpochAnchor) -> CalendarDate {
        let epoch = anchor.resolve(self.definition.year().epoch) as i64;
        self.clock_to_date_from(seconds, epoch)
    }

    /// Saturates at the ends of the `i64` range for dates the clock cannot
    /// represent.
    fn date_to_clock_from(&self, date: &CalendarDate, epoch: i64) -> i64 {
        let days = self.days_before_year(date.year as i64, epoch, DayCount::All)
            + self.ordinal(date, DayCount::All);
        let time = &date.time;
        days.saturating_mul(self.time.seconds_per_day())
            .saturating_add(time.hour as i64 * self.time.seconds_per_hour())
            .saturating_add(time.minute as i64 * self.time.seconds_per_minute())
            .saturating_add(time.second as i64)
    }

    fn clock_to_date_from(&self, seconds: i64, epoch: i64) -> CalendarDate {
        let seconds_per_day = self.time.seconds_per_day();
        let total_days = seconds.div_euclid(seconds_per_day);
        let second_of_day = seconds.rem_euclid(seconds_per_day);

        let year = self.year_containing(total_days, epoch);
        let remaining = (total_days - self.days_before_year(year, epoch, DayCount::All)).max(0);

        let mut date = self.locate_in_year(clamp_year(year), remaining);
        date.time = self.split_time(second_of_day);
        date.weekday = self.weekday_of(&date);
        date
    }

    /// Signed day count from the start of `epoch` to the start of `year`.
    fn days_before_year(&self, year: i64, epoch: i64, count: DayCount) -> i64 {
        let (common, leap) = match count {
            DayCount::All => (self.common_days, self.leap_days),
            DayCount::Weekdays => (self.common_weekday_days, self.leap_weekday_days),
        };
        let leap_years = self.definition.leap_years_between(epoch, year);
        (year - epoch) * common + leap_years * (leap - common)
    }

    /// Latest year (within `i32`) whose first day is at or before `day`.
    ///
    /// Every year has at least one day, so year starts strictly increase and
    /// a binary search over the closed-form span finds the year.
    fn year_containing(&self, day: i64, epoch: i64) -> i64 {
        let (mut lo, mut hi) = (i32::MIN as i64, i32::MAX as i64);
        if self.days_before_year(lo, epoch, DayCount::All) > day {
            return lo;
        }
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if self.days_before_year(mid, epoch, DayCount::All) <= day {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    /// 0-based position of `date` within its year.
    fn ordinal(&self, date: &CalendarDate, count: DayCount) -> i64 {
        let def = &self.definition;
        let lengths = def.month_lengths(date.year);
        let month = date.month.clamp(1, lengths.len() as u32);
        let counts = |counts_for_weekdays: bool| count == DayCount::All || counts_for_weekdays;

        let mut days = 0i64;
        for earlier in 1..month {
            days += lengths[earlier as usize - 1] as i64;
            days += def
                .intercalary_days_after(date.year, earlier)
                .iter()
                .filter(|entry| counts(entry.counts_for_weekdays))
                .map(|entry| entry.days as i64)
                .sum::<i64>();
        }

        if let Some(name) = &date.intercalary {
            let slot = def.intercalary_days_after(date.year, month);
            match slot.iter().position(|entry| &entry.name == name) {
                Some(pos) => {
                    days += lengths[month as usize - 1] as i64;
                    days += slot[..pos]
                        .iter()
                        .filter(|entry| counts(entry.counts_for_weekdays))
                        .map(|entry| entry.days as i64)
                        .sum::<i64>();
                    if counts(slot[pos].counts_for_weekdays) {
                        days += date.day as i64 - 1;
                    }
                    return days;
                }
                None => {
                    tracing::warn!(
                        calendar = %def.id(),
                        year = date.year,
                        month,
                        intercalary = %name,
                        "Intercalary period not active after this month; reading as an ordinary day"
                    );
                }
            }
        }

        days + date.day as i64 - 1
    }

    /// Resolve a 0-based day of `year` into month/day/intercalary.
    fn locate_in_year(&self, year: i32, mut remaining: i64) -> CalendarDate {
        let def = &self.definition;
        let lengths = def.month_lengths(year);

        for (idx, &length) in lengths.iter().enumerate() {
            let month = idx as u32 + 1;
            if remaining < length as i64 {
                return CalendarDate::new(year, month, remaining as u32 + 1);
            }
            remaining -= length as i64;

            for entry in def.intercalary_days_after(year, month) {
                if remaining < entry.days as i64 {
                    return CalendarDate::intercalary(
                        year,
                        month,
                        entry.name.clone(),
                        remaining as u32 + 1,
                    );
                }
                remaining -= entry.days as i64;
            }
        }

        // Unreachable while `remaining` is below the year length
        let last = lengths.len() as u32;
        CalendarDate::new(year, last, lengths.last().copied().unwrap_or(1))
    }

    fn split_time(&self, second_of_day: i64) -> ClockTime {
        let per_hour = self.time.seconds_per_hour();
        let per_minute = self.time.seconds_per_minute();
        ClockTime::new(
            (second_of_day / per_hour) as u32,
            (second_of_day % per_hour / per_minute) as u32,
            (second_of_day % per_minute) as u32,
        )
    }

    /// 0-based day of the year, intercalary days included.
    pub fn day_of_year(&self, date: &CalendarDate) -> i64 {
        self.ordinal(date, DayCount::All)
    }

    /// Absolute day number of `date` counted from the start of the epoch year.
    pub fn day_index(&self, date: &CalendarDate) -> i64 {
        self.days_before_year(date.year as i64, self.epoch(), DayCount::All)
            + self.ordinal(date, DayCount::All)
    }

    // ------------------------------------------------------------------
    // Weekdays
    // ------------------------------------------------------------------

    /// Weekday index of an ordinary date.
    pub fn calculate_weekday(&self, year: i32, month: u32, day: u32) -> u32 {
        self.weekday_of(&CalendarDate::new(year, month, day))
    }

    /// Weekday index of any date: the epoch's start day advanced by every
    /// weekday-counting day before it.
    ///
    /// An intercalary day outside the week shares the weekday of the next
    /// ordinary day.
    pub fn weekday_of(&self, date: &CalendarDate) -> u32 {
        let counted = self.days_before_year(date.year as i64, self.epoch(), DayCount::Weekdays)
            + self.ordinal(date, DayCount::Weekdays);
        let week = self.definition.weekdays().len() as i64;
        (self.definition.year().start_day as i64 + counted).rem_euclid(week) as u32
    }

    // ------------------------------------------------------------------
    // Construction and validation
    // ------------------------------------------------------------------

    /// Validated ordinary date at midnight.
    pub fn date(&self, year: i32, month: u32, day: u32) -> Result<CalendarDate, CalendarError> {
        let mut date = CalendarDate::new(year, month, day);
        self.validate_date(&date)?;
        date.weekday = self.weekday_of(&date);
        Ok(date)
    }

    /// Validated day `day` of the intercalary period called `name`.
    pub fn intercalary_date(
        &self,
        year: i32,
        name: &str,
        day: u32,
    ) -> Result<CalendarDate, CalendarError> {
        let def = &self.definition;
        let month = def
            .intercalary_named(name)
            .and_then(|entry| def.month_index(&entry.after))
            .ok_or_else(|| {
                CalendarError::invalid_date(format!(
                    "'{}' is not an intercalary period of {}",
                    name,
                    def.id()
                ))
            })?;

        let mut date = CalendarDate::intercalary(year, month, name, day);
        self.validate_date(&date)?;
        date.weekday = self.weekday_of(&date);
        Ok(date)
    }

    /// Check that `date` exists in this calendar.
    pub fn validate_date(&self, date: &CalendarDate) -> Result<(), CalendarError> {
        let def = &self.definition;
        let months = def.months().len() as u32;
        if date.month == 0 || date.month > months {
            return Err(CalendarError::invalid_date(format!(
                "month {} is outside 1..={}",
                date.month, months
            )));
        }

        let max_day = match &date.intercalary {
            Some(name) => def
                .intercalary_days_after(date.year, date.month)
                .into_iter()
                .find(|entry| &entry.name == name)
                .map(|entry| entry.days)
                .ok_or_else(|| {
                    CalendarError::invalid_date(format!(
                        "'{}' does not follow month {} in year {}",
                        name, date.month, date.year
                    ))
                })?,
            None => def.month_length(date.year, date.month).unwrap_or(0),
        };
        if date.day == 0 || date.day > max_day {
            return Err(CalendarError::invalid_date(format!(
                "day {} is outside 1..={} for month {} of year {}",
                date.day, max_day, date.month, date.year
            )));
        }

        let time = &date.time;
        if time.hour >= self.time.hours_in_day
            || time.minute >= self.time.minutes_in_hour
            || time.second >= self.time.seconds_in_minute
        {
            return Err(CalendarError::invalid_date(format!(
                "time {} is outside a {}-hour day",
                time, self.time.hours_in_day
            )));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    /// Move `days` days, keeping the time of day.
    pub fn add_days(&self, date: &CalendarDate, days: i64) -> CalendarDate {
        self.clock_to_date(self.date_to_clock(date) + days * self.time.seconds_per_day())
    }

    /// Move whole weeks of this calendar's week length.
    pub fn add_weeks(&self, date: &CalendarDate, weeks: i64) -> CalendarDate {
        let week = self.definition.weekdays().len() as i64;
        self.add_days(date, weeks * week)
    }

    /// Move `months` months, clamping the day to the target month's length.
    ///
    /// Always lands on an ordinary day; an intercalary start counts as the
    /// last day of the month it follows.
    pub fn add_months(&self, date: &CalendarDate, months: i64) -> CalendarDate {
        let per_year = self.definition.months().len() as i64;
        let month = date.month.clamp(1, per_year as u32) as i64;
        let index = date.year as i64 * per_year + (month - 1) + months;
        let year = clamp_year(index.div_euclid(per_year));
        let month = index.rem_euclid(per_year) as u32 + 1;
        self.landing(year, month, self.source_day(date), date.time)
    }

    /// Move `years` years.
    ///
    /// An intercalary date stays on the same period when it exists in the
    /// target year and otherwise falls back to the last day of its month.
    pub fn add_years(&self, date: &CalendarDate, years: i64) -> CalendarDate {
        let year = clamp_year(date.year as i64 + years);
        let def = &self.definition;

        if let Some(name) = &date.intercalary {
            let kept = def
                .intercalary_days_after(year, date.month)
                .into_iter()
                .find(|entry| &entry.name == name);
            if let Some(entry) = kept {
                let target = CalendarDate::intercalary(
                    year,
                    date.month,
                    name.clone(),
                    date.day.clamp(1, entry.days),
                )
                .with_time(date.time);
                return self.clock_to_date(self.date_to_clock(&target));
            }
        }

        self.landing(year, date.month, self.source_day(date), date.time)
    }

    fn source_day(&self, date: &CalendarDate) -> u32 {
        match date.intercalary {
            Some(_) => self
                .definition
                .month_length(date.year, date.month)
                .unwrap_or(date.day),
            None => date.day,
        }
    }

    fn landing(&self, year: i32, month: u32, day: u32, time: ClockTime) -> CalendarDate {
        let max_day = self.definition.month_length(year, month).unwrap_or(1);
        let target = CalendarDate::new(year, month, day.clamp(1, max_day)).with_time(time);
        self.clock_to_date(self.date_to_clock(&target))
    }
}

fn clamp_year(year: i64) -> i32 {
    year.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
