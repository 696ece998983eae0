//! Resolved calendar dates
//!
//! `CalendarDate` is a snapshot produced by the conversion engine. It carries
//! indices only; names and display strings are looked up in the definition
//! that produced it.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::definition::CalendarDefinition;

/// Time of day in the calendar's own units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    pub fn midnight() -> Self {
        Self::default()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// A resolved date plus time of day
///
/// For an intercalary date, `month` is the month the period follows and `day`
/// is the 1-based position inside the period.
///
/// Equality and hashing consider year, month, day and intercalary name only;
/// weekday is derived and time of day is a separate axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub weekday: u32,
    #[serde(default)]
    pub time: ClockTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercalary: Option<String>,
}

impl PartialEq for CalendarDate {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year
            && self.month == other.month
            && self.day == other.day
            && self.intercalary == other.intercalary
    }
}

impl Eq for CalendarDate {}

impl Hash for CalendarDate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.year.hash(state);
        self.month.hash(state);
        self.day.hash(state);
        self.intercalary.hash(state);
    }
}

impl CalendarDate {
    /// An ordinary date; weekday is left at 0 until the engine resolves it.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            weekday: 0,
            time: ClockTime::midnight(),
            intercalary: None,
        }
    }

    /// Day `day` of the intercalary period `name` following `month`.
    pub fn intercalary(year: i32, month: u32, name: impl Into<String>, day: u32) -> Self {
        Self {
            intercalary: Some(name.into()),
            ..Self::new(year, month, day)
        }
    }

    pub fn with_time(mut self, time: ClockTime) -> Self {
        self.time = time;
        self
    }

    pub fn is_intercalary(&self) -> bool {
        self.intercalary.is_some()
    }

    /// Whether this day advances the weekday.
    ///
    /// Ordinary days always do. An intercalary name the definition does not
    /// know (renamed or stale data) is treated as counting.
    pub fn counts_for_weekdays(&self, calendar: &CalendarDefinition) -> bool {
        match &self.intercalary {
            None => true,
            Some(name) => calendar
                .intercalary_named(name)
                .map_or(true, |entry| entry.counts_for_weekdays),
        }
    }

    pub fn month_name<'a>(&self, calendar: &'a CalendarDefinition) -> Option<&'a str> {
        let idx = (self.month as usize).checked_sub(1)?;
        calendar.months().get(idx).map(|m| m.name.as_str())
    }

    pub fn weekday_name<'a>(&self, calendar: &'a CalendarDefinition) -> Option<&'a str> {
        calendar
            .weekdays()
            .get(self.weekday as usize)
            .map(|w| w.name.as_str())
    }

    /// Year with the calendar's prefix and suffix (e.g., "1492 DR").
    pub fn display_year(&self, calendar: &CalendarDefinition) -> String {
        let year = calendar.year();
        format!("{}{}{}", year.prefix, self.year, year.suffix)
    }

    /// Display the full date (e.g., "15th of Mirtul, 1492 DR").
    pub fn display_full(&self, calendar: &CalendarDefinition) -> String {
        let year = self.display_year(calendar);
        match &self.intercalary {
            Some(name) if self.day > 1 => format!("{} (day {}), {}", name, self.day, year),
            Some(name) => format!("{}, {}", name, year),
            None => format!(
                "{}{} of {}, {}",
                self.day,
                ordinal_suffix(self.day),
                self.month_name(calendar).unwrap_or("Unknown"),
                year
            ),
        }
    }

    /// Display the short date (e.g., "Mirtul 15, 1492").
    ///
    /// Ordinary dates use the calendar's `"short"` pattern when it has one.
    pub fn display_short(&self, calendar: &CalendarDefinition) -> String {
        match &self.intercalary {
            Some(name) => format!("{}, {}", name, self.year),
            None => match self.format(calendar, "short") {
                Some(formatted) => formatted,
                None => format!(
                    "{} {}, {}",
                    self.month_name(calendar).unwrap_or("Unknown"),
                    self.day,
                    self.year
                ),
            },
        }
    }

    /// Render the calendar's date format called `key`, if it defines one.
    pub fn format(&self, calendar: &CalendarDefinition, key: &str) -> Option<String> {
        calendar
            .date_formats()
            .get(key)
            .map(|pattern| self.format_pattern(calendar, pattern))
    }

    /// Substitute `{year}`, `{month}` (name), `{month:02}`, `{day}`,
    /// `{day:02}`, `{ordinal}` ("15th") and `{weekday}` in `pattern`.
    ///
    /// Unknown placeholders and names the calendar cannot resolve are left
    /// as written.
    pub fn format_pattern(&self, calendar: &CalendarDefinition, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                rest = tail;
                break;
            };
            match self.placeholder(calendar, &tail[1..close]) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }
        out.push_str(rest);
        out
    }

    fn placeholder(&self, calendar: &CalendarDefinition, token: &str) -> Option<String> {
        let value = match token {
            "year" => self.year.to_string(),
            "month" => self.month_name(calendar)?.to_string(),
            "month:02" => format!("{:02}", self.month),
            "day" => self.day.to_string(),
            "day:02" => format!("{:02}", self.day),
            "ordinal" => format!("{}{}", self.day, ordinal_suffix(self.day)),
            "weekday" => self.weekday_name(calendar)?.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Display the time (e.g., "09:30:00").
    pub fn display_time(&self) -> String {
        self.time.to_string()
    }
}

/// Returns the ordinal suffix for a day number (st, nd, rd, th).
fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
