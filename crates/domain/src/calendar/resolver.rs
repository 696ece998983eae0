//! Leap-year and intercalary resolution
//!
//! Pure functions of a definition and a year: which years are leap years,
//! how long each month is in a given year, and which intercalary periods are
//! active. Misconfigured references resolve to "nothing" instead of failing.

use super::definition::{CalendarDefinition, IntercalaryDefinition, LeapRule};

impl CalendarDefinition {
    /// Whether `year` is a leap year under this calendar's rule.
    pub fn is_leap_year(&self, year: i32) -> bool {
        let leap = &self.leap_year;
        let year = year as i64 - leap.offset as i64;
        match leap.rule {
            LeapRule::None => false,
            LeapRule::Gregorian => {
                year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
            }
            LeapRule::Custom => match leap.interval {
                Some(interval) if interval > 0 => year.rem_euclid(interval as i64) == 0,
                _ => false,
            },
        }
    }

    /// Leap years in `start..end`; negative when `end` precedes `start`.
    ///
    /// Closed form over the rule's divisibility tests, so the cost does not
    /// depend on the span or the interval.
    pub fn leap_years_between(&self, start: i64, end: i64) -> i64 {
        let offset = self.leap_year.offset as i64;
        self.leap_years_before(end - offset) - self.leap_years_before(start - offset)
    }

    /// Leap years below `year` (relative to the rule's offset), counted from
    /// an arbitrary fixed origin.
    fn leap_years_before(&self, year: i64) -> i64 {
        let last = year - 1;
        match self.leap_year.rule {
            LeapRule::None => 0,
            LeapRule::Gregorian => {
                last.div_euclid(4) - last.div_euclid(100) + last.div_euclid(400)
            }
            LeapRule::Custom => match self.leap_year.interval {
                Some(interval) if interval > 0 => last.div_euclid(interval as i64),
                _ => 0,
            },
        }
    }

    /// Month lengths for `year`, in month order.
    ///
    /// In leap years the adjustment month gains `extra_days` (which may be
    /// negative) and is clamped to at least one day.
    pub fn month_lengths(&self, year: i32) -> Vec<u32> {
        self.month_lengths_for(self.is_leap_year(year))
    }

    fn month_lengths_for(&self, leap: bool) -> Vec<u32> {
        let mut lengths: Vec<u32> = self.months.iter().map(|m| m.days).collect();

        if leap {
            let target = self
                .leap_year
                .month
                .as_deref()
                .and_then(|name| self.months.iter().position(|m| m.name == name));
            if let Some(idx) = target {
                let adjusted = lengths[idx] as i64 + self.leap_year.extra_days as i64;
                lengths[idx] = adjusted.clamp(1, u32::MAX as i64) as u32;
            }
        }

        lengths
    }

    /// Length of 1-based `month` in `year`; `None` when out of range.
    pub fn month_length(&self, year: i32, month: u32) -> Option<u32> {
        let idx = (month as usize).checked_sub(1)?;
        self.month_lengths(year).get(idx).copied()
    }

    /// Whether an intercalary entry exists in `year`.
    pub fn is_intercalary_active(&self, entry: &IntercalaryDefinition, year: i32) -> bool {
        !entry.leap_year_only || self.is_leap_year(year)
    }

    /// Total days in `year`: months plus active intercalary periods.
    ///
    /// Entries whose `after` names no month never occur on the timeline and
    /// contribute nothing. Saturates at `u32::MAX`.
    pub fn year_length(&self, year: i32) -> u32 {
        saturate(self.days_in_year_kind(self.is_leap_year(year), false))
    }

    /// Days in `year` that advance the weekday.
    pub fn weekday_year_length(&self, year: i32) -> u32 {
        saturate(self.days_in_year_kind(self.is_leap_year(year), true))
    }

    /// Length of a common (`leap == false`) or leap year, optionally counting
    /// only days that advance the weekday.
    pub(crate) fn days_in_year_kind(&self, leap: bool, weekdays_only: bool) -> u64 {
        let months: u64 = self.month_lengths_for(leap).iter().map(|&d| d as u64).sum();
        let extra: u64 = self
            .placed_intercalary(leap)
            .filter(|(_, entry)| !weekdays_only || entry.counts_for_weekdays)
            .map(|(_, entry)| entry.days as u64)
            .sum();
        months + extra
    }

    /// Active intercalary entries placed after 1-based `month` in `year`,
    /// in definition order.
    ///
    /// Month 0 or a month past the end yields an empty list.
    pub fn intercalary_days_after(&self, year: i32, month: u32) -> Vec<&IntercalaryDefinition> {
        if month == 0 || month as usize > self.months.len() {
            return Vec::new();
        }
        self.placed_intercalary(self.is_leap_year(year))
            .filter(|(after, _)| *after == month)
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Active entries paired with the 1-based month they follow.
    /// Entries with an unresolvable `after` are dropped here.
    fn placed_intercalary(
        &self,
        leap: bool,
    ) -> impl Iterator<Item = (u32, &IntercalaryDefinition)> + '_ {
        self.intercalary
            .iter()
            .filter(move |entry| !entry.leap_year_only || leap)
            .filter_map(move |entry| self.month_index(&entry.after).map(|idx| (idx, entry)))
    }
}

fn saturate(days: u64) -> u32 {
    u32::try_from(days).unwrap_or(u32::MAX)
}
