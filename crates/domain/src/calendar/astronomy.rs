//! Seasons, daylight and moon phases
//!
//! Read-only queries layered on the conversion engine. They key off a date's
//! position in its year (seasons) or its absolute day index (moons).

use serde::{Deserialize, Serialize};

use super::date::{CalendarDate, ClockTime};
use super::definition::{MoonDefinition, SeasonDefinition, TimeConfig};
use super::engine::CalendarEngine;

/// Sunrise and sunset for one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: ClockTime,
    pub sunset: ClockTime,
}

/// Where a date falls in one moon's cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonPhaseInfo {
    pub moon: String,
    pub phase_index: usize,
    pub phase_name: String,
    /// 1-based day within the phase
    pub day_in_phase: u32,
    pub days_until_next: f64,
    /// Fraction of the phase elapsed, in `[0, 1]`
    pub progress: f64,
}

/// Convert decimal hours (6.5 = half past six) to a time of day.
///
/// Minutes are rounded to the nearest whole minute; a result equal to a full
/// hour rolls over into the next hour. Uses 60 minutes per hour when no time
/// configuration is given.
pub fn decimal_hours_to_time(hours: f64, time: Option<&TimeConfig>) -> ClockTime {
    let minutes_in_hour = time.map_or(60, |t| t.minutes_in_hour);
    let hours = if hours.is_finite() { hours.max(0.0) } else { 0.0 };

    let mut hour = hours.trunc() as u32;
    let mut minute = ((hours - hours.trunc()) * minutes_in_hour as f64).round() as u32;
    if minute >= minutes_in_hour {
        hour += 1;
        minute = 0;
    }
    ClockTime::new(hour, minute, 0)
}

impl CalendarEngine {
    /// Season in effect on `date`.
    ///
    /// The season with the latest start at or before the date; before the
    /// first start of the year, the season that started last the year before.
    pub fn season_for(&self, date: &CalendarDate) -> Option<&SeasonDefinition> {
        let months = self.definition().months().len() as u32;
        let today = self.day_of_year(date);

        let starts: Vec<(i64, &SeasonDefinition)> = self
            .definition()
            .seasons()
            .iter()
            .filter(|season| (1..=months).contains(&season.start_month))
            .map(|season| {
                let length = self
                    .definition()
                    .month_length(date.year, season.start_month)
                    .unwrap_or(1);
                let start = CalendarDate::new(
                    date.year,
                    season.start_month,
                    season.start_day.clamp(1, length),
                );
                (self.day_of_year(&start), season)
            })
            .collect();

        starts
            .iter()
            .filter(|(start, _)| *start <= today)
            .max_by_key(|(start, _)| *start)
            .or_else(|| starts.iter().max_by_key(|(start, _)| *start))
            .map(|(_, season)| *season)
    }

    /// Sunrise and sunset from the current season, when it declares both.
    pub fn sun_times(&self, date: &CalendarDate) -> Option<SunTimes> {
        let season = self.season_for(date)?;
        let time = self.definition().time();
        Some(SunTimes {
            sunrise: decimal_hours_to_time(season.sunrise?, time),
            sunset: decimal_hours_to_time(season.sunset?, time),
        })
    }

    /// Phase of `moon` on `date`; `None` when the moon has no phase table.
    pub fn moon_phase(&self, date: &CalendarDate, moon: &MoonDefinition) -> Option<MoonPhaseInfo> {
        let last = moon.phases.len().checked_sub(1)?;
        let reference = moon.first_new_moon;
        let reference = CalendarDate::new(reference.year, reference.month, reference.day);
        let elapsed = (self.day_index(date) - self.day_index(&reference)) as f64;
        let position = elapsed.rem_euclid(moon.cycle_length);

        let mut start = 0.0;
        for (idx, phase) in moon.phases.iter().enumerate() {
            let end = start + phase.length;
            if position < end || idx == last {
                let into = position - start;
                let boundary = if idx == last {
                    end.max(moon.cycle_length)
                } else {
                    end
                };
                return Some(MoonPhaseInfo {
                    moon: moon.name.clone(),
                    phase_index: idx,
                    phase_name: phase.name.clone(),
                    day_in_phase: into.floor() as u32 + 1,
                    days_until_next: (boundary - position).max(0.0),
                    progress: (into / phase.length).clamp(0.0, 1.0),
                });
            }
            start = end;
        }
        None
    }

    /// Phases of every moon in the calendar on `date`.
    pub fn moon_phases(&self, date: &CalendarDate) -> Vec<MoonPhaseInfo> {
        self.definition()
            .moons()
            .iter()
            .filter_map(|moon| self.moon_phase(date, moon))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::definition::{
        CalendarDefinition, CalendarId, MoonPhaseDefinition, MoonReference,
    };

    mod sun_time_conversion {
        use super::*;

        #[test]
        fn half_past() {
            assert_eq!(decimal_hours_to_time(6.5, None), ClockTime::new(6, 30, 0));
        }

        #[test]
        fn rounding_rolls_into_next_hour() {
            assert_eq!(decimal_hours_to_time(6.9999, None), ClockTime::new(7, 0, 0));
        }

        #[test]
        fn custom_minutes_per_hour() {
            let time = TimeConfig::new(20, 100, 100);
            assert_eq!(
                decimal_hours_to_time(5.25, Some(&time)),
                ClockTime::new(5, 25, 0)
            );
            assert_eq!(
                decimal_hours_to_time(5.999, Some(&time)),
                ClockTime::new(6, 0, 0)
            );
        }

        #[test]
        fn nonsense_input_is_midnight() {
            assert_eq!(decimal_hours_to_time(-3.0, None), ClockTime::midnight());
            assert_eq!(decimal_hours_to_time(f64::NAN, None), ClockTime::midnight());
        }
    }

    fn seasonal() -> CalendarEngine {
        CalendarEngine::new(
            CalendarDefinition::builder(CalendarId::new("seasonal").unwrap(), "Seasonal")
                .month("Early", 10)
                .month("Middle", 10)
                .month("Late", 10)
                .weekday("Day")
                .season(SeasonDefinition::new("Bloom", 1, 6).with_sun(6.0, 18.5))
                .season(SeasonDefinition::new("Blaze", 2, 1))
                .season(SeasonDefinition::new("Frost", 3, 4).with_sun(8.25, 16.0))
                .season(SeasonDefinition::new("Nowhere", 9, 1))
                .moon(MoonDefinition {
                    name: "Pale".to_string(),
                    cycle_length: 8.0,
                    first_new_moon: MoonReference {
                        year: 0,
                        month: 1,
                        day: 3,
                    },
                    phases: vec![
                        MoonPhaseDefinition::new("New", 1.0),
                        MoonPhaseDefinition::new("Waxing", 3.0),
                        MoonPhaseDefinition::new("Full", 1.0),
                        MoonPhaseDefinition::new("Waning", 2.0),
                    ],
                    color: None,
                })
                .moon(MoonDefinition {
                    name: "Shapeless".to_string(),
                    cycle_length: 5.0,
                    first_new_moon: MoonReference {
                        year: 0,
                        month: 1,
                        day: 1,
                    },
                    phases: vec![],
                    color: None,
                })
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    mod seasons {
        use super::*;

        #[test]
        fn latest_started_season_applies() {
            let engine = seasonal();
            let name = |m, d| {
                engine
                    .season_for(&CalendarDate::new(0, m, d))
                    .map(|s| s.name.clone())
            };
            assert_eq!(name(1, 6).as_deref(), Some("Bloom"));
            assert_eq!(name(1, 10).as_deref(), Some("Bloom"));
            assert_eq!(name(2, 1).as_deref(), Some("Blaze"));
            assert_eq!(name(3, 10).as_deref(), Some("Frost"));
        }

        #[test]
        fn wraps_to_last_season_before_first_start() {
            let engine = seasonal();
            let season = engine.season_for(&CalendarDate::new(0, 1, 2)).unwrap();
            assert_eq!(season.name, "Frost");
        }

        #[test]
        fn no_seasons_is_none() {
            let engine = CalendarEngine::new(
                CalendarDefinition::builder(CalendarId::new("bare").unwrap(), "Bare")
                    .month("Only", 10)
                    .weekday("Day")
                    .build()
                    .unwrap(),
            )
            .unwrap();
            assert!(engine.season_for(&CalendarDate::new(0, 1, 1)).is_none());
            assert!(engine.sun_times(&CalendarDate::new(0, 1, 1)).is_none());
        }

        #[test]
        fn sun_times_follow_season() {
            let engine = seasonal();
            let sun = engine.sun_times(&CalendarDate::new(0, 3, 5)).unwrap();
            assert_eq!(sun.sunrise, ClockTime::new(8, 15, 0));
            assert_eq!(sun.sunset, ClockTime::new(16, 0, 0));
            // Blaze declares no sun times
            assert!(engine.sun_times(&CalendarDate::new(0, 2, 5)).is_none());
        }
    }

    mod moons {
        use super::*;

        fn phase_on(engine: &CalendarEngine, month: u32, day: u32) -> MoonPhaseInfo {
            let date = CalendarDate::new(0, month, day);
            engine.moon_phase(&date, &engine.definition().moons()[0]).unwrap()
        }

        #[test]
        fn reference_day_is_new_moon() {
            let info = phase_on(&seasonal(), 1, 3);
            assert_eq!(info.phase_name, "New");
            assert_eq!(info.phase_index, 0);
            assert_eq!(info.day_in_phase, 1);
            assert_eq!(info.days_until_next, 1.0);
        }

        #[test]
        fn walks_phases_cumulatively() {
            let engine = seasonal();
            let waxing = phase_on(&engine, 1, 5);
            assert_eq!(waxing.phase_name, "Waxing");
            assert_eq!(waxing.day_in_phase, 2);
            assert!((waxing.progress - 1.0 / 3.0).abs() < 1e-9);

            assert_eq!(phase_on(&engine, 1, 7).phase_name, "Full");
            assert_eq!(phase_on(&engine, 1, 8).phase_name, "Waning");
            assert_eq!(phase_on(&engine, 1, 11).phase_name, "New");
        }

        #[test]
        fn dates_before_reference_wrap() {
            let info = phase_on(&seasonal(), 1, 1);
            assert_eq!(info.phase_name, "Waning");
            assert_eq!(info.day_in_phase, 2);
        }

        #[test]
        fn overflow_stays_in_last_phase() {
            let mut moon = seasonal().definition().moons()[0].clone();
            moon.cycle_length = 10.0;
            let engine = seasonal();
            // positions 7 through 9 lie past the 7 days of phases
            let info = engine.moon_phase(&CalendarDate::new(0, 1, 12), &moon).unwrap();
            assert_eq!(info.phase_name, "Waning");
            assert_eq!(info.progress, 1.0);
            assert_eq!(info.days_until_next, 1.0);
        }

        #[test]
        fn moons_without_phases_are_skipped() {
            let engine = seasonal();
            let phases = engine.moon_phases(&CalendarDate::new(0, 1, 3));
            assert_eq!(phases.len(), 1);
            assert_eq!(phases[0].moon, "Pale");
        }
    }
}
