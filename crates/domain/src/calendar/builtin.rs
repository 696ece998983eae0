//! Built-in calendars

use std::collections::BTreeMap;

use super::definition::{
    CalendarDefinition, CalendarId, IntercalaryDefinition, LeapYearConfig, MonthDefinition,
    MoonDefinition, MoonPhaseDefinition, MoonReference, SeasonDefinition, WeekdayDefinition,
    YearConfig,
};

impl CalendarDefinition {
    /// Creates the proleptic Gregorian calendar.
    ///
    /// Year 1 starts on a Monday; February gains a day in leap years.
    pub fn gregorian() -> Self {
        let months = [
            ("January", "Jan", 31),
            ("February", "Feb", 28),
            ("March", "Mar", 31),
            ("April", "Apr", 30),
            ("May", "May", 31),
            ("June", "Jun", 30),
            ("July", "Jul", 31),
            ("August", "Aug", 31),
            ("September", "Sep", 30),
            ("October", "Oct", 31),
            ("November", "Nov", 30),
            ("December", "Dec", 31),
        ];
        let weekdays = [
            ("Sunday", "Sun"),
            ("Monday", "Mon"),
            ("Tuesday", "Tue"),
            ("Wednesday", "Wed"),
            ("Thursday", "Thu"),
            ("Friday", "Fri"),
            ("Saturday", "Sat"),
        ];

        Self {
            id: CalendarId::new("gregorian").expect("gregorian is a valid calendar ID"),
            name: "Gregorian Calendar".to_string(),
            description: Some("The modern civil calendar".to_string()),
            year: YearConfig {
                epoch: 1,
                start_day: 1,
                prefix: String::new(),
                suffix: String::new(),
            },
            leap_year: LeapYearConfig::gregorian("February", 1),
            months: months
                .into_iter()
                .map(|(name, abbr, days)| MonthDefinition::new(name, days).with_abbreviation(abbr))
                .collect(),
            weekdays: weekdays
                .into_iter()
                .map(|(name, abbr)| WeekdayDefinition {
                    name: name.to_string(),
                    abbreviation: Some(abbr.to_string()),
                })
                .collect(),
            intercalary: Vec::new(),
            time: None,
            seasons: vec![
                SeasonDefinition::new("Spring", 3, 20).with_sun(6.25, 18.5),
                SeasonDefinition::new("Summer", 6, 21).with_sun(5.25, 20.75),
                SeasonDefinition::new("Autumn", 9, 22).with_sun(6.5, 18.0),
                SeasonDefinition::new("Winter", 12, 21).with_sun(7.5, 16.5),
            ],
            moons: vec![MoonDefinition {
                name: "Moon".to_string(),
                cycle_length: 29.530588,
                first_new_moon: MoonReference {
                    year: 2000,
                    month: 1,
                    day: 6,
                },
                phases: eight_phases(29.530588),
                color: None,
            }],
            date_formats: BTreeMap::from([
                ("short".to_string(), "{month} {day}, {year}".to_string()),
                ("iso".to_string(), "{year}-{month:02}-{day:02}".to_string()),
            ]),
            variants: BTreeMap::new(),
        }
    }

    /// Creates the Calendar of Harptos (Forgotten Realms).
    ///
    /// - 12 months of 30 days each: Hammer, Alturiak, Ches, Tarsakh, Mirtul, Kythorn,
    ///   Flamerule, Eleasis, Eleint, Marpenoth, Uktar, Nightal
    /// - 5 festival days plus Shieldmeet every fourth year, all outside the tenday
    /// - 10-day "tendays" instead of 7-day weeks
    /// - Era: DR (Dalereckoning)
    pub fn harptos() -> Self {
        let months = [
            "Hammer",
            "Alturiak",
            "Ches",
            "Tarsakh",
            "Mirtul",
            "Kythorn",
            "Flamerule",
            "Eleasis",
            "Eleint",
            "Marpenoth",
            "Uktar",
            "Nightal",
        ];
        let weekdays = [
            "First-day",
            "Second-day",
            "Third-day",
            "Fourth-day",
            "Fifth-day",
            "Sixth-day",
            "Seventh-day",
            "Eighth-day",
            "Ninth-day",
            "Tenth-day",
        ];
        let festival = |name: &str, after: &str| IntercalaryDefinition::new(name, after).outside_week();

        Self {
            id: CalendarId::new("harptos").expect("harptos is a valid calendar ID"),
            name: "Calendar of Harptos".to_string(),
            description: Some("The reckoning of years used across Faerûn".to_string()),
            year: YearConfig {
                epoch: 1492,
                start_day: 0,
                prefix: String::new(),
                suffix: " DR".to_string(),
            },
            leap_year: LeapYearConfig::custom(4, 0),
            months: months
                .into_iter()
                .map(|name| MonthDefinition::new(name, 30))
                .collect(),
            weekdays: weekdays.into_iter().map(WeekdayDefinition::new).collect(),
            intercalary: vec![
                festival("Midwinter", "Hammer"),
                festival("Greengrass", "Tarsakh"),
                festival("Midsummer", "Flamerule"),
                festival("Shieldmeet", "Flamerule").leap_year_only(),
                festival("Highharvestide", "Eleint"),
                festival("Feast of the Moon", "Uktar"),
            ],
            time: None,
            seasons: vec![
                SeasonDefinition::new("Spring", 3, 19).with_sun(6.25, 18.5),
                SeasonDefinition::new("Summer", 6, 20).with_sun(5.25, 20.75),
                SeasonDefinition::new("Autumn", 9, 21).with_sun(6.5, 18.0),
                SeasonDefinition::new("Winter", 12, 20).with_sun(7.5, 16.75),
            ],
            moons: vec![MoonDefinition {
                name: "Selûne".to_string(),
                cycle_length: 30.4375,
                first_new_moon: MoonReference {
                    year: 1372,
                    month: 1,
                    day: 1,
                },
                phases: eight_phases(30.4375),
                color: Some("#c0c0d8".to_string()),
            }],
            date_formats: BTreeMap::from([(
                "short".to_string(),
                "{day} {month}, {year} DR".to_string(),
            )]),
            variants: BTreeMap::new(),
        }
    }
}

/// Four one-day principal phases with the rest of the cycle split between
/// the intermediate ones.
fn eight_phases(cycle_length: f64) -> Vec<MoonPhaseDefinition> {
    let between = (cycle_length - 4.0) / 4.0;
    vec![
        MoonPhaseDefinition::new("New Moon", 1.0),
        MoonPhaseDefinition::new("Waxing Crescent", between),
        MoonPhaseDefinition::new("First Quarter", 1.0),
        MoonPhaseDefinition::new("Waxing Gibbous", between),
        MoonPhaseDefinition::new("Full Moon", 1.0),
        MoonPhaseDefinition::new("Waning Gibbous", between),
        MoonPhaseDefinition::new("Last Quarter", 1.0),
        MoonPhaseDefinition::new("Waning Crescent", between),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::engine::CalendarEngine;

    mod gregorian {
        use super::*;

        #[test]
        fn is_valid() {
            assert!(CalendarDefinition::gregorian().validate().is_ok());
        }

        #[test]
        fn has_twelve_months_and_seven_days() {
            let cal = CalendarDefinition::gregorian();
            assert_eq!(cal.months().len(), 12);
            assert_eq!(cal.weekdays().len(), 7);
            assert_eq!(cal.year_length(2023), 365);
            assert_eq!(cal.year_length(2024), 366);
            assert_eq!(cal.year_length(1900), 365);
            assert_eq!(cal.year_length(2000), 366);
        }

        #[test]
        fn phases_fill_the_cycle() {
            let cal = CalendarDefinition::gregorian();
            let moon = &cal.moons()[0];
            let total: f64 = moon.phases.iter().map(|p| p.length).sum();
            assert!((total - moon.cycle_length).abs() < 1e-9);
        }

        #[test]
        fn full_moon_mid_cycle() {
            let engine = CalendarEngine::new(CalendarDefinition::gregorian()).unwrap();
            // 2000-01-21 was a full moon
            let date = engine.date(2000, 1, 21).unwrap();
            let phases = engine.moon_phases(&date);
            assert_eq!(phases[0].phase_name, "Full Moon");
        }
    }

    mod harptos {
        use super::*;

        #[test]
        fn is_valid() {
            assert!(CalendarDefinition::harptos().validate().is_ok());
        }

        #[test]
        fn year_lengths() {
            let cal = CalendarDefinition::harptos();
            assert_eq!(cal.year_length(1491), 365);
            assert_eq!(cal.year_length(1492), 366);
        }

        #[test]
        fn shieldmeet_follows_midsummer() {
            let cal = CalendarDefinition::harptos();
            let names: Vec<_> = cal
                .intercalary_days_after(1492, 7)
                .iter()
                .map(|e| e.name.as_str())
                .collect();
            assert_eq!(names, vec!["Midsummer", "Shieldmeet"]);
        }

        #[test]
        fn festivals_sit_outside_the_tenday() {
            let cal = CalendarDefinition::harptos();
            assert!(cal.intercalary().iter().all(|e| !e.counts_for_weekdays));
            assert_eq!(cal.weekday_year_length(1492), 360);
        }
    }
}
