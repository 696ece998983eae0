//! Calendar variants
//!
//! A variant is a named list of overrides that derives a new calendar from a
//! base definition. Expansion clones the base and applies each override
//! through the merge function for its kind; the base is never touched, so any
//! number of variants can be derived from one shared definition.

use serde::{Deserialize, Serialize};

use super::definition::{CalendarDefinition, CalendarId, MoonDefinition, SeasonDefinition};
use crate::error::CalendarError;

/// A named set of overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether hosts should prefer this variant over the base
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub overrides: Vec<VariantOverride>,
}

impl CalendarVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: false,
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, change: VariantOverride) -> Self {
        self.overrides.push(change);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// One override, tagged by the part of the calendar it changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VariantOverride {
    #[serde(rename_all = "camelCase")]
    Year {
        #[serde(default)]
        epoch: Option<i32>,
        #[serde(default)]
        start_day: Option<u32>,
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        suffix: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Month {
        /// Current name of the month to change
        target: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        abbreviation: Option<String>,
        #[serde(default)]
        days: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Weekday {
        target: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        abbreviation: Option<String>,
    },
    Format { key: String, pattern: String },
    Moons { moons: Vec<MoonDefinition> },
    Seasons { seasons: Vec<SeasonDefinition> },
}

impl CalendarDefinition {
    /// Key of the variant flagged as default, if any.
    pub fn default_variant(&self) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, variant)| variant.default)
            .map(|(key, _)| key.as_str())
    }

    /// Derive the calendar described by variant `key`.
    ///
    /// The result has id `"{base}-{key}"`, carries no variants of its own and
    /// is validated before it is returned.
    pub fn with_variant(&self, key: &str) -> Result<CalendarDefinition, CalendarError> {
        let variant = self
            .variants
            .get(key)
            .ok_or_else(|| CalendarError::unknown_variant(&self.id, key))?;

        let mut derived = self.clone();
        derived.variants.clear();
        derived.id = CalendarId::new(format!("{}-{}", self.id, key))?;
        derived.name = format!("{} ({})", self.name, variant.name);
        if variant.description.is_some() {
            derived.description = variant.description.clone();
        }

        for change in &variant.overrides {
            match change {
                VariantOverride::Year {
                    epoch,
                    start_day,
                    prefix,
                    suffix,
                } => merge_year(&mut derived, *epoch, *start_day, prefix, suffix),
                VariantOverride::Month {
                    target,
                    name,
                    abbreviation,
                    days,
                } => merge_month(&mut derived, target, name, abbreviation, *days),
                VariantOverride::Weekday {
                    target,
                    name,
                    abbreviation,
                } => merge_weekday(&mut derived, target, name, abbreviation),
                VariantOverride::Format { key, pattern } => {
                    derived.date_formats.insert(key.clone(), pattern.clone());
                }
                VariantOverride::Moons { moons } => {
                    derived.moons = moons.clone();
                }
                VariantOverride::Seasons { seasons } => {
                    derived.seasons = seasons.clone();
                }
            }
        }

        derived.validate()?;
        tracing::debug!(
            calendar = %self.id,
            variant = key,
            derived = %derived.id,
            "Expanded calendar variant"
        );
        Ok(derived)
    }
}

fn merge_year(
    def: &mut CalendarDefinition,
    epoch: Option<i32>,
    start_day: Option<u32>,
    prefix: &Option<String>,
    suffix: &Option<String>,
) {
    if let Some(epoch) = epoch {
        def.year.epoch = epoch;
    }
    if let Some(start_day) = start_day {
        def.year.start_day = start_day;
    }
    if let Some(prefix) = prefix {
        def.year.prefix = prefix.clone();
    }
    if let Some(suffix) = suffix {
        def.year.suffix = suffix.clone();
    }
}

/// Renames also rewrite every reference to the old name so intercalary
/// periods and the leap adjustment stay attached to the same month.
fn merge_month(
    def: &mut CalendarDefinition,
    target: &str,
    name: &Option<String>,
    abbreviation: &Option<String>,
    days: Option<u32>,
) {
    let Some(month) = def.months.iter_mut().find(|m| m.name == target) else {
        tracing::warn!(calendar = %def.id, month = target, "Variant overrides unknown month");
        return;
    };

    if let Some(days) = days {
        month.days = days;
    }
    if let Some(abbreviation) = abbreviation {
        month.abbreviation = Some(abbreviation.clone());
    }
    if let Some(new_name) = name {
        month.name = new_name.clone();
        for entry in def.intercalary.iter_mut().filter(|e| e.after == target) {
            entry.after = new_name.clone();
        }
        if def.leap_year.month.as_deref() == Some(target) {
            def.leap_year.month = Some(new_name.clone());
        }
    }
}

fn merge_weekday(
    def: &mut CalendarDefinition,
    target: &str,
    name: &Option<String>,
    abbreviation: &Option<String>,
) {
    let Some(weekday) = def.weekdays.iter_mut().find(|w| w.name == target) else {
        tracing::warn!(calendar = %def.id, weekday = target, "Variant overrides unknown weekday");
        return;
    };

    if let Some(name) = name {
        weekday.name = name.clone();
    }
    if let Some(abbreviation) = abbreviation {
        weekday.abbreviation = Some(abbreviation.clone());
    }
}
