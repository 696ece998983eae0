//! Engine configuration from environment variables.

use std::path::PathBuf;

use almanac_domain::EpochAnchor;
use anyhow::Context;

/// Runtime settings for the engine binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory of `*.json` calendar documents
    pub calendar_dir: PathBuf,
    /// Calendar (or variant) ID to activate
    pub active_calendar: String,
    /// World-clock seconds to report
    pub world_time: i64,
    /// Unix timestamp anchoring year zero
    pub world_anchor: Option<i64>,
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let world_time = match get("ALMANAC_WORLD_TIME") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("ALMANAC_WORLD_TIME must be an integer, got '{raw}'"))?,
            None => 0,
        };
        let world_anchor = get("ALMANAC_WORLD_ANCHOR")
            .map(|raw| {
                raw.parse::<i64>().with_context(|| {
                    format!("ALMANAC_WORLD_ANCHOR must be a Unix timestamp, got '{raw}'")
                })
            })
            .transpose()?;

        Ok(Self {
            calendar_dir: get("ALMANAC_CALENDAR_DIR")
                .unwrap_or_else(|| "calendars".into())
                .into(),
            active_calendar: get("ALMANAC_ACTIVE_CALENDAR").unwrap_or_else(|| "gregorian".into()),
            world_time,
            world_anchor,
        })
    }

    pub fn anchor(&self) -> Option<EpochAnchor> {
        self.world_anchor.map(EpochAnchor::UnixTimestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<EngineConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.calendar_dir, PathBuf::from("calendars"));
        assert_eq!(config.active_calendar, "gregorian");
        assert_eq!(config.world_time, 0);
        assert_eq!(config.anchor(), None);
    }

    #[test]
    fn explicit_values() {
        let config = config(&[
            ("ALMANAC_CALENDAR_DIR", "/srv/calendars"),
            ("ALMANAC_ACTIVE_CALENDAR", "harptos"),
            ("ALMANAC_WORLD_TIME", " -86400 "),
            ("ALMANAC_WORLD_ANCHOR", "1700000000"),
        ])
        .unwrap();
        assert_eq!(config.calendar_dir, PathBuf::from("/srv/calendars"));
        assert_eq!(config.active_calendar, "harptos");
        assert_eq!(config.world_time, -86_400);
        assert_eq!(config.anchor(), Some(EpochAnchor::UnixTimestamp(1_700_000_000)));
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = config(&[("ALMANAC_ACTIVE_CALENDAR", "  "), ("ALMANAC_WORLD_TIME", "")]).unwrap();
        assert_eq!(config.active_calendar, "gregorian");
        assert_eq!(config.world_time, 0);
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = config(&[("ALMANAC_WORLD_TIME", "noon")]).unwrap_err();
        assert!(err.to_string().contains("ALMANAC_WORLD_TIME"));

        let err = config(&[("ALMANAC_WORLD_ANCHOR", "1.5")]).unwrap_err();
        assert!(err.to_string().contains("ALMANAC_WORLD_ANCHOR"));
    }
}
