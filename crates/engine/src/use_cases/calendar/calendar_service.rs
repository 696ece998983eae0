//! Calendar service: the registry of constructed engines.
//!
//! Engines are immutable and shared behind `Arc`. Switching the active
//! calendar swaps which engine callers are handed; it never mutates one.

use std::path::PathBuf;
use std::sync::Arc;

use almanac_domain::{CalendarDefinition, CalendarEngine, CalendarError, CalendarId};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::infrastructure::importers::{CalendarImporter, ImportError};

/// Errors that can occur in the calendar service.
#[derive(Debug, Error)]
pub enum CalendarServiceError {
    #[error("Calendar not found: {0}")]
    NotFound(String),
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

/// Registry of calendar engines keyed by calendar ID.
pub struct CalendarService {
    engines: DashMap<CalendarId, Arc<CalendarEngine>>,
    active: RwLock<Option<Arc<CalendarEngine>>>,
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarService {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            engines: DashMap::new(),
            active: RwLock::new(None),
        }
    }

    /// Create a registry holding the built-in Gregorian and Harptos calendars.
    pub fn with_builtins() -> Self {
        let service = Self::new();
        for definition in [CalendarDefinition::gregorian(), CalendarDefinition::harptos()] {
            if let Err(e) = service.register(definition) {
                tracing::warn!(error = %e, "Failed to register built-in calendar");
            }
        }
        service
    }

    /// Construct and register an engine for `definition`, plus one per variant.
    ///
    /// A definition that fails validation leaves the registry untouched. A
    /// variant that fails is logged and skipped; the base is still registered.
    pub fn register(
        &self,
        definition: CalendarDefinition,
    ) -> Result<Arc<CalendarEngine>, CalendarServiceError> {
        let derived: Vec<(String, Result<CalendarDefinition, CalendarError>)> = definition
            .variants()
            .keys()
            .map(|key| (key.clone(), definition.with_variant(key)))
            .collect();

        let engine = Arc::new(CalendarEngine::new(definition)?);

        for (key, result) in derived {
            match result.and_then(CalendarEngine::new) {
                Ok(variant) => {
                    self.engines
                        .insert(variant.id().clone(), Arc::new(variant));
                }
                Err(e) => {
                    tracing::warn!(
                        calendar = %engine.id(),
                        variant = %key,
                        error = %e,
                        "Skipping invalid calendar variant"
                    );
                }
            }
        }

        self.engines.insert(engine.id().clone(), Arc::clone(&engine));
        tracing::debug!(calendar = %engine.id(), "Registered calendar");
        Ok(engine)
    }

    /// Load and register every calendar document in `dir`.
    ///
    /// Returns the number of base calendars registered. Calendars that fail
    /// construction are logged and skipped.
    pub async fn load_from_dir(&self, dir: impl Into<PathBuf>) -> Result<usize, CalendarServiceError> {
        let importer = CalendarImporter::new(dir);
        let definitions = importer.load_all().await?;

        let mut total = 0;
        for definition in definitions {
            let id = definition.id().clone();
            match self.register(definition) {
                Ok(_) => total += 1,
                Err(e) => {
                    tracing::warn!(calendar = %id, error = %e, "Failed to register calendar");
                }
            }
        }

        tracing::info!(
            dir = %importer.calendar_dir().display(),
            "Loaded {} calendars",
            total
        );
        Ok(total)
    }

    /// Get the engine registered under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<CalendarEngine>> {
        let id = CalendarId::new(id).ok()?;
        self.engines.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// All registered calendar IDs, sorted.
    pub fn calendar_ids(&self) -> Vec<CalendarId> {
        let mut ids: Vec<CalendarId> = self.engines.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Make `id` the active calendar.
    ///
    /// Unknown IDs fail with `NotFound` and keep the current active engine.
    pub async fn activate(&self, id: &str) -> Result<Arc<CalendarEngine>, CalendarServiceError> {
        let engine = self
            .get(id)
            .ok_or_else(|| CalendarServiceError::NotFound(id.to_string()))?;

        *self.active.write().await = Some(Arc::clone(&engine));
        tracing::info!(calendar = %engine.id(), "Activated calendar");
        Ok(engine)
    }

    /// The active engine, if one has been activated.
    pub async fn active(&self) -> Option<Arc<CalendarEngine>> {
        self.active.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING: &str = r#"{
        "id": "ring",
        "name": "Ring",
        "months": [{ "name": "First", "days": 3 }, { "name": "Last", "days": 3 }],
        "weekdays": [{ "name": "Day" }],
        "variants": {
            "long": {
                "name": "Long",
                "overrides": [{ "kind": "month", "target": "Last", "days": 5 }]
            },
            "broken": {
                "name": "Broken",
                "overrides": [{ "kind": "month", "target": "First", "days": 0 }]
            }
        }
    }"#;

    fn ring() -> CalendarDefinition {
        serde_json::from_str(RING).unwrap()
    }

    mod registration {
        use super::*;

        #[test]
        fn builtins_are_registered() {
            let service = CalendarService::with_builtins();
            let ids: Vec<_> = service
                .calendar_ids()
                .into_iter()
                .map(String::from)
                .collect();
            assert_eq!(ids, vec!["gregorian", "harptos"]);
        }

        #[test]
        fn variants_register_alongside_base() {
            let service = CalendarService::new();
            service.register(ring()).unwrap();

            assert!(service.get("ring").is_some());
            let long = service.get("ring-long").unwrap();
            assert_eq!(long.definition().year_length(0), 8);
            // invalid variant skipped
            assert!(service.get("ring-broken").is_none());
            assert_eq!(service.len(), 2);
        }

        #[test]
        fn invalid_definition_leaves_registry_unchanged() {
            let service = CalendarService::with_builtins();
            let bad: CalendarDefinition = serde_json::from_str(
                r#"{ "id": "bad", "name": "Bad", "months": [{ "name": "M", "days": 1 }], "weekdays": [] }"#,
            )
            .unwrap();

            let err = service.register(bad).unwrap_err();
            assert!(matches!(err, CalendarServiceError::Calendar(_)));
            assert_eq!(service.len(), 2);
            assert!(service.get("bad").is_none());
        }

        #[test]
        fn lookup_normalizes_ids() {
            let service = CalendarService::with_builtins();
            assert!(service.get("  Harptos ").is_some());
            assert!(service.get("not an id!").is_none());
        }
    }

    mod activation {
        use super::*;

        #[tokio::test]
        async fn nothing_active_initially() {
            assert!(CalendarService::with_builtins().active().await.is_none());
        }

        #[tokio::test]
        async fn activate_swaps_engine() {
            let service = CalendarService::with_builtins();
            service.activate("gregorian").await.unwrap();
            assert_eq!(service.active().await.unwrap().id().as_str(), "gregorian");

            service.activate("harptos").await.unwrap();
            assert_eq!(service.active().await.unwrap().id().as_str(), "harptos");
        }

        #[tokio::test]
        async fn unknown_id_keeps_previous_engine() {
            let service = CalendarService::with_builtins();
            let previous = service.activate("harptos").await.unwrap();

            let err = service.activate("eberron").await.unwrap_err();
            assert!(matches!(err, CalendarServiceError::NotFound(ref id) if id == "eberron"));

            let active = service.active().await.unwrap();
            assert!(Arc::ptr_eq(&active, &previous));
        }

        #[tokio::test]
        async fn held_engine_survives_swap() {
            let service = CalendarService::with_builtins();
            let held = service.activate("harptos").await.unwrap();
            service.activate("gregorian").await.unwrap();
            assert_eq!(held.clock_to_date(0).year, 1492);
        }
    }

    mod loading {
        use super::*;

        #[tokio::test]
        async fn load_from_dir_counts_base_calendars() {
            let dir = tempfile::tempdir().unwrap();
            tokio::fs::write(dir.path().join("ring.json"), RING).await.unwrap();
            tokio::fs::write(dir.path().join("junk.json"), "{}").await.unwrap();

            let service = CalendarService::new();
            let count = service.load_from_dir(dir.path()).await.unwrap();

            assert_eq!(count, 1);
            let ids: Vec<_> = service
                .calendar_ids()
                .into_iter()
                .map(String::from)
                .collect();
            assert_eq!(ids, vec!["ring", "ring-long"]);
        }

        #[tokio::test]
        async fn missing_dir_is_import_error() {
            let dir = tempfile::tempdir().unwrap();
            let service = CalendarService::new();
            let err = service
                .load_from_dir(dir.path().join("missing"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                CalendarServiceError::Import(ImportError::DirectoryNotFound(_))
            ));
        }
    }
}
