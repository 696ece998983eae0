//! Almanac Engine - Main entry point.
//!
//! Loads calendars, activates the configured one and reports the date for
//! the configured world-clock value.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use almanac_engine::{CalendarService, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (calendars/ lives there too).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almanac_engine=info,almanac_domain=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Almanac Engine");

    let config = EngineConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let service = CalendarService::with_builtins();
    if let Err(e) = service.load_from_dir(&config.calendar_dir).await {
        tracing::warn!("Using built-in calendars only: {}", e);
    }

    let engine = service
        .activate(&config.active_calendar)
        .await
        .with_context(|| format!("cannot activate calendar '{}'", config.active_calendar))?;

    let date = match config.anchor() {
        Some(anchor) => engine.clock_to_date_anchored(config.world_time, anchor),
        None => engine.clock_to_date(config.world_time),
    };
    let calendar = engine.definition();

    tracing::info!(
        calendar = %engine.id(),
        world_time = config.world_time,
        date = %date.display_full(calendar),
        time = %date.display_time(),
        weekday = date.weekday_name(calendar).unwrap_or("Unknown"),
        "Current date"
    );

    if let Some(season) = engine.season_for(&date) {
        tracing::info!(season = %season.name, "Season");
    }
    if let Some(sun) = engine.sun_times(&date) {
        tracing::info!(sunrise = %sun.sunrise, sunset = %sun.sunset, "Daylight");
    }
    for phase in engine.moon_phases(&date) {
        tracing::info!(
            moon = %phase.moon,
            phase = %phase.phase_name,
            day = phase.day_in_phase,
            days_until_next = phase.days_until_next,
            "Moon phase"
        );
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
