use std::env;
use std::time::Duration;

use engine::{
    compile_item_catalog, resolve_app_paths, CatalogError, GameSession, SaveStore, SessionConfig,
    StartupError,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::loop_runner::LoopConfig;

pub(crate) const SETTLE_MS_ENV_VAR: &str = "EMBERWAKE_SETTLE_MS";
pub(crate) const ENTER_FADE_MS_ENV_VAR: &str = "EMBERWAKE_ENTER_FADE_MS";
pub(crate) const CHECKPOINT_ENV_VAR: &str = "EMBERWAKE_CHECKPOINT_ON_TRANSITION";
pub(crate) const TARGET_TPS_ENV_VAR: &str = "EMBERWAKE_TARGET_TPS";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to compile item catalog: {0}")]
    Catalog(#[from] CatalogError),
}

pub(crate) struct AppWiring {
    pub(crate) loop_config: LoopConfig,
    pub(crate) session: GameSession,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Emberwake Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        base_content_dir = %app_paths.base_content_dir.display(),
        save_dir = %app_paths.save_dir.display(),
        "startup"
    );

    let catalog = compile_item_catalog(&app_paths.base_content_dir)?;
    info!(item_count = catalog.len(), "item_catalog_loaded");

    let lookup = |var: &str| read_env_var(var);
    let session_config = session_config_from(lookup);
    let loop_config = loop_config_from(lookup);
    info!(
        enter_fade_ms = session_config.enter_fade.as_millis() as u64,
        settle_ms = session_config.settle_pause.as_millis() as u64,
        checkpoint_on_transition = session_config.checkpoint_on_transition,
        target_tps = loop_config.target_tps,
        "session_config"
    );

    let store = SaveStore::new(app_paths.save_file());
    Ok(AppWiring {
        loop_config,
        session: GameSession::new(session_config, store, catalog),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn read_env_var(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(error) => {
            warn!(env_var = var, error = %error, "unable to read env var; using default");
            None
        }
    }
}

pub(crate) fn session_config_from(lookup: impl Fn(&str) -> Option<String>) -> SessionConfig {
    let defaults = SessionConfig::default();
    SessionConfig {
        enter_fade: parse_millis(&lookup, ENTER_FADE_MS_ENV_VAR, defaults.enter_fade),
        settle_pause: parse_millis(&lookup, SETTLE_MS_ENV_VAR, defaults.settle_pause),
        checkpoint_on_transition: parse_bool(
            &lookup,
            CHECKPOINT_ENV_VAR,
            defaults.checkpoint_on_transition,
        ),
        ..defaults
    }
}

pub(crate) fn loop_config_from(lookup: impl Fn(&str) -> Option<String>) -> LoopConfig {
    let defaults = LoopConfig::default();
    let target_tps = match lookup(TARGET_TPS_ENV_VAR) {
        Some(value) => match value.trim().parse::<u32>() {
            Ok(tps) if tps > 0 => tps,
            _ => {
                warn!(
                    env_var = TARGET_TPS_ENV_VAR,
                    value = value.as_str(),
                    "invalid tick rate; falling back to default"
                );
                defaults.target_tps
            }
        },
        None => defaults.target_tps,
    };
    LoopConfig {
        target_tps,
        ..defaults
    }
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    fallback: Duration,
) -> Duration {
    let Some(value) = lookup(var) else {
        return fallback;
    };
    match value.trim().parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms),
        Err(_) => {
            warn!(
                env_var = var,
                value = value.as_str(),
                "invalid millisecond value; falling back to default"
            );
            fallback
        }
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, fallback: bool) -> bool {
    let Some(value) = lookup(var) else {
        return fallback;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(
                env_var = var,
                value = value.as_str(),
                "invalid boolean value; falling back to default"
            );
            fallback
        }
    }
}
