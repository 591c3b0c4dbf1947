use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod save;
pub mod state;

pub use app::{
    DirectionalInput, GameSession, InputAction, Location, LocationStateMachine,
    MovementController, PresentationHooks, RegionSize, SessionConfig, SessionError,
    TransitionContext, TransitionCoordinator, TransitionEvent, TransitionPhase, TransitionPlan,
    TransitionRejected, UiContext, UnknownLocation, Vec2, Viewport, DEFAULT_ENTER_FADE,
    DEFAULT_SETTLE_PAUSE, HERO_SPEED_UNITS_PER_SECOND, HERO_SPRITE_SIZE,
};
pub use content::{
    buy_price, compile_item_catalog, sell_price, ArmorData, Buyable, CatalogError,
    CatalogErrorCode, ConsumableData, Durability, GunData, Item, ItemCatalog, ItemKind, Pricing,
    SourceLocation, WeaponData,
};
pub use save::{
    EraseOutcome, SaveDeleteError, SaveLoadError, SaveStore, SaveWriteError, SAVE_FILE_NAME,
    SAVE_VERSION,
};
pub use state::{
    GameState, GameStateError, HeroState, ShopError, Vitals, DEFAULT_MAX_HEALTH,
    DEFAULT_STARTING_GOLD,
};

pub const ROOT_ENV_VAR: &str = "EMBERWAKE_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            base_content_dir: root.join("assets").join("base"),
            save_dir: root.join("saves"),
            root,
        }
    }

    pub fn save_file(&self) -> PathBuf {
        self.save_dir.join(SAVE_FILE_NAME)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "EMBERWAKE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/emberwake\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let app_paths = AppPaths::from_root(resolve_root()?);

    fs::create_dir_all(&app_paths.save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: app_paths.save_dir.clone(),
        source,
    })?;

    Ok(app_paths)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
