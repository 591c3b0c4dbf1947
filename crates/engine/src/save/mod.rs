use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::content::ItemCatalog;
use crate::state::{GameState, GameStateError};

mod atomic_io;
mod format;
mod hashing;

pub use format::SAVE_VERSION;

pub const SAVE_FILE_NAME: &str = "hero.save.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveLoadError {
    #[error("no save found at {path}")]
    NotFound { path: PathBuf },
    #[error("save at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum SaveWriteError {
    #[error("refusing to write an invalid game state: {0}")]
    Invalid(#[from] GameStateError),
    #[error("failed to encode save: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write save to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SaveDeleteError {
    #[error("failed to delete save at {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseOutcome {
    Deleted,
    NotFound,
}

/// The single save slot.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(save_dir: &Path) -> Self {
        Self::new(save_dir.join(SAVE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Presence of the slot file is the only "can continue" signal.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<GameState, SaveLoadError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(SaveLoadError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(error) => return Err(self.corrupt(format!("read save: {error}"))),
        };

        let state = format::decode_game_state(&raw).map_err(|reason| self.corrupt(reason))?;
        info!(
            path = %self.path.display(),
            hero = %state.hero.name,
            location = %state.hero.current_location,
            "save_loaded"
        );
        Ok(state)
    }

    /// Loads the slot and additionally requires every inventory entry to name a catalog item.
    pub fn load_with_catalog(&self, catalog: &ItemCatalog) -> Result<GameState, SaveLoadError> {
        let state = self.load()?;
        for (index, item_id) in state.hero.inventory.iter().enumerate() {
            if !catalog.contains(item_id) {
                return Err(self.corrupt(format!(
                    "validation failed at hero.inventory[{index}]: unknown item id '{item_id}'"
                )));
            }
        }
        Ok(state)
    }

    pub fn persist(&self, state: &GameState) -> Result<(), SaveWriteError> {
        state.validate()?;
        let save = format::save_game_from_state(state);
        let json = format::encode_envelope(&save).map_err(SaveWriteError::Encode)?;
        atomic_io::write_text_atomic(&self.path, &json).map_err(|source| {
            SaveWriteError::WriteFailed {
                path: self.path.clone(),
                source,
            }
        })?;
        info!(
            path = %self.path.display(),
            bytes = json.len(),
            location = %state.hero.current_location,
            "save_written"
        );
        Ok(())
    }

    pub fn erase(&self) -> Result<EraseOutcome, SaveDeleteError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "save_deleted");
                Ok(EraseOutcome::Deleted)
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(EraseOutcome::NotFound),
            Err(source) => Err(SaveDeleteError::DeleteFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn corrupt(&self, reason: String) -> SaveLoadError {
        warn!(path = %self.path.display(), reason = %reason, "save_corrupt");
        SaveLoadError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::app::{DirectionalInput, InputAction, Location, MovementController, Vec2};
    use crate::content::ItemCatalog;

    fn store(temp: &TempDir) -> SaveStore {
        SaveStore::in_dir(&temp.path().join("saves"))
    }

    fn visited_state() -> GameState {
        let mut state = GameState::new_game("Aria").expect("state");
        state.hero.current_location = Location::ForestHouse;
        state.hero.last_position = Some(Vec2::new(401.5, 222.0));
        state
            .hero
            .departure_positions
            .insert(Location::MapOverworld, Vec2::new(980.0, 75.5));
        state
            .hero
            .departure_positions
            .insert(Location::FieldVillage, Vec2::new(665.55, 864.0));
        state.hero.inventory = vec!["herb".into(), "herb".into(), "leather_vest".into()];
        state.hero.set_flag("met_elder");
        state.hero.vitals.health = 42;
        state.hero.vitals.gold = 7;
        state.set_world_flag("swamp_gate_open");
        state
    }

    #[test]
    fn persist_then_load_round_trips_every_field() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        assert!(!store.exists());

        let state = visited_state();
        store.persist(&state).expect("persist");
        assert!(store.exists());
        assert_eq!(store.load().expect("load"), state);
        assert!(!atomic_io::temp_path_for(store.path()).exists());
    }

    #[test]
    fn walked_positions_survive_persist_and_load() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        let controller = MovementController::default();
        let outbound = DirectionalInput::from_actions(&[InputAction::MoveRight, InputAction::MoveDown]);
        let homebound = DirectionalInput::from_actions(&[InputAction::MoveLeft, InputAction::MoveUp]);

        let mut state = GameState::new_game("Aria").expect("state");
        state.hero.current_location = Location::FieldVillage;
        state.hero.last_position = Some(Vec2::new(3.0, 0.013));
        for step in 0..600u32 {
            let input = if (step / 150) % 2 == 0 { outbound } else { homebound };
            let dt = 0.0167 + (step % 7) as f32 * 0.00131;
            let position = controller.advance(&mut state.hero, dt, input);
            if step % 50 == 0 {
                state
                    .hero
                    .departure_positions
                    .insert(Location::MapOverworld, position);
            }

            store.persist(&state).expect("persist");
            assert_eq!(store.load().expect("load"), state, "step {step} at {position}");
        }
    }

    #[test]
    fn persist_overwrites_the_single_slot() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        let mut state = visited_state();
        store.persist(&state).expect("first");
        state.hero.current_location = Location::Swamp;
        state.hero.last_position = Some(Vec2::new(10.0, 20.0));
        store.persist(&state).expect("second");
        assert_eq!(store.load().expect("load"), state);
    }

    #[test]
    fn missing_slot_is_not_found() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        assert_eq!(
            store.load(),
            Err(SaveLoadError::NotFound {
                path: store.path().to_path_buf()
            })
        );
    }

    #[test]
    fn erasing_twice_reports_not_found_the_second_time() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        store.persist(&visited_state()).expect("persist");

        assert_eq!(store.erase().expect("first erase"), EraseOutcome::Deleted);
        assert_eq!(store.erase().expect("second erase"), EraseOutcome::NotFound);
        assert!(!store.exists());
    }

    #[test]
    fn corrupt_slot_is_reported_and_left_in_place() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        store.persist(&visited_state()).expect("persist");
        let raw = fs::read_to_string(store.path()).expect("read");
        fs::write(store.path(), &raw[..raw.len() - 10]).expect("truncate");

        assert!(matches!(store.load(), Err(SaveLoadError::Corrupt { .. })));
        assert!(store.exists());
    }

    #[test]
    fn invalid_state_is_never_written() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        let mut state = visited_state();
        state.hero.name = "  ".to_string();

        assert!(matches!(
            store.persist(&state),
            Err(SaveWriteError::Invalid(GameStateError::InvalidHeroName))
        ));
        assert!(!store.exists());
    }

    #[test]
    fn invalid_state_does_not_replace_a_good_save() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        let good = visited_state();
        store.persist(&good).expect("persist");

        let mut bad = good.clone();
        bad.hero.last_position = Some(Vec2::new(f32::NAN, 1.0));
        assert!(store.persist(&bad).is_err());
        assert_eq!(store.load().expect("load"), good);
    }

    #[test]
    fn unknown_inventory_ids_make_the_slot_corrupt() {
        let temp = TempDir::new().expect("tempdir");
        let store = store(&temp);
        store.persist(&visited_state()).expect("persist");

        let catalog = ItemCatalog::from_xml_str(
            Path::new("items.xml"),
            r#"<Items>
                <Consumable><id>herb</id><name>Herb</name><cost>8</cost><salePrice>3</salePrice><healing>15</healing></Consumable>
            </Items>"#,
        )
        .expect("catalog");
        let error = store.load_with_catalog(&catalog).expect_err("unknown id");
        match error {
            SaveLoadError::Corrupt { reason, .. } => {
                assert!(reason.contains("hero.inventory[2]"), "{reason}");
                assert!(reason.contains("leather_vest"), "{reason}");
            }
            other => panic!("expected corrupt, got {other:?}"),
        }
    }
}
