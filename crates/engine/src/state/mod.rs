use std::collections::BTreeSet;

use thiserror::Error;

mod hero;

pub use hero::{HeroState, ShopError, Vitals, DEFAULT_MAX_HEALTH, DEFAULT_STARTING_GOLD};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    #[error("hero name must not be empty")]
    InvalidHeroName,
    #[error("{field} must be a finite position")]
    NonFinitePosition { field: String },
    #[error("health {health} exceeds max health {max_health}")]
    HealthAboveMax { health: u32, max_health: u32 },
}

/// The persisted aggregate: the hero plus global world flags.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub hero: HeroState,
    pub world_flags: BTreeSet<String>,
}

impl GameState {
    pub fn new_game(hero_name: &str) -> Result<Self, GameStateError> {
        Ok(Self {
            hero: HeroState::new(hero_name)?,
            world_flags: BTreeSet::new(),
        })
    }

    /// Checks the invariants a state must hold before it may be written or after it is read.
    pub fn validate(&self) -> Result<(), GameStateError> {
        let hero = &self.hero;
        if hero.name.trim().is_empty() {
            return Err(GameStateError::InvalidHeroName);
        }
        if let Some(position) = hero.last_position {
            if !position.is_finite() {
                return Err(GameStateError::NonFinitePosition {
                    field: "hero.last_position".to_string(),
                });
            }
        }
        for (location, position) in &hero.departure_positions {
            if !position.is_finite() {
                return Err(GameStateError::NonFinitePosition {
                    field: format!("hero.departure_positions.{location}"),
                });
            }
        }
        if hero.vitals.health > hero.vitals.max_health {
            return Err(GameStateError::HealthAboveMax {
                health: hero.vitals.health,
                max_health: hero.vitals.max_health,
            });
        }
        Ok(())
    }

    pub fn set_world_flag(&mut self, flag: impl Into<String>) -> bool {
        self.world_flags.insert(flag.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Location, Vec2};

    #[test]
    fn new_game_is_valid_and_starts_on_the_overworld() {
        let state = GameState::new_game("  Aria ").expect("new game");
        assert_eq!(state.hero.name, "Aria");
        assert_eq!(state.hero.current_location, Location::MapOverworld);
        assert_eq!(state.hero.last_position, None);
        assert!(state.world_flags.is_empty());
        assert_eq!(state.validate(), Ok(()));
    }

    #[test]
    fn empty_name_is_rejected_at_the_new_game_boundary() {
        assert_eq!(
            GameState::new_game("   ").unwrap_err(),
            GameStateError::InvalidHeroName
        );
    }

    #[test]
    fn validate_rejects_non_finite_positions_and_overfull_health() {
        let mut state = GameState::new_game("Aria").expect("new game");
        state.hero.last_position = Some(Vec2::new(f32::NAN, 0.0));
        assert!(matches!(
            state.validate(),
            Err(GameStateError::NonFinitePosition { .. })
        ));

        state.hero.last_position = Some(Vec2::new(1.0, 2.0));
        state
            .hero
            .departure_positions
            .insert(Location::Swamp, Vec2::new(0.0, f32::INFINITY));
        assert_eq!(
            state.validate(),
            Err(GameStateError::NonFinitePosition {
                field: "hero.departure_positions.swamp".to_string()
            })
        );

        state.hero.departure_positions.clear();
        state.hero.vitals.health = state.hero.vitals.max_health + 1;
        assert!(matches!(
            state.validate(),
            Err(GameStateError::HealthAboveMax { .. })
        ));
    }

    #[test]
    fn world_flags_are_a_set() {
        let mut state = GameState::new_game("Aria").expect("new game");
        assert!(state.set_world_flag("bridge_repaired"));
        assert!(!state.set_world_flag("bridge_repaired"));
        assert_eq!(state.world_flags.len(), 1);
    }
}
