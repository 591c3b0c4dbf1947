use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::hashing::sha256_hex;
use crate::app::{Location, Vec2};
use crate::state::{GameState, HeroState, Vitals};

pub const SAVE_VERSION: u32 = 1;
pub(crate) const SAVE_FORMAT: &str = "emberwake.save";

pub(crate) type SaveLoadResult<T> = Result<T, String>;

/// On-disk wrapper. `checksum_sha256_hex` covers the compact JSON encoding of `payload`;
/// `float_roundtrip` keeps that encoding stable across a parse of the pretty file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SaveEnvelope {
    pub format: String,
    pub save_version: u32,
    pub checksum_sha256_hex: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SaveGame {
    pub hero: SavedHero,
    pub world_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SavedHero {
    pub name: String,
    pub current_location: SavedLocation,
    pub last_position: Option<SavedVec2>,
    #[serde(default)]
    pub departures: Vec<SavedDeparture>,
    pub inventory: Vec<String>,
    pub flags: Vec<String>,
    pub vitals: SavedVitals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SavedLocation {
    MapOverworld,
    FieldVillage,
    ForestHouse,
    Swamp,
    SwampDungeon,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SavedVec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SavedDeparture {
    pub location: SavedLocation,
    pub position: SavedVec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SavedVitals {
    pub health: u32,
    pub max_health: u32,
    pub gold: u32,
}

impl From<Location> for SavedLocation {
    fn from(location: Location) -> Self {
        match location {
            Location::MapOverworld => SavedLocation::MapOverworld,
            Location::FieldVillage => SavedLocation::FieldVillage,
            Location::ForestHouse => SavedLocation::ForestHouse,
            Location::Swamp => SavedLocation::Swamp,
            Location::SwampDungeon => SavedLocation::SwampDungeon,
        }
    }
}

impl From<SavedLocation> for Location {
    fn from(saved: SavedLocation) -> Self {
        match saved {
            SavedLocation::MapOverworld => Location::MapOverworld,
            SavedLocation::FieldVillage => Location::FieldVillage,
            SavedLocation::ForestHouse => Location::ForestHouse,
            SavedLocation::Swamp => Location::Swamp,
            SavedLocation::SwampDungeon => Location::SwampDungeon,
        }
    }
}

impl From<Vec2> for SavedVec2 {
    fn from(value: Vec2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<SavedVec2> for Vec2 {
    fn from(value: SavedVec2) -> Self {
        Vec2::new(value.x, value.y)
    }
}

pub(crate) fn save_game_from_state(state: &GameState) -> SaveGame {
    let hero = &state.hero;
    SaveGame {
        hero: SavedHero {
            name: hero.name.clone(),
            current_location: hero.current_location.into(),
            last_position: hero.last_position.map(SavedVec2::from),
            departures: hero
                .departure_positions
                .iter()
                .map(|(location, position)| SavedDeparture {
                    location: (*location).into(),
                    position: (*position).into(),
                })
                .collect(),
            inventory: hero.inventory.clone(),
            flags: hero.flags.iter().cloned().collect(),
            vitals: SavedVitals {
                health: hero.vitals.health,
                max_health: hero.vitals.max_health,
                gold: hero.vitals.gold,
            },
        },
        world_flags: state.world_flags.iter().cloned().collect(),
    }
}

pub(crate) fn encode_envelope(save: &SaveGame) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_value(save)?;
    let checksum = sha256_hex(serde_json::to_string(&payload)?.as_bytes());
    let envelope = SaveEnvelope {
        format: SAVE_FORMAT.to_string(),
        save_version: SAVE_VERSION,
        checksum_sha256_hex: checksum,
        payload,
    };
    serde_json::to_string_pretty(&envelope)
}

/// Parses, verifies and converts a save file. Any mismatch is reported as a message; nothing
/// partially decoded escapes.
pub(crate) fn decode_game_state(raw: &str) -> SaveLoadResult<GameState> {
    let envelope = parse_json::<SaveEnvelope>(raw, "save envelope")?;
    if envelope.format != SAVE_FORMAT {
        return Err(expected_actual("format", SAVE_FORMAT, &envelope.format));
    }
    if envelope.save_version != SAVE_VERSION {
        return Err(expected_actual(
            "save_version",
            SAVE_VERSION,
            envelope.save_version,
        ));
    }

    let canonical = serde_json::to_string(&envelope.payload)
        .map_err(|error| format!("re-encode payload: {error}"))?;
    let actual_checksum = sha256_hex(canonical.as_bytes());
    if actual_checksum != envelope.checksum_sha256_hex {
        return Err(expected_actual(
            "checksum_sha256_hex",
            &actual_checksum,
            &envelope.checksum_sha256_hex,
        ));
    }

    let save = deserialize_value::<SaveGame>(envelope.payload)?;
    validate_save_game(&save)?;
    game_state_from_save(save)
}

fn parse_json<T: serde::de::DeserializeOwned>(raw: &str, what: &str) -> SaveLoadResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(value) => Ok(value),
        Err(error) => Err(describe_path_error(what, error)),
    }
}

fn deserialize_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> SaveLoadResult<T> {
    serde_path_to_error::deserialize::<_, T>(value)
        .map_err(|error| describe_path_error("payload", error))
}

fn describe_path_error(what: &str, error: serde_path_to_error::Error<serde_json::Error>) -> String {
    let path = error.path().to_string();
    let source = error.into_inner();
    if path.is_empty() || path == "." {
        format!("parse {what}: {source}")
    } else {
        format!("parse {what} at {path}: {source}")
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> String {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

fn validate_save_game(save: &SaveGame) -> SaveLoadResult<()> {
    let hero = &save.hero;
    if hero.name.trim().is_empty() {
        return Err(validation_err("hero.name", "must not be empty"));
    }
    if hero.name.trim() != hero.name {
        return Err(validation_err(
            "hero.name",
            "must not have leading or trailing whitespace",
        ));
    }
    if let Some(position) = hero.last_position {
        validate_vec2("hero.last_position", position)?;
    }

    let mut seen_departures = BTreeMap::new();
    for (index, departure) in hero.departures.iter().enumerate() {
        let path = format!("hero.departures[{index}]");
        if let Some(first_index) = seen_departures.insert(departure.location, index) {
            return Err(validation_err(
                &format!("{path}.location"),
                format!(
                    "duplicate location {} (first seen at hero.departures[{first_index}])",
                    Location::from(departure.location)
                ),
            ));
        }
        validate_vec2(&format!("{path}.position"), departure.position)?;
    }

    for (index, item_id) in hero.inventory.iter().enumerate() {
        if item_id.trim().is_empty() {
            return Err(validation_err(
                &format!("hero.inventory[{index}]"),
                "item id must not be empty",
            ));
        }
    }
    validate_unique_strings("hero.flags", &hero.flags)?;
    validate_unique_strings("world_flags", &save.world_flags)?;

    if hero.vitals.health > hero.vitals.max_health {
        return Err(expected_actual(
            "hero.vitals.health",
            format!("<= {}", hero.vitals.max_health),
            hero.vitals.health,
        ));
    }
    Ok(())
}

fn validate_vec2(path: &str, value: SavedVec2) -> SaveLoadResult<()> {
    if !value.x.is_finite() {
        return Err(expected_actual(&format!("{path}.x"), "finite number", value.x));
    }
    if !value.y.is_finite() {
        return Err(expected_actual(&format!("{path}.y"), "finite number", value.y));
    }
    Ok(())
}

fn validate_unique_strings(path: &str, values: &[String]) -> SaveLoadResult<()> {
    let mut seen = BTreeSet::new();
    for (index, value) in values.iter().enumerate() {
        if !seen.insert(value.as_str()) {
            return Err(validation_err(
                &format!("{path}[{index}]"),
                format!("duplicate entry '{value}'"),
            ));
        }
    }
    Ok(())
}

fn game_state_from_save(save: SaveGame) -> SaveLoadResult<GameState> {
    let saved = save.hero;
    let mut hero = HeroState::new(&saved.name)
        .map_err(|error| validation_err("hero.name", error.to_string()))?;
    hero.current_location = saved.current_location.into();
    hero.last_position = saved.last_position.map(Vec2::from);
    hero.departure_positions = saved
        .departures
        .into_iter()
        .map(|departure| (departure.location.into(), departure.position.into()))
        .collect();
    hero.inventory = saved.inventory;
    hero.flags = saved.flags.into_iter().collect();
    hero.vitals = Vitals {
        health: saved.vitals.health,
        max_health: saved.vitals.max_health,
        gold: saved.vitals.gold,
    };

    let state = GameState {
        hero,
        world_flags: save.world_flags.into_iter().collect(),
    };
    state
        .validate()
        .map_err(|error| validation_err("hero", error.to_string()))?;
    Ok(state)
}
