use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::state::HeroState;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Extent of a region in world units; the origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSize {
    pub width: f32,
    pub height: f32,
}

/// Visible part of the overworld. Only used to derive the overworld's centered entry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    MapOverworld,
    FieldVillage,
    ForestHouse,
    Swamp,
    SwampDungeon,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::MapOverworld,
        Location::FieldVillage,
        Location::ForestHouse,
        Location::Swamp,
        Location::SwampDungeon,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Location::MapOverworld => "map_overworld",
            Location::FieldVillage => "field_village",
            Location::ForestHouse => "forest_house",
            Location::Swamp => "swamp",
            Location::SwampDungeon => "swamp_dungeon",
        }
    }

    /// Fixed entry point used when no saved position applies.
    ///
    /// The overworld value is the centered point for the default viewport; the state machine
    /// recomputes it from the configured viewport.
    pub fn default_entry(self) -> Vec2 {
        match self {
            Location::MapOverworld => Vec2::new(616.0, 336.0),
            Location::FieldVillage => Vec2::new(665.55, 864.0),
            Location::ForestHouse => Vec2::new(380.0, 470.0),
            Location::Swamp => Vec2::new(96.0, 512.0),
            Location::SwampDungeon => Vec2::new(600.0, 860.0),
        }
    }

    pub fn region_size(self) -> RegionSize {
        let (width, height) = match self {
            Location::MapOverworld => (2560.0, 1440.0),
            Location::FieldVillage => (1600.0, 1200.0),
            Location::ForestHouse => (800.0, 600.0),
            Location::Swamp => (1920.0, 1080.0),
            Location::SwampDungeon => (1280.0, 960.0),
        };
        RegionSize { width, height }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown location '{0}'; expected one of map_overworld, field_village, forest_house, swamp, swamp_dungeon")]
pub struct UnknownLocation(pub String);

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lower = raw.trim().to_ascii_lowercase();
        Location::ALL
            .into_iter()
            .find(|location| location.tag() == lower)
            .ok_or_else(|| UnknownLocation(raw.to_string()))
    }
}

/// What caused a transition. Carried through for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionContext {
    NewGame,
    Continue,
    PlayerAction,
    Console,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPlan {
    pub from: Option<Location>,
    pub to: Location,
    pub entry: Vec2,
    pub context: TransitionContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    #[error("unknown destination '{tag}'")]
    UnknownDestination { tag: String },
    #[error("transition source {requested:?} does not match active location {active:?}")]
    SourceMismatch {
        active: Option<Location>,
        requested: Option<Location>,
    },
    #[error("{location} is already the active location")]
    SameLocation { location: Location },
    #[error("a transition to {destination} is already in flight")]
    InFlight { destination: Location },
}

impl From<UnknownLocation> for TransitionRejected {
    fn from(error: UnknownLocation) -> Self {
        TransitionRejected::UnknownDestination { tag: error.0 }
    }
}

/// Tracks the single active location and resolves entry coordinates for each transition.
#[derive(Debug, Clone)]
pub struct LocationStateMachine {
    active: Option<Location>,
    viewport: Viewport,
    sprite_size: Vec2,
}

impl LocationStateMachine {
    pub fn new(viewport: Viewport, sprite_size: Vec2) -> Self {
        Self {
            active: None,
            viewport,
            sprite_size,
        }
    }

    pub fn active(&self) -> Option<Location> {
        self.active
    }

    /// Back to the "nothing shown yet" state, e.g. after the save is erased.
    pub fn reset(&mut self) {
        self.active = None;
    }

    pub fn overworld_center(&self) -> Vec2 {
        Vec2 {
            x: ((self.viewport.width - self.sprite_size.x) / 2.0).max(0.0),
            y: ((self.viewport.height - self.sprite_size.y) / 2.0).max(0.0),
        }
    }

    pub fn resolve_entry(&self, to: Location, hero: &HeroState) -> Vec2 {
        if to == Location::MapOverworld {
            if hero.current_location == Location::MapOverworld {
                if let Some(position) = hero.last_position {
                    return position;
                }
            }
            return hero
                .departure_positions
                .get(&Location::MapOverworld)
                .copied()
                .unwrap_or_else(|| self.overworld_center());
        }

        match hero.last_position {
            Some(position) if hero.current_location == to => position,
            _ => to.default_entry(),
        }
    }

    /// Validates and commits a transition. On success the hero is moved to `to` at the
    /// resolved entry point and `to` becomes the active location.
    ///
    /// A `from` that disagrees with the active location is a caller bug: it is logged,
    /// rejected, and fatal in debug builds.
    pub fn request_transition(
        &mut self,
        from: Option<Location>,
        to: Location,
        context: TransitionContext,
        hero: &mut HeroState,
    ) -> Result<TransitionPlan, TransitionRejected> {
        if from != self.active {
            error!(
                active = ?self.active,
                requested = ?from,
                destination = %to,
                "transition_source_mismatch"
            );
            debug_assert!(
                false,
                "transition source {from:?} does not match active location {:?}",
                self.active
            );
            return Err(TransitionRejected::SourceMismatch {
                active: self.active,
                requested: from,
            });
        }
        if from == Some(to) {
            return Err(TransitionRejected::SameLocation { location: to });
        }

        let entry = self.resolve_entry(to, hero);
        if let (Some(from), Some(position)) = (from, hero.last_position) {
            hero.departure_positions.insert(from, position);
        }
        hero.current_location = to;
        hero.last_position = Some(entry);
        self.active = Some(to);

        debug!(
            from = ?from,
            to = %to,
            context = ?context,
            entry = %entry,
            "transition_committed"
        );
        info!(to = %to, "location_changed");

        Ok(TransitionPlan {
            from,
            to,
            entry,
            context,
        })
    }

    pub fn request_transition_by_tag(
        &mut self,
        from: Option<Location>,
        tag: &str,
        context: TransitionContext,
        hero: &mut HeroState,
    ) -> Result<TransitionPlan, TransitionRejected> {
        let to = tag.parse::<Location>()?;
        self.request_transition(from, to, context, hero)
    }
}
