use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::GameStateError;
use crate::app::{Location, Vec2};
use crate::content::{Buyable, Item};

pub const DEFAULT_MAX_HEALTH: u32 = 100;
pub const DEFAULT_STARTING_GOLD: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitals {
    pub health: u32,
    pub max_health: u32,
    pub gold: u32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            gold: DEFAULT_STARTING_GOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("'{item_id}' costs {cost} gold but only {gold} is available")]
    InsufficientGold {
        item_id: String,
        cost: u32,
        gold: u32,
    },
    #[error("'{item_id}' is not in the inventory")]
    NotInInventory { item_id: String },
}

/// The protagonist's session record.
///
/// `last_position` is relative to `current_location`. `departure_positions` holds where the
/// hero stood when it last left each location; only the overworld entry reads it today.
#[derive(Debug, Clone, PartialEq)]
pub struct HeroState {
    pub name: String,
    pub current_location: Location,
    pub last_position: Option<Vec2>,
    pub departure_positions: BTreeMap<Location, Vec2>,
    pub inventory: Vec<String>,
    pub flags: BTreeSet<String>,
    pub vitals: Vitals,
}

impl HeroState {
    pub fn new(name: &str) -> Result<Self, GameStateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameStateError::InvalidHeroName);
        }
        Ok(Self {
            name: name.to_string(),
            current_location: Location::MapOverworld,
            last_position: None,
            departure_positions: BTreeMap::new(),
            inventory: Vec::new(),
            flags: BTreeSet::new(),
            vitals: Vitals::default(),
        })
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) -> bool {
        self.flags.insert(flag.into())
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn count_of(&self, item_id: &str) -> usize {
        self.inventory.iter().filter(|id| *id == item_id).count()
    }

    /// Pays the item's buy price and appends it to the inventory. Returns the remaining gold.
    pub fn purchase(&mut self, item: &Item) -> Result<u32, ShopError> {
        let cost = item.buy_price();
        if self.vitals.gold < cost {
            return Err(ShopError::InsufficientGold {
                item_id: item.id.clone(),
                cost,
                gold: self.vitals.gold,
            });
        }
        self.vitals.gold -= cost;
        self.inventory.push(item.id.clone());
        Ok(self.vitals.gold)
    }

    /// Removes the first copy of the item and credits its sale price. Returns the new gold total.
    pub fn sell(&mut self, item: &Item) -> Result<u32, ShopError> {
        let index = self
            .inventory
            .iter()
            .position(|id| *id == item.id)
            .ok_or_else(|| ShopError::NotInInventory {
                item_id: item.id.clone(),
            })?;
        self.inventory.remove(index);
        self.vitals.gold = self.vitals.gold.saturating_add(item.sell_price());
        Ok(self.vitals.gold)
    }
}
