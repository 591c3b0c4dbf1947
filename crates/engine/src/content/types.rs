use std::fmt;

/// Purchase cost and resale price. Every tradeable item carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pricing {
    pub cost: u32,
    pub sale_price: u32,
}

/// Remaining uses of a weapon. Data files write `-1` for `Infinite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Infinite,
    Limited(u32),
}

impl Durability {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(Self::Infinite),
            n if n >= 0 => u32::try_from(n).ok().map(Self::Limited),
            _ => None,
        }
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinite"),
            Self::Limited(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponData {
    pub attack: u32,
    pub durability: Durability,
    pub effect: Option<String>,
    pub pricing: Pricing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GunData {
    pub weapon: WeaponData,
    /// Number of targets reachable at once.
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmorData {
    pub defense: u32,
    pub effect: Option<String>,
    pub pricing: Pricing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumableData {
    pub healing: u32,
    pub pricing: Pricing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Weapon(WeaponData),
    Gun(GunData),
    Armor(ArmorData),
    Consumable(ConsumableData),
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weapon(_) => "weapon",
            Self::Gun(_) => "gun",
            Self::Armor(_) => "armor",
            Self::Consumable(_) => "consumable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub info: String,
    pub kind: ItemKind,
}

/// Anything the economy layer can buy or sell.
pub trait Buyable {
    fn pricing(&self) -> Pricing;

    fn buy_price(&self) -> u32 {
        self.pricing().cost
    }

    fn sell_price(&self) -> u32 {
        self.pricing().sale_price
    }
}

impl Buyable for ItemKind {
    fn pricing(&self) -> Pricing {
        match self {
            Self::Weapon(data) => data.pricing,
            Self::Gun(data) => data.weapon.pricing,
            Self::Armor(data) => data.pricing,
            Self::Consumable(data) => data.pricing,
        }
    }
}

impl Buyable for Item {
    fn pricing(&self) -> Pricing {
        self.kind.pricing()
    }
}

pub fn buy_price(item: &impl Buyable) -> u32 {
    item.buy_price()
}

pub fn sell_price(item: &impl Buyable) -> u32 {
    item.sell_price()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(attack: u32, durability: Durability, cost: u32, sale_price: u32) -> Item {
        Item {
            id: "weapon.test".to_string(),
            name: "Test Blade".to_string(),
            info: String::new(),
            kind: ItemKind::Weapon(WeaponData {
                attack,
                durability,
                effect: None,
                pricing: Pricing { cost, sale_price },
            }),
        }
    }

    #[test]
    fn weapon_prices_ignore_combat_stats() {
        for (attack, durability) in [
            (0, Durability::Infinite),
            (7, Durability::Limited(3)),
            (999, Durability::Limited(0)),
        ] {
            let item = weapon(attack, durability, 50, 20);
            assert_eq!(buy_price(&item), 50);
            assert_eq!(sell_price(&item), 20);
        }
    }

    #[test]
    fn gun_prices_come_from_embedded_weapon_pricing() {
        let gun = ItemKind::Gun(GunData {
            weapon: WeaponData {
                attack: 12,
                durability: Durability::Limited(30),
                effect: Some("burn".to_string()),
                pricing: Pricing {
                    cost: 300,
                    sale_price: 120,
                },
            },
            range: 2.0,
        });
        assert_eq!(gun.buy_price(), 300);
        assert_eq!(gun.sell_price(), 120);
    }

    #[test]
    fn sale_price_above_cost_is_not_rejected() {
        let potion = ItemKind::Consumable(ConsumableData {
            healing: 10,
            pricing: Pricing {
                cost: 5,
                sale_price: 8,
            },
        });
        assert_eq!(sell_price(&potion), 8);
    }

    #[test]
    fn durability_raw_encoding() {
        assert_eq!(Durability::from_raw(-1), Some(Durability::Infinite));
        assert_eq!(Durability::from_raw(4), Some(Durability::Limited(4)));
        assert_eq!(Durability::from_raw(-2), None);
        assert_eq!(Durability::Infinite.to_string(), "infinite");
    }
}
