mod catalog;
mod compiler;
mod types;

pub use catalog::ItemCatalog;
pub use compiler::{compile_item_catalog, CatalogError, CatalogErrorCode, SourceLocation};
pub use types::{
    buy_price, sell_price, ArmorData, Buyable, ConsumableData, Durability, GunData, Item,
    ItemKind, Pricing, WeaponData,
};
