use std::collections::HashMap;

use super::types::Item;

/// Immutable id -> item lookup. Items are kept in id order.
#[derive(Debug, Default, Clone)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index_by_id: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Callers guarantee id uniqueness; the XML compiler rejects duplicates before this point.
    pub(crate) fn from_items(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| a.id.cmp(&b.id));
        let mut index_by_id = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            index_by_id.insert(item.id.clone(), idx);
        }
        Self { items, index_by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index_by_id
            .get(id)
            .and_then(|index| self.items.get(*index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::{ConsumableData, ItemKind, Pricing};

    fn consumable(id: &str) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_string(),
            info: String::new(),
            kind: ItemKind::Consumable(ConsumableData {
                healing: 5,
                pricing: Pricing::default(),
            }),
        }
    }

    #[test]
    fn lookup_by_id_and_ordering() {
        let catalog = ItemCatalog::from_items(vec![
            consumable("wares.herb"),
            consumable("wares.bread"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].id, "wares.bread");
        assert!(catalog.contains("wares.herb"));
        assert_eq!(
            catalog.get("wares.herb").map(|item| item.id.as_str()),
            Some("wares.herb")
        );
        assert!(catalog.get("wares.missing").is_none());
    }

    #[test]
    fn empty_catalog() {
        let catalog = ItemCatalog::default();
        assert!(catalog.is_empty());
        assert!(!catalog.contains("anything"));
    }
}
