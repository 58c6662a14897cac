use crate::statics;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use std::fmt;

/// The four `Collecting_*` blocks of a collector file, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Enchant,
    Items,
    PremiumItems,
    PremiumStatusItems,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Enchant,
        Category::Items,
        Category::PremiumItems,
        Category::PremiumStatusItems,
    ];

    /// Required sum of the collection's weights.
    pub fn target(self) -> u64 {
        match self {
            Category::Enchant => statics::ENCHANT_TARGET,
            _ => statics::ITEM_TARGET,
        }
    }

    pub fn is_item_collection(self) -> bool {
        !matches!(self, Category::Enchant)
    }

    pub fn header(self) -> &'static str {
        match self {
            Category::Enchant => statics::HDR_ENCHANT,
            Category::Items => statics::HDR_ITEM,
            Category::PremiumItems => statics::HDR_PREMIUM_ITEM,
            Category::PremiumStatusItems => statics::HDR_PREMIUM_STATUS_ITEM,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Enchant => statics::EN_SECTION_ENCHANT,
            Category::Items => statics::EN_SECTION_ITEMS,
            Category::PremiumItems => statics::EN_SECTION_PREMIUM_ITEMS,
            Category::PremiumStatusItems => statics::EN_SECTION_PREMIUM_STATUS_ITEMS,
        }
    }

    /// Share of the target represented by `value`, in percent.
    pub fn percentage(self, value: u64) -> f64 {
        value as f64 / self.target() as f64 * 100.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Success weight (out of 1000) for one enchantment level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnchantEntry {
    pub level: u32,
    pub chance: u32,
}

/// Weight (out of 1,000,000) of one item in a weighted loot draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityEntry {
    pub item_id: String,
    pub probability: u32,
}

impl ProbabilityEntry {
    pub fn new(item_id: impl Into<String>, probability: u32) -> Self {
        Self {
            item_id: item_id.into(),
            probability,
        }
    }
}

/// Anything that contributes a weight to a collection total.
pub trait Weighted: Clone {
    fn weight(&self) -> u32;
    fn set_weight(&mut self, weight: u32);
}

impl Weighted for EnchantEntry {
    fn weight(&self) -> u32 {
        self.chance
    }

    fn set_weight(&mut self, weight: u32) {
        self.chance = weight;
    }
}

impl Weighted for ProbabilityEntry {
    fn weight(&self) -> u32 {
        self.probability
    }

    fn set_weight(&mut self, weight: u32) {
        self.probability = weight;
    }
}

pub fn sum_weights<T: Weighted>(entries: &[T]) -> u64 {
    entries.iter().map(|e| u64::from(e.weight())).sum()
}

/// Parsed contents of a collector file.
///
/// Totals are never stored: every accessor sums the collection it describes,
/// so they cannot drift from the entries after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorTable {
    pub enchant: Vec<EnchantEntry>,
    pub items: Vec<ProbabilityEntry>,
    pub premium_items: Vec<ProbabilityEntry>,
    pub premium_status_items: Vec<ProbabilityEntry>,
}

impl CollectorTable {
    pub fn enchant_total(&self) -> u64 {
        sum_weights(&self.enchant)
    }

    pub fn items_total(&self) -> u64 {
        sum_weights(&self.items)
    }

    pub fn premium_items_total(&self) -> u64 {
        sum_weights(&self.premium_items)
    }

    pub fn premium_status_items_total(&self) -> u64 {
        sum_weights(&self.premium_status_items)
    }

    pub fn total(&self, category: Category) -> u64 {
        match category {
            Category::Enchant => self.enchant_total(),
            Category::Items => self.items_total(),
            Category::PremiumItems => self.premium_items_total(),
            Category::PremiumStatusItems => self.premium_status_items_total(),
        }
    }

    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Enchant => self.enchant.len(),
            _ => self.item_entries(category).map_or(0, <[_]>::len),
        }
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.len(category) == 0
    }

    /// Item entries of a probability collection; `None` for the enchant section.
    pub fn item_entries(&self, category: Category) -> Option<&[ProbabilityEntry]> {
        match category {
            Category::Enchant => None,
            Category::Items => Some(&self.items),
            Category::PremiumItems => Some(&self.premium_items),
            Category::PremiumStatusItems => Some(&self.premium_status_items),
        }
    }

    pub(crate) fn item_entries_mut(
        &mut self,
        category: Category,
    ) -> Option<&mut Vec<ProbabilityEntry>> {
        match category {
            Category::Enchant => None,
            Category::Items => Some(&mut self.items),
            Category::PremiumItems => Some(&mut self.premium_items),
            Category::PremiumStatusItems => Some(&mut self.premium_status_items),
        }
    }

    /// Whether two tables hold the same entries for `category`.
    pub fn same_collection(&self, other: &CollectorTable, category: Category) -> bool {
        match category {
            Category::Enchant => self.enchant == other.enchant,
            _ => self.item_entries(category) == other.item_entries(category),
        }
    }

    /// Level for a newly appended enchant entry: one past the highest level.
    pub fn next_enchant_level(&self) -> u32 {
        self.enchant
            .iter()
            .map(|e| e.level)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }
}

/// Serialized with each collection followed by its computed total.
impl Serialize for CollectorTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CollectorTable", 8)?;
        state.serialize_field("enchant", &self.enchant)?;
        state.serialize_field("enchantTotal", &self.enchant_total())?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("itemsTotal", &self.items_total())?;
        state.serialize_field("premiumItems", &self.premium_items)?;
        state.serialize_field("premiumItemsTotal", &self.premium_items_total())?;
        state.serialize_field("premiumStatusItems", &self.premium_status_items)?;
        state.serialize_field(
            "premiumStatusItemsTotal",
            &self.premium_status_items_total(),
        )?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CollectorTable, EnchantEntry, ProbabilityEntry};

    #[test]
    fn totals_follow_entries() {
        let mut table = CollectorTable::default();
        table.items.push(ProbabilityEntry::new("II_A", 2000));
        table.items.push(ProbabilityEntry::new("II_B", 8000));
        assert_eq!(table.items_total(), 10_000);

        table.items.remove(0);
        assert_eq!(table.total(Category::Items), 8000);
        assert_eq!(table.total(Category::PremiumItems), 0);
    }

    #[test]
    fn next_enchant_level_is_one_past_max() {
        let mut table = CollectorTable::default();
        assert_eq!(table.next_enchant_level(), 0);

        table.enchant.push(EnchantEntry { level: 4, chance: 1 });
        table.enchant.push(EnchantEntry { level: 2, chance: 1 });
        assert_eq!(table.next_enchant_level(), 5);
    }

    #[test]
    fn percentage_uses_category_target() {
        assert_eq!(Category::Items.percentage(500_000), 50.0);
        assert_eq!(Category::Enchant.percentage(250), 25.0);
    }

    #[test]
    fn enchant_has_no_item_entries() {
        let table = CollectorTable::default();
        assert!(table.item_entries(Category::Enchant).is_none());
        assert!(table.is_empty(Category::Enchant));
        assert!(!Category::Enchant.is_item_collection());
        assert!(Category::PremiumStatusItems.is_item_collection());
    }

    #[test]
    fn json_carries_computed_totals() {
        let table = CollectorTable {
            enchant: vec![EnchantEntry { level: 3, chance: 250 }],
            items: vec![
                ProbabilityEntry::new("II_A", 2000),
                ProbabilityEntry::new("II_B", 8000),
            ],
            ..Default::default()
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["enchantTotal"], 250);
        assert_eq!(json["itemsTotal"], 10_000);
        assert_eq!(json["premiumItemsTotal"], 0);
        assert_eq!(json["premiumStatusItemsTotal"], 0);
        assert_eq!(json["items"][1]["itemId"], "II_B");
        assert_eq!(json["enchant"][0]["level"], 3);
    }
}
