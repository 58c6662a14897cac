use crate::table::{Category, CollectorTable};
use indexmap::IndexMap;
use serde::Serialize;

/// Total check for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionCheck {
    pub valid: bool,
    pub total: u64,
    pub expected: u64,
    pub mismatch: bool,
}

/// Advisory result of checking every collection total against its target.
/// Never blocks saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub per_collection: IndexMap<Category, CollectionCheck>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn check(&self, category: Category) -> Option<&CollectionCheck> {
        self.per_collection.get(&category)
    }
}

pub fn validate(table: &CollectorTable) -> ValidationResult {
    let mut per_collection = IndexMap::new();
    let mut errors = Vec::new();

    for category in Category::ALL {
        let total = table.total(category);
        let expected = category.target();
        let mismatch = total != expected;
        if mismatch {
            errors.push(format!(
                "{} total ({total}) does not match expected value ({expected})",
                category.display_name()
            ));
        }
        per_collection.insert(
            category,
            CollectionCheck {
                valid: !mismatch,
                total,
                expected,
                mismatch,
            },
        );
    }

    ValidationResult {
        per_collection,
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::table::{Category, CollectorTable, EnchantEntry, ProbabilityEntry};

    fn balanced() -> CollectorTable {
        CollectorTable {
            enchant: vec![
                EnchantEntry { level: 0, chance: 600 },
                EnchantEntry { level: 1, chance: 400 },
            ],
            items: vec![ProbabilityEntry::new("II_A", 1_000_000)],
            premium_items: vec![ProbabilityEntry::new("II_B", 1_000_000)],
            premium_status_items: vec![
                ProbabilityEntry::new("II_C", 999_999),
                ProbabilityEntry::new("II_D", 1),
            ],
        }
    }

    #[test]
    fn balanced_table_is_valid() {
        let result = validate(&balanced());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.per_collection.len(), 4);
        assert!(result.per_collection.values().all(|c| c.valid && !c.mismatch));
    }

    #[test]
    fn each_mismatch_gets_one_message_in_order() {
        let mut table = balanced();
        table.enchant[0].chance = 0;
        table.premium_items[0].probability = 5;

        let result = validate(&table);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Enchant total (400) does not match expected value (1000)".to_string(),
                "Premium items total (5) does not match expected value (1000000)".to_string(),
            ]
        );
        let enchant = result.check(Category::Enchant).unwrap();
        assert_eq!((enchant.total, enchant.expected), (400, 1000));
        assert!(result.check(Category::Items).unwrap().valid);
    }

    #[test]
    fn empty_table_is_invalid_everywhere() {
        let result = validate(&CollectorTable::default());
        assert_eq!(result.errors.len(), 4);
        let order: Vec<Category> = result.per_collection.keys().copied().collect();
        assert_eq!(order, Category::ALL.to_vec());
    }
}
