//! Editing operations. Every edit takes the current table and produces a new
//! one; the input table is never modified.

use crate::OperationError;
use crate::statics;
use crate::table::{Category, CollectorTable, EnchantEntry, ProbabilityEntry, Weighted, sum_weights};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// How `Edit::Redistribute` spreads a collection's target over its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Redistribution {
    /// Same weight everywhere; leading entries absorb the remainder.
    Equal,
    /// Scale existing weights; the last entry absorbs the rounding residual.
    Proportional,
    /// Zero every weight.
    Reset,
}

/// Selects an entry for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRef {
    Index(usize),
    /// First entry with this item id (item collections only).
    ItemId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    AddItem {
        category: Category,
        entry: ProbabilityEntry,
    },
    /// Append an enchant entry one level past the current maximum.
    AddEnchant {
        chance: u32,
    },
    Remove {
        category: Category,
        target: EntryRef,
    },
    /// Insert a zero-weight copy right after `index`.
    Duplicate {
        category: Category,
        index: usize,
    },
    Move {
        category: Category,
        from: usize,
        to: usize,
    },
    SetValue {
        category: Category,
        index: usize,
        value: u32,
    },
    SetLevel {
        index: usize,
        level: u32,
    },
    SetItemId {
        category: Category,
        index: usize,
        item_id: String,
    },
    Redistribute {
        category: Category,
        mode: Redistribution,
    },
}

impl Edit {
    pub fn category(&self) -> Category {
        match self {
            Edit::AddEnchant { .. } | Edit::SetLevel { .. } => Category::Enchant,
            Edit::AddItem { category, .. }
            | Edit::Remove { category, .. }
            | Edit::Duplicate { category, .. }
            | Edit::Move { category, .. }
            | Edit::SetValue { category, .. }
            | Edit::SetItemId { category, .. }
            | Edit::Redistribute { category, .. } => *category,
        }
    }

    /// Short human-readable description, used for undo history.
    pub fn describe(&self) -> String {
        let section = self.category().display_name();
        match self {
            Edit::AddItem { entry, .. } => format!("{section}: add {}", entry.item_id),
            Edit::AddEnchant { chance } => format!("{section}: add level (chance {chance})"),
            Edit::Remove {
                target: EntryRef::Index(i),
                ..
            } => format!("{section}: remove #{i}"),
            Edit::Remove {
                target: EntryRef::ItemId(id),
                ..
            } => format!("{section}: remove {id}"),
            Edit::Duplicate { index, .. } => format!("{section}: duplicate #{index}"),
            Edit::Move { from, to, .. } => format!("{section}: move #{from} -> #{to}"),
            Edit::SetValue { index, value, .. } => format!("{section}: #{index} = {value}"),
            Edit::SetLevel { index, level } => format!("{section}: #{index} level = {level}"),
            Edit::SetItemId { index, item_id, .. } => {
                format!("{section}: #{index} id = {item_id}")
            }
            Edit::Redistribute { mode, .. } => format!("{section}: redistribute ({mode})"),
        }
    }
}

/// Run `$body` with `$entries` bound to the collection's `&mut Vec<_>`.
macro_rules! with_entries {
    ($table:expr, $category:expr, |$entries:ident| $body:expr) => {
        match $category {
            Category::Enchant => {
                let $entries = &mut $table.enchant;
                $body
            }
            Category::Items => {
                let $entries = &mut $table.items;
                $body
            }
            Category::PremiumItems => {
                let $entries = &mut $table.premium_items;
                $body
            }
            Category::PremiumStatusItems => {
                let $entries = &mut $table.premium_status_items;
                $body
            }
        }
    };
}

/// Apply one edit, returning the new table or why the edit was rejected.
pub fn apply_edit(table: &CollectorTable, edit: &Edit) -> Result<CollectorTable, OperationError> {
    let mut next = table.clone();

    match edit {
        Edit::AddItem { category, entry } => {
            check_item_id(&entry.item_id)?;
            item_collection(&mut next, *category)?.push(entry.clone());
        }
        Edit::AddEnchant { chance } => {
            let level = next.next_enchant_level();
            next.enchant.push(EnchantEntry {
                level,
                chance: *chance,
            });
        }
        Edit::Remove {
            category,
            target: EntryRef::Index(index),
        } => {
            with_entries!(next, *category, |entries| {
                check_index(*category, *index, entries.len())?;
                entries.remove(*index);
            });
        }
        Edit::Remove {
            category,
            target: EntryRef::ItemId(item_id),
        } => {
            let entries = item_collection(&mut next, *category)?;
            let Some(index) = entries.iter().position(|e| &e.item_id == item_id) else {
                return Err(OperationError::UnknownItemId {
                    category: *category,
                    item_id: item_id.clone(),
                });
            };
            entries.remove(index);
        }
        Edit::Duplicate { category, index } => {
            with_entries!(next, *category, |entries| {
                check_index(*category, *index, entries.len())?;
                duplicate_entry(entries, *index);
            });
        }
        Edit::Move { category, from, to } => {
            with_entries!(next, *category, |entries| {
                check_index(*category, *from, entries.len())?;
                check_index(*category, *to, entries.len())?;
                move_entry(entries, *from, *to);
            });
        }
        Edit::SetValue {
            category,
            index,
            value,
        } => {
            with_entries!(next, *category, |entries| {
                check_index(*category, *index, entries.len())?;
                entries[*index].set_weight(*value);
            });
        }
        Edit::SetLevel { index, level } => {
            check_index(Category::Enchant, *index, next.enchant.len())?;
            next.enchant[*index].level = *level;
        }
        Edit::SetItemId {
            category,
            index,
            item_id,
        } => {
            check_item_id(item_id)?;
            let entries = item_collection(&mut next, *category)?;
            check_index(*category, *index, entries.len())?;
            entries[*index].item_id = item_id.clone();
        }
        Edit::Redistribute { category, mode } => {
            let target = category.target();
            with_entries!(next, *category, |entries| redistribute(
                entries, target, *mode
            ));
        }
    }

    Ok(next)
}

fn item_collection(
    table: &mut CollectorTable,
    category: Category,
) -> Result<&mut Vec<ProbabilityEntry>, OperationError> {
    table
        .item_entries_mut(category)
        .ok_or(OperationError::NotAnItemCollection(category))
}

fn check_index(category: Category, index: usize, len: usize) -> Result<(), OperationError> {
    if index < len {
        Ok(())
    } else {
        Err(OperationError::IndexOutOfRange {
            category,
            index,
            len,
        })
    }
}

/// Ids must survive a save/reload: non-empty, carry the `II_` marker, and
/// contain nothing the line parser would split on.
fn check_item_id(item_id: &str) -> Result<(), OperationError> {
    if item_id.trim().is_empty() {
        return Err(OperationError::EmptyItemId);
    }
    if !item_id.contains(statics::ITEM_ID_PREFIX)
        || item_id.contains(statics::COMMENT_MARKER)
        || item_id.chars().any(char::is_whitespace)
    {
        return Err(OperationError::InvalidItemId(item_id.to_string()));
    }
    Ok(())
}

pub fn duplicate_entry<T: Weighted>(entries: &mut Vec<T>, index: usize) {
    let mut copy = entries[index].clone();
    copy.set_weight(0);
    entries.insert(index + 1, copy);
}

pub fn move_entry<T>(entries: &mut Vec<T>, from: usize, to: usize) {
    let entry = entries.remove(from);
    entries.insert(to, entry);
}

/// Spread `target` over `entries` according to `mode`.
///
/// `Equal` on an empty collection and `Proportional` on a zero total leave
/// the entries untouched.
pub fn redistribute<T: Weighted>(entries: &mut [T], target: u64, mode: Redistribution) {
    match mode {
        Redistribution::Reset => entries.iter_mut().for_each(|e| e.set_weight(0)),
        Redistribution::Equal => {
            if entries.is_empty() {
                return;
            }
            let n = entries.len() as u64;
            let base = target / n;
            let remainder = target % n;
            for (i, entry) in entries.iter_mut().enumerate() {
                let extra = u64::from((i as u64) < remainder);
                entry.set_weight(to_weight(base + extra));
            }
        }
        Redistribution::Proportional => {
            let current = sum_weights(entries);
            if current == 0 {
                return;
            }
            let Some((last, rest)) = entries.split_last_mut() else {
                return;
            };
            let mut assigned = 0u64;
            for entry in rest {
                let scaled = u64::from(entry.weight()) * target / current;
                assigned += scaled;
                entry.set_weight(to_weight(scaled));
            }
            last.set_weight(to_weight(target.saturating_sub(assigned)));
        }
    }
}

fn to_weight(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl fmt::Display for Redistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Redistribution::Equal => "equal",
            Redistribution::Proportional => "proportional",
            Redistribution::Reset => "reset",
        })
    }
}

impl FromStr for Redistribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal" => Ok(Redistribution::Equal),
            "proportional" => Ok(Redistribution::Proportional),
            "reset" => Ok(Redistribution::Reset),
            other => Err(format!(
                "unknown mode `{other}` (expected equal, proportional or reset)"
            )),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        let key = key.strip_prefix("collecting").unwrap_or(&key);
        match key {
            "enchant" => Ok(Category::Enchant),
            "item" | "items" => Ok(Category::Items),
            "premiumitem" | "premiumitems" | "premium" => Ok(Category::PremiumItems),
            "premiumstatusitem" | "premiumstatusitems" | "status" => {
                Ok(Category::PremiumStatusItems)
            }
            _ => Err(format!(
                "unknown section `{s}` (expected enchant, items, premium-items or premium-status-items)"
            )),
        }
    }
}
