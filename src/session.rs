use crate::document::CollectorDocument;
use crate::edit::{Edit, apply_edit};
use crate::table::CollectorTable;
use crate::validate::{ValidationResult, validate};
use crate::OperationError;
use tracing::{debug, warn};

/// One undoable step: the table as it was before `description` was applied.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub description: String,
    pub table: CollectorTable,
}

/// An editing session over one document.
///
/// Edits are applied one at a time; each produces a new table that replaces
/// the document's current one. Rejected edits leave the table unchanged and
/// are only logged.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub document: CollectorDocument,
    pub editing_enabled: bool,
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    validation: ValidationResult,
}

impl EditSession {
    pub fn new(document: CollectorDocument) -> Self {
        let validation = validate(&document.table);
        Self {
            document,
            editing_enabled: true,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            validation,
        }
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Apply `edit`. On failure the error is logged, the table is left as is
    /// and no history is recorded. Edits that change nothing are not recorded
    /// either.
    pub fn apply(&mut self, edit: Edit) -> Result<&ValidationResult, OperationError> {
        if !self.editing_enabled {
            warn!(edit = %edit.describe(), "editing disabled, ignoring edit");
            return Err(OperationError::EditingDisabled);
        }

        let next = match apply_edit(&self.document.table, &edit) {
            Ok(next) => next,
            Err(error) => {
                warn!(%error, edit = %edit.describe(), "edit rejected");
                return Err(error);
            }
        };

        let description = edit.describe();
        if next == self.document.table {
            debug!(edit = %description, "edit changed nothing");
            return Ok(&self.validation);
        }
        debug!(edit = %description, "applied edit");
        let previous = std::mem::replace(&mut self.document.table, next);
        self.undo_stack.push(HistoryEntry {
            description,
            table: previous,
        });
        self.redo_stack.clear();
        self.after_change();
        Ok(&self.validation)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Revert the most recent edit; returns its description.
    pub fn undo(&mut self) -> Option<String> {
        let entry = self.undo_stack.pop()?;
        let current = std::mem::replace(&mut self.document.table, entry.table);
        self.redo_stack.push(HistoryEntry {
            description: entry.description.clone(),
            table: current,
        });
        self.after_change();
        Some(entry.description)
    }

    /// Re-apply the most recently undone edit; returns its description.
    pub fn redo(&mut self) -> Option<String> {
        let entry = self.redo_stack.pop()?;
        let current = std::mem::replace(&mut self.document.table, entry.table);
        self.undo_stack.push(HistoryEntry {
            description: entry.description.clone(),
            table: current,
        });
        self.after_change();
        Some(entry.description)
    }

    /// Descriptions of undoable edits, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().map(|e| e.description.as_str())
    }

    fn after_change(&mut self) {
        self.document.refresh_dirty();
        self.validation = validate(&self.document.table);
    }
}

#[cfg(test)]
mod tests {
    use super::EditSession;
    use crate::document::CollectorDocument;
    use crate::edit::{Edit, EntryRef, Redistribution};
    use crate::table::Category;
    use crate::OperationError;

    const TEXT: &str = "Collecting_Item\n{\n\tII_A\t2000\n\tII_B\t8000\n}\n";

    fn session() -> EditSession {
        EditSession::new(CollectorDocument::from_text(TEXT))
    }

    #[test]
    fn edits_revalidate_and_undo_restores() {
        let mut s = session();
        assert!(!s.validation().check(Category::Items).unwrap().valid);

        let result = s
            .apply(Edit::Redistribute {
                category: Category::Items,
                mode: Redistribution::Proportional,
            })
            .unwrap();
        assert!(result.check(Category::Items).unwrap().valid);
        assert!(s.document.dirty);
        assert_eq!(s.history().count(), 1);

        assert!(s.undo().is_some());
        assert!(!s.document.dirty);
        assert_eq!(s.document.table.items_total(), 10_000);
        assert!(!s.validation().check(Category::Items).unwrap().valid);

        assert!(s.redo().is_some());
        assert_eq!(s.document.table.items_total(), 1_000_000);
        assert!(!s.can_redo());
    }

    #[test]
    fn rejected_edit_keeps_table_and_history() {
        let mut s = session();
        let err = s
            .apply(Edit::Remove {
                category: Category::Items,
                target: EntryRef::Index(9),
            })
            .unwrap_err();
        assert!(matches!(err, OperationError::IndexOutOfRange { .. }));
        assert_eq!(s.document.table.items.len(), 2);
        assert!(!s.can_undo());
    }

    #[test]
    fn disabled_session_ignores_edits() {
        let mut s = session();
        s.editing_enabled = false;
        let err = s
            .apply(Edit::Redistribute {
                category: Category::Items,
                mode: Redistribution::Reset,
            })
            .unwrap_err();
        assert_eq!(err, OperationError::EditingDisabled);
        assert_eq!(s.document.table.items_total(), 10_000);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut s = session();
        s.apply(Edit::Duplicate {
            category: Category::Items,
            index: 0,
        })
        .unwrap();
        s.undo();
        assert!(s.can_redo());
        s.apply(Edit::AddEnchant { chance: 1000 }).unwrap();
        assert!(!s.can_redo());
        assert_eq!(s.document.table.enchant.len(), 1);
    }
}
