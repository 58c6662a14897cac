use pretty_assertions::assert_eq;

use collector::{
    Category, CollectorDocument, CollectorTable, Edit, EditSession, EntryRef, OperationError,
    ProbabilityEntry, Redistribution, Weighted,
};

const SAMPLE: &str = "Collecting_Enchant\n{\n\t100\t\t// 0\n\t200\t\t// 1\n}\n\nCollecting_Item // Sum = 1000000\n{\n\tII_A\t500\n\tII_B\t1500\n\tII_C\t8000\n}\n\nCollecting_PremiumItem\n{\n}\n\nCollecting_PremiumStatusItem\n{\n\tII_S\t\t7\n}\n";

fn assert_totals_consistent(table: &CollectorTable) {
    fn sum<T: Weighted>(entries: &[T]) -> u64 {
        entries.iter().map(|e| u64::from(e.weight())).sum()
    }
    assert_eq!(table.enchant_total(), sum(&table.enchant));
    assert_eq!(table.items_total(), sum(&table.items));
    assert_eq!(table.premium_items_total(), sum(&table.premium_items));
    assert_eq!(
        table.premium_status_items_total(),
        sum(&table.premium_status_items)
    );
}

fn session() -> EditSession {
    EditSession::new(CollectorDocument::from_text(SAMPLE))
}

#[test]
fn totals_hold_after_every_edit() {
    let mut s = session();
    let edits = vec![
        Edit::AddItem {
            category: Category::PremiumItems,
            entry: ProbabilityEntry::new("II_P", 10),
        },
        Edit::Duplicate {
            category: Category::Items,
            index: 2,
        },
        Edit::SetValue {
            category: Category::Items,
            index: 3,
            value: 42,
        },
        Edit::Move {
            category: Category::Items,
            from: 3,
            to: 0,
        },
        Edit::Remove {
            category: Category::Items,
            target: EntryRef::ItemId("II_B".to_string()),
        },
        Edit::AddEnchant { chance: 700 },
        Edit::SetLevel { index: 2, level: 12 },
        Edit::Redistribute {
            category: Category::PremiumStatusItems,
            mode: Redistribution::Equal,
        },
        Edit::Remove {
            category: Category::Enchant,
            target: EntryRef::Index(99),
        },
    ];

    let mut rejected = Vec::new();
    for (i, edit) in edits.into_iter().enumerate() {
        if let Err(error) = s.apply(edit) {
            rejected.push((i, error));
        }
        assert_totals_consistent(&s.document.table);
        let validation = s.validation();
        for category in Category::ALL {
            let check = validation.check(category).expect("checked");
            assert_eq!(check.total, s.document.table.total(category));
        }
    }

    assert_eq!(
        rejected,
        vec![(
            8,
            OperationError::IndexOutOfRange {
                category: Category::Enchant,
                index: 99,
                len: 3
            }
        )]
    );
    assert_eq!(s.document.table.items_total(), 42 + 500 + 8000);
    assert_eq!(s.document.table.enchant_total(), 1000);
    assert!(s.validation().check(Category::Enchant).expect("enchant").valid);
    assert_eq!(s.history().count(), 8);
}

#[test]
fn equal_redistribution_is_exact_and_saves() {
    let mut s = session();
    s.apply(Edit::Redistribute {
        category: Category::Items,
        mode: Redistribution::Equal,
    })
    .expect("redistribute");

    let values: Vec<u32> = s.document.table.items.iter().map(|e| e.probability).collect();
    assert_eq!(values, vec![333_334, 333_333, 333_333]);
    assert!(s.validation().check(Category::Items).expect("items").valid);

    let text = String::from_utf8(s.document.save_bytes().expect("bytes")).expect("utf8");
    let reparsed = collector::parse_collector_strict(&text).expect("reparse");
    assert_eq!(reparsed.items, s.document.table.items);
    // Other sections untouched.
    assert!(text.starts_with("Collecting_Enchant\n{\n\t100\t\t// 0\n\t200\t\t// 1\n}\n"));
    assert!(text.ends_with("Collecting_PremiumStatusItem\n{\n\tII_S\t\t7\n}\n"));
}

#[test]
fn reset_always_reports_invalid() {
    let mut s = session();
    for category in Category::ALL {
        let validation = s
            .apply(Edit::Redistribute {
                category,
                mode: Redistribution::Reset,
            })
            .expect("reset");
        let check = validation.check(category).expect("checked");
        assert_eq!(check.total, 0);
        assert!(!check.valid);
    }
    assert!(!s.validation().is_valid);
}

#[test]
fn proportional_on_empty_collection_is_a_no_op() {
    let mut s = session();
    s.apply(Edit::Redistribute {
        category: Category::PremiumItems,
        mode: Redistribution::Proportional,
    })
    .expect("no-op");
    assert!(s.document.table.premium_items.is_empty());
    assert!(!s.document.dirty);
    assert!(!s.can_undo());
}

#[test]
fn duplicate_keeps_total() {
    let mut s = session();
    let before = s.document.table.items_total();
    s.apply(Edit::Duplicate {
        category: Category::Items,
        index: 0,
    })
    .expect("duplicate");

    let items = &s.document.table.items;
    assert_eq!(items[0], ProbabilityEntry::new("II_A", 500));
    assert_eq!(items[1], ProbabilityEntry::new("II_A", 0));
    assert_eq!(s.document.table.items_total(), before);
}

#[test]
fn rejected_edits_are_no_ops() {
    let mut s = session();
    let before = s.document.table.clone();

    let edits = vec![
        Edit::Move {
            category: Category::Items,
            from: 0,
            to: 3,
        },
        Edit::SetItemId {
            category: Category::Items,
            index: 0,
            item_id: String::new(),
        },
        Edit::Remove {
            category: Category::Enchant,
            target: EntryRef::ItemId("II_A".to_string()),
        },
    ];
    let errors: Vec<OperationError> = edits
        .into_iter()
        .map(|edit| s.apply(edit).map(|_| ()).expect_err("rejected"))
        .collect();

    assert_eq!(
        errors,
        vec![
            OperationError::IndexOutOfRange {
                category: Category::Items,
                index: 3,
                len: 3
            },
            OperationError::EmptyItemId,
            OperationError::NotAnItemCollection(Category::Enchant),
        ]
    );
    assert_eq!(s.document.table, before);
    assert!(!s.can_undo());
}

#[test]
fn new_section_data_needs_a_skeleton() {
    let mut doc = CollectorDocument::from_text("Collecting_Item\n{\n\tII_A\t1000000\n}\n");
    let mut table = doc.table.clone();
    table.premium_items.push(ProbabilityEntry::new("II_P", 1_000_000));
    doc.replace_table(table);

    let err = doc.save_bytes().expect_err("missing section");
    assert!(format!("{err:#}").contains("Collecting_PremiumItem"));
}
