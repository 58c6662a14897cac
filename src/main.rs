use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use collector::{
    Category, CollectorDocument, Edit, EditSession, EntryRef, ProbabilityEntry, Redistribution,
    SectionOutcome, SerializeOutcome, ValidationResult, statics,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collector", version, about = "Check and edit Collecting_* probability tables")]
struct Cli {
    /// Log parser and serializer decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a file and report format warnings and total mismatches
    Check {
        file: PathBuf,
        /// Print the validation result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print every section with values and percentages
    Show {
        file: PathBuf,
        /// Print the parsed table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Spread a section's target total over its entries
    Redistribute {
        #[command(flatten)]
        target: Target,
        /// equal, proportional or reset
        #[arg(long)]
        mode: Redistribution,
    },
    /// Append an entry (an item, or an enchant level for the enchant section)
    Add {
        #[command(flatten)]
        target: Target,
        #[arg(long, default_value = statics::DEFAULT_NEW_ITEM_ID)]
        id: String,
        #[arg(long, default_value_t = 0)]
        value: u32,
    },
    /// Remove an entry by position or item id
    Remove {
        #[command(flatten)]
        target: Target,
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        index: Option<usize>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Insert a zero-weight copy of an entry right after it
    Duplicate {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        index: usize,
    },
    /// Move an entry to another position
    Move {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Change the value, level or item id of one entry
    Set {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        value: Option<u32>,
        #[arg(long)]
        level: Option<u32>,
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Args)]
struct Target {
    file: PathBuf,
    /// enchant, items, premium-items or premium-status-items
    #[arg(short, long)]
    section: Category,
    /// Write here instead of overwriting the input file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "collector=debug" } else { "collector=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the file is fully valid after the command.
fn run(command: Command) -> Result<bool> {
    match command {
        Command::Check { file, json } => {
            let doc = CollectorDocument::load_path(&file)?;
            let validation = doc.validation();
            if json {
                println!("{}", serde_json::to_string_pretty(&validation)?);
            } else {
                print_warnings(&doc);
                print_validation(&validation);
            }
            Ok(validation.is_valid && doc.warnings().is_empty())
        }
        Command::Show { file, json } => {
            let doc = CollectorDocument::load_path(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc.table)?);
            } else {
                print_warnings(&doc);
                print_table(&doc);
            }
            Ok(true)
        }
        Command::Redistribute { target, mode } => {
            let edit = Edit::Redistribute {
                category: target.section,
                mode,
            };
            edit_file(&target, vec![edit])
        }
        Command::Add { target, id, value } => {
            let edit = match target.section {
                Category::Enchant => Edit::AddEnchant { chance: value },
                category => Edit::AddItem {
                    category,
                    entry: ProbabilityEntry::new(id, value),
                },
            };
            edit_file(&target, vec![edit])
        }
        Command::Remove { target, index, id } => {
            let entry = match (index, id) {
                (Some(index), _) => EntryRef::Index(index),
                (None, Some(id)) => EntryRef::ItemId(id),
                (None, None) => bail!("pass --index or --id"),
            };
            let edit = Edit::Remove {
                category: target.section,
                target: entry,
            };
            edit_file(&target, vec![edit])
        }
        Command::Duplicate { target, index } => {
            let edit = Edit::Duplicate {
                category: target.section,
                index,
            };
            edit_file(&target, vec![edit])
        }
        Command::Move { target, from, to } => {
            let edit = Edit::Move {
                category: target.section,
                from,
                to,
            };
            edit_file(&target, vec![edit])
        }
        Command::Set {
            target,
            index,
            value,
            level,
            id,
        } => {
            let category = target.section;
            let mut edits = Vec::new();
            if let Some(item_id) = id {
                edits.push(Edit::SetItemId {
                    category,
                    index,
                    item_id,
                });
            }
            if let Some(level) = level {
                if category != Category::Enchant {
                    bail!("--level only applies to the enchant section");
                }
                edits.push(Edit::SetLevel { index, level });
            }
            if let Some(value) = value {
                edits.push(Edit::SetValue {
                    category,
                    index,
                    value,
                });
            }
            if edits.is_empty() {
                bail!("nothing to set; pass --value, --level or --id");
            }
            edit_file(&target, edits)
        }
    }
}

fn edit_file(target: &Target, edits: Vec<Edit>) -> Result<bool> {
    let doc = CollectorDocument::load_path(&target.file)?;
    print_warnings(&doc);
    let mut session = EditSession::new(doc);

    for edit in edits {
        let description = edit.describe();
        session
            .apply(edit)
            .with_context(|| format!("applying `{description}`"))?;
    }

    let output = target.output.as_ref().unwrap_or(&target.file);
    let outcome = session
        .document
        .save_to_path(output)
        .with_context(|| format!("saving {}", output.display()))?;

    print_outcome(&outcome);
    let validation = session.validation();
    print_validation(validation);
    Ok(validation.is_valid)
}

fn print_warnings(doc: &CollectorDocument) {
    for warning in doc.warnings() {
        eprintln!("{} {warning}", statics::EN_WARNING_PREFIX);
    }
}

fn print_validation(validation: &ValidationResult) {
    for (category, check) in &validation.per_collection {
        let status = if check.valid {
            statics::EN_VALID
        } else {
            statics::EN_INVALID
        };
        println!(
            "{:<22} {:>9} / {:<9} {status}",
            category.display_name(),
            check.total,
            check.expected
        );
    }
    if validation.is_valid {
        println!("{}", statics::EN_ALL_VALID);
    } else {
        for error in &validation.errors {
            println!("{} {error}", statics::EN_WARNING_PREFIX);
        }
    }
}

fn print_table(doc: &CollectorDocument) {
    let table = &doc.table;
    for category in Category::ALL {
        println!(
            "{} ({} / {}, {:.2}%)",
            category.header(),
            table.total(category),
            category.target(),
            category.percentage(table.total(category))
        );
        if table.is_empty(category) {
            println!("  {}", statics::EN_EMPTY_SECTION);
        }
        match table.item_entries(category) {
            None => {
                for (i, e) in table.enchant.iter().enumerate() {
                    println!(
                        "  #{i:<3} level {:<4} {:>7}  {:>6.2}%",
                        e.level,
                        e.chance,
                        category.percentage(u64::from(e.chance))
                    );
                }
            }
            Some(entries) => {
                for (i, e) in entries.iter().enumerate() {
                    println!(
                        "  #{i:<3} {:<32} {:>9}  {:>8.4}%",
                        e.item_id,
                        e.probability,
                        category.percentage(u64::from(e.probability))
                    );
                }
            }
        }
    }
}

fn print_outcome(outcome: &SerializeOutcome) {
    for (category, result) in &outcome.sections {
        let label = match result {
            SectionOutcome::Preserved => statics::EN_PRESERVED,
            SectionOutcome::Rewritten => statics::EN_REWRITTEN,
            SectionOutcome::Absent => statics::EN_ABSENT,
        };
        println!("{:<22} {label}", category.display_name());
    }
}
