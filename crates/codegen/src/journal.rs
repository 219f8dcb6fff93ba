//! # Commit Journal
//!
//! Every side effect of a run is recorded as it happens. When a later stage
//! fails, the journal can be undone in reverse order:
//!
//! | Entry           | Compensation                                          |
//! |-----------------|-------------------------------------------------------|
//! | `FileWritten`   | restore the previous content, or delete a new file    |
//! | `RouterPatched` | restore the original text if the file is still ours   |
//! | `MenuCreated`   | delete the menu record                                |

use std::path::PathBuf;

use crate::menu::MenuRegistrar;
use crate::router::RouterPatcher;
use crate::synth::{FileSynthesizer, WrittenFile};

/// One committed side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    FileWritten {
        path: PathBuf,
        previous: Option<Vec<u8>>,
    },
    RouterPatched {
        path: PathBuf,
        original: String,
        patched: String,
    },
    MenuCreated {
        id: u64,
    },
}

impl From<WrittenFile> for JournalEntry {
    fn from(written: WrittenFile) -> Self {
        JournalEntry::FileWritten {
            path: written.path,
            previous: written.previous,
        }
    }
}

/// What compensation achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationReport {
    /// Entries undone successfully
    pub undone: usize,
    /// One message per entry that could not be undone
    pub failures: Vec<String>,
}

impl CompensationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered log of the side effects of one run.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: impl Into<JournalEntry>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Undo every entry, newest first. A failed compensation is logged and
    /// reported; the remaining entries are still attempted.
    pub async fn compensate(self, menus: &MenuRegistrar) -> CompensationReport {
        let mut report = CompensationReport::default();

        for entry in self.entries.into_iter().rev() {
            let outcome = match &entry {
                JournalEntry::FileWritten { path, previous } => {
                    FileSynthesizer::restore(&WrittenFile {
                        path: path.clone(),
                        previous: previous.clone(),
                    })
                    .map(|()| true)
                }
                JournalEntry::RouterPatched {
                    path,
                    original,
                    patched,
                } => RouterPatcher::new(path.clone()).revert(original, patched),
                JournalEntry::MenuCreated { id } => menus.remove(*id).await.map(|()| true),
            };

            match outcome {
                Ok(true) => {
                    tracing::debug!(entry = %describe(&entry), "compensated");
                    report.undone += 1;
                }
                Ok(false) => {
                    report
                        .failures
                        .push(format!("{}: changed since it was written", describe(&entry)));
                }
                Err(e) => {
                    tracing::warn!(entry = %describe(&entry), error = %e, "compensation failed");
                    report.failures.push(format!("{}: {}", describe(&entry), e));
                }
            }
        }

        report
    }
}

fn describe(entry: &JournalEntry) -> String {
    match entry {
        JournalEntry::FileWritten { path, previous: None } => format!("created {}", path.display()),
        JournalEntry::FileWritten { path, .. } => format!("replaced {}", path.display()),
        JournalEntry::RouterPatched { path, .. } => format!("patched {}", path.display()),
        JournalEntry::MenuCreated { id } => format!("menu #{}", id),
    }
}

// ============================================================================
// Tests
// ============================================================================
