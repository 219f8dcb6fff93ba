//! Records exchanged with the external collaborators.

use serde::{Deserialize, Serialize};

/// A base table as listed by the schema store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

impl TableInfo {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
        }
    }
}

/// Column metadata exactly as the schema store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    /// Column name (snake_case in practice)
    pub name: String,
    /// Declared data type, e.g. `varchar`, `bigint`, `datetime`
    pub raw_type: String,
    #[serde(default)]
    pub comment: String,
    pub nullable: bool,
    /// Index flag: `PRI`, `UNI`, `MUL` or empty
    #[serde(default)]
    pub key_flag: String,
    /// Extra attributes such as `auto_increment`
    #[serde(default)]
    pub extra: String,
}

impl RawColumn {
    /// A nullable column with no comment, key or extra attributes.
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            comment: String::new(),
            nullable: true,
            key_flag: String::new(),
            extra: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_key(mut self, key_flag: impl Into<String>) -> Self {
        self.key_flag = key_flag.into();
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// Kind of a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    Directory,
    Page,
    Button,
}

impl MenuKind {
    /// Numeric code stored in the menu table.
    pub fn code(&self) -> i32 {
        match self {
            MenuKind::Directory => 1,
            MenuKind::Page => 2,
            MenuKind::Button => 3,
        }
    }
}

/// One navigation entry handed to [`crate::MenuStore::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub parent_id: u64,
    pub title: String,
    pub path: String,
    pub name: String,
    pub component: String,
    pub icon: String,
    pub sort: i32,
    pub kind: MenuKind,
    pub permission: String,
    pub hidden: bool,
    pub keep_alive: bool,
}
