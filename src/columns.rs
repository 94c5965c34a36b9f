//! Registered track columns.
//!
//! Any column name that reaches SQL text must come from this registry. The
//! order below fixes both the insert column list and its placeholder list.

use std::sync::OnceLock;

/// Track attribute columns, in insert/select order. `id` is implicit.
pub const TRACK_COLUMNS: [&str; 13] = [
    "title",
    "artist",
    "album",
    "composer",
    "genre",
    "source",
    "duration",
    "year",
    "track",
    "publisher",
    "parent",
    "fname",
    "namespace",
];

/// Primary key column, valid for filtering but never inserted.
pub const ID_COLUMN: &str = "id";

/// True iff `name` is `id` or exactly one of the registered track columns.
pub fn is_a_column(name: &str) -> bool {
    name == ID_COLUMN || TRACK_COLUMNS.contains(&name)
}

/// Column-list fragments derived from [`TRACK_COLUMNS`].
#[derive(Debug)]
pub struct ColumnLists {
    /// `(title, artist, ...) `
    pub query_columns: String,
    /// ` VALUES (?, ?, ...) `
    pub parameter_columns: String,
    /// `title, artist, ..., id`
    pub select_columns: String,
}

impl ColumnLists {
    fn build() -> Self {
        let names = TRACK_COLUMNS.join(", ");
        let placeholders = vec!["?"; TRACK_COLUMNS.len()].join(", ");
        Self {
            query_columns: format!("({names}) "),
            parameter_columns: format!(" VALUES ({placeholders}) "),
            select_columns: format!("{names}, {ID_COLUMN}"),
        }
    }
}

/// Shared column lists, built on first use.
pub fn column_lists() -> &'static ColumnLists {
    static LISTS: OnceLock<ColumnLists> = OnceLock::new();
    LISTS.get_or_init(ColumnLists::build)
}
