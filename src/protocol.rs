//! Result and record types exchanged with catalog callers.
//!
//! Field names here are the wire contract of the music server and must not
//! be renamed.

use std::collections::BTreeMap;

use rusqlite::types::Value;

use crate::columns::TRACK_COLUMNS;
use crate::error::{DbError, Result};
use crate::namespace::Namespace;

/// Kind tag carried by every result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub enum RowKind {
    #[default]
    #[serde(rename = "ROW")]
    Row,
}

/// One generic result row: column name to rendered value.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Row {
    #[serde(rename = "type")]
    pub kind: RowKind,
    pub results: BTreeMap<String, String>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.results.get(column).map(String::as_str)
    }
}

/// Ordered rows produced by one catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct SelectResult {
    pub rows: Vec<Row>,
}

impl SelectResult {
    /// Appends an empty row and hands it back for filling.
    pub fn add_row(&mut self) -> &mut Row {
        self.rows.push(Row::default());
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Display path of a track plus the tags captured while resolving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ResolvedPath {
    /// `/`-joined folders below the library root, ending in the file name.
    pub path: String,
    pub title: String,
    pub artist: String,
}

/// A track to be written through the single insert path.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub composer: String,
    pub genre: String,
    pub source: String,
    /// Length in seconds.
    pub duration: i64,
    pub year: String,
    /// Position within the album.
    pub track: i64,
    pub publisher: String,
    /// Containing folder (`paths.me`).
    pub parent: i64,
    pub fname: String,
    pub namespace: String,
}

impl NewTrack {
    /// The field stored under `column`, `None` for a name with no field.
    pub fn column_value(&self, column: &str) -> Option<Value> {
        let text = |value: &str| Value::Text(value.to_string());
        let value = match column {
            "title" => text(&self.title),
            "artist" => text(&self.artist),
            "album" => text(&self.album),
            "composer" => text(&self.composer),
            "genre" => text(&self.genre),
            "source" => text(&self.source),
            "duration" => Value::Integer(self.duration),
            "year" => text(&self.year),
            "track" => Value::Integer(self.track),
            "publisher" => text(&self.publisher),
            "parent" => Value::Integer(self.parent),
            "fname" => text(&self.fname),
            "namespace" => text(Namespace::normalize(&self.namespace).as_str()),
            _ => return None,
        };
        Some(value)
    }

    /// Values in [`TRACK_COLUMNS`] order, ready to bind to the insert placeholders.
    ///
    /// A registered column without a matching field is a schema fault.
    pub fn column_values(&self) -> Result<Vec<Value>> {
        TRACK_COLUMNS
            .iter()
            .map(|column| {
                self.column_value(column).ok_or_else(|| DbError::Schema {
                    column: (*column).to_string(),
                })
            })
            .collect()
    }
}
