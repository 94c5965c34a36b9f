//! Conversion of raw result rows into generic [`Row`]s.

use rusqlite::types::ValueRef;
use rusqlite::Statement;

use crate::columns::{ID_COLUMN, TRACK_COLUMNS};
use crate::error::{DbError, Result};
use crate::protocol::Row;

/// Renders one SQLite value the way it travels on the wire.
pub fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Maps output names onto result-set positions for one row shape.
pub trait RowLayout: Sized {
    /// Looks up every required column; a missing one is a schema fault.
    fn resolve(stmt: &Statement<'_>) -> Result<Self>;

    /// Copies one result row into `out`.
    fn fill(&self, row: &rusqlite::Row<'_>, out: &mut Row) -> rusqlite::Result<()>;
}

fn column_position(stmt: &Statement<'_>, column: &'static str) -> Result<usize> {
    stmt.column_index(column).map_err(|_| DbError::Schema {
        column: column.to_string(),
    })
}

/// Registered track columns plus `id`, tagged `type = "track"`.
#[derive(Debug)]
pub struct TrackLayout {
    positions: Vec<(&'static str, usize)>,
}

impl RowLayout for TrackLayout {
    fn resolve(stmt: &Statement<'_>) -> Result<Self> {
        let positions = TRACK_COLUMNS
            .iter()
            .copied()
            .chain(std::iter::once(ID_COLUMN))
            .map(|column| -> Result<(&'static str, usize)> {
                Ok((column, column_position(stmt, column)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { positions })
    }

    fn fill(&self, row: &rusqlite::Row<'_>, out: &mut Row) -> rusqlite::Result<()> {
        for (column, position) in &self.positions {
            let value = render_value(row.get_ref(*position)?);
            out.results.insert((*column).to_string(), value);
        }
        out.results.insert("type".to_string(), "track".to_string());

        // Untagged files still need something to show.
        let fname = out.results.get("fname").cloned().unwrap_or_default();
        if let Some(title) = out.results.get_mut("title") {
            if title.is_empty() {
                *title = fname;
            }
        }
        Ok(())
    }
}

/// Folder rows from `paths`, tagged `type = "folder"`.
#[derive(Debug)]
pub struct FolderLayout {
    me: usize,
    up: usize,
    name: usize,
    namespace: usize,
}

impl RowLayout for FolderLayout {
    fn resolve(stmt: &Statement<'_>) -> Result<Self> {
        Ok(Self {
            me: column_position(stmt, "me")?,
            up: column_position(stmt, "up")?,
            name: column_position(stmt, "name")?,
            namespace: column_position(stmt, "namespace")?,
        })
    }

    fn fill(&self, row: &rusqlite::Row<'_>, out: &mut Row) -> rusqlite::Result<()> {
        let fields = [
            (ID_COLUMN, self.me),
            ("up", self.up),
            ("name", self.name),
            ("namespace", self.namespace),
        ];
        for (column, position) in fields {
            out.results
                .insert(column.to_string(), render_value(row.get_ref(position)?));
        }
        out.results.insert("type".to_string(), "folder".to_string());
        Ok(())
    }
}
