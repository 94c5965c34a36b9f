//! Statement execution and error reformatting.
//!
//! Every `rusqlite::Error` leaves this module as a classified [`DbError`].
//! Statements and cursors are scoped to the helper that created them, so
//! they are released on every return path.

use log::{debug, error, log};
use rusqlite::{ffi, params_from_iter, Connection, OptionalExtension};

use crate::columns::TRACK_COLUMNS;
use crate::error::{DbError, Result, SqlFault};
use crate::marshal::RowLayout;
use crate::protocol::{Row, SelectResult};
use crate::query::CatalogQuery;

fn is_transport_code(code: ffi::ErrorCode) -> bool {
    matches!(
        code,
        ffi::ErrorCode::CannotOpen
            | ffi::ErrorCode::NotADatabase
            | ffi::ErrorCode::DatabaseCorrupt
            | ffi::ErrorCode::DatabaseBusy
            | ffi::ErrorCode::DatabaseLocked
            | ffi::ErrorCode::SystemIoFailure
            | ffi::ErrorCode::PermissionDenied
            | ffi::ErrorCode::OutOfMemory
            | ffi::ErrorCode::FileLockingProtocolFailed
            | ffi::ErrorCode::ApiMisuse
            | ffi::ErrorCode::InternalMalfunction
    )
}

/// Classifies a driver error and captures its message, code and state.
pub fn reformat(err: rusqlite::Error) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            let fault = SqlFault {
                message: message.unwrap_or_else(|| failure.to_string()),
                code: failure.extended_code,
                state: format!("{:?}", failure.code),
            };
            if is_transport_code(failure.code) {
                DbError::Transport(fault)
            } else {
                DbError::Query(fault)
            }
        }
        rusqlite::Error::InvalidColumnName(column) => DbError::Schema { column },
        other => DbError::Query(SqlFault {
            message: other.to_string(),
            code: -1,
            state: "Driver".to_string(),
        }),
    }
}

/// Propagates fatal errors; logs anything else and substitutes `fallback`.
pub fn settle<T>(outcome: Result<T>, fallback: impl FnOnce() -> T) -> Result<T> {
    match outcome {
        Ok(value) => Ok(value),
        Err(err) if err.is_fatal() => {
            error!("{}", err);
            Err(err)
        }
        Err(err) => {
            let level: log::Level = err.severity().into();
            log!(level, "{}", err);
            Ok(fallback())
        }
    }
}

pub fn open(location: &str) -> Result<Connection> {
    Connection::open(location).map_err(|err| match reformat(err) {
        DbError::Query(fault) => DbError::Transport(fault),
        other => other,
    })
}

/// First row mapped through `map`, or `None` when the query matches nothing.
pub fn fetch_optional<T, F>(conn: &Connection, query: &CatalogQuery, map: F) -> Result<Option<T>>
where
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    debug!("{}", query.sql);
    conn.query_row(&query.sql, params_from_iter(query.params.iter()), map)
        .optional()
        .map_err(reformat)
}

pub fn fetch_scalar(conn: &Connection, query: &CatalogQuery) -> Result<Option<i64>> {
    fetch_optional(conn, query, |row| row.get::<_, i64>(0))
}

/// Every value of the first result column.
pub fn fetch_column(conn: &Connection, query: &CatalogQuery) -> Result<Vec<i64>> {
    debug!("{}", query.sql);
    let mut stmt = conn.prepare(&query.sql).map_err(reformat)?;
    let values = stmt
        .query_map(params_from_iter(query.params.iter()), |row| {
            row.get::<_, i64>(0)
        })
        .map_err(reformat)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(reformat)?;
    Ok(values)
}

/// Appends one marshalled row per result row to `results`.
///
/// Rows are appended only once fully marshalled, so on error `results`
/// still holds every row completed before the failure.
pub fn fetch_into<L: RowLayout>(
    conn: &Connection,
    query: &CatalogQuery,
    results: &mut SelectResult,
) -> Result<()> {
    debug!("{}", query.sql);
    let mut stmt = conn.prepare(&query.sql).map_err(reformat)?;
    let layout = L::resolve(&stmt)?;
    let mut rows = stmt
        .query(params_from_iter(query.params.iter()))
        .map_err(reformat)?;

    while let Some(row) = rows.next().map_err(reformat)? {
        let mut out = Row::default();
        layout.fill(row, &mut out).map_err(reformat)?;
        results.rows.push(out);
    }
    Ok(())
}

pub fn execute(conn: &Connection, query: &CatalogQuery) -> Result<usize> {
    debug!("{}", query.sql);
    conn.execute(&query.sql, params_from_iter(query.params.iter()))
        .map_err(reformat)
}

fn track_column_type(column: &str) -> &'static str {
    match column {
        "duration" | "track" | "parent" => "INTEGER NOT NULL DEFAULT 0",
        _ => "TEXT NOT NULL DEFAULT ''",
    }
}

/// Creates the catalog tables when they do not exist yet.
pub fn create_schema(conn: &Connection) -> Result<()> {
    let track_columns = TRACK_COLUMNS
        .iter()
        .map(|column| format!("{column} {}", track_column_type(column)))
        .collect::<Vec<_>>()
        .join(",\n                ");

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS paths (
                me INTEGER PRIMARY KEY,
                up INTEGER NOT NULL,
                name TEXT NOT NULL,
                namespace TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS paths_up ON paths (namespace, up);
            CREATE TABLE IF NOT EXISTS tracks (
                id INTEGER PRIMARY KEY,
                {track_columns}
            );
            CREATE INDEX IF NOT EXISTS tracks_parent ON tracks (namespace, parent);
            CREATE TABLE IF NOT EXISTS devices (
                alsa_name TEXT PRIMARY KEY,
                friendly_name TEXT NOT NULL
            );"
    ))
    .map_err(reformat)
}
