//! Catalog data-access layer of the pas music server.
//!
//! Resolves the folder/track hierarchy stored in SQLite and answers
//! namespace-scoped catalog queries with generic [`Row`] results.

pub mod columns;
pub mod config;
pub mod db_manager;
pub mod error;
pub mod marshal;
pub mod namespace;
pub mod path_resolver;
pub mod protocol;
pub mod query;
pub mod session;

#[cfg(test)]
mod test_fixtures;

pub use columns::is_a_column;
pub use db_manager::DbManager;
pub use error::{DbError, Result, Severity, SqlFault};
pub use namespace::{Namespace, DEFAULT_NAMESPACE};
pub use protocol::{NewTrack, ResolvedPath, Row, RowKind, SelectResult};
