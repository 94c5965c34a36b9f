//! Query text for every catalog operation.
//!
//! Only registry column names are spliced into SQL. Namespaces, patterns,
//! ids and device keys always travel as bound parameters.

use log::debug;
use rusqlite::types::Value;

use crate::columns::{column_lists, is_a_column, TRACK_COLUMNS};
use crate::namespace::Namespace;

/// `up` value of a root folder.
pub const ROOT_SENTINEL: i64 = -1;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CatalogQuery {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn namespace_param(namespace: &Namespace) -> Value {
    text(namespace.as_str())
}

pub fn root(namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        format!(
            "SELECT me FROM paths WHERE up = {ROOT_SENTINEL} AND namespace = ?1 \
             ORDER BY me LIMIT 1"
        ),
        vec![namespace_param(namespace)],
    )
}

pub fn track_count(namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT COUNT(*) FROM tracks WHERE namespace = ?1".to_string(),
        vec![namespace_param(namespace)],
    )
}

/// Counts distinct artist values; a NULL artist counts once.
pub fn artist_count(namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT COUNT(*) FROM (SELECT DISTINCT artist FROM tracks WHERE namespace = ?1) AS artists"
            .to_string(),
        vec![namespace_param(namespace)],
    )
}

pub fn tracks_in_folder(parent: i64, namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        format!(
            "SELECT {} FROM tracks WHERE parent = ?1 AND namespace = ?2 ORDER BY track",
            column_lists().select_columns
        ),
        vec![Value::Integer(parent), namespace_param(namespace)],
    )
}

/// Pattern search on one column.
///
/// Returns `None` when `column` or a non-empty `orderby` is not registered;
/// no query is issued in that case.
pub fn multi_valued(
    column: &str,
    pattern: &str,
    namespace: &Namespace,
    orderby: &str,
) -> Option<CatalogQuery> {
    let order = if orderby.is_empty() { column } else { orderby };
    if !is_a_column(column) || !is_a_column(order) {
        debug!(
            "Skipping pattern query on unregistered column {:?} (order by {:?})",
            column, order
        );
        return None;
    }

    Some(CatalogQuery::new(
        format!(
            "SELECT {} FROM tracks WHERE {column} LIKE ?1 AND namespace = ?2 ORDER BY {order}",
            column_lists().select_columns
        ),
        vec![text(pattern), namespace_param(namespace)],
    ))
}

/// Ids of tracks whose `column` matches `pattern`, or `None` for an unregistered column.
pub fn find_ids(column: &str, pattern: &str, namespace: &Namespace) -> Option<CatalogQuery> {
    if !is_a_column(column) {
        debug!("Skipping id lookup on unregistered column {:?}", column);
        return None;
    }

    Some(CatalogQuery::new(
        format!("SELECT id FROM tracks WHERE {column} LIKE ?1 AND namespace = ?2 ORDER BY id"),
        vec![text(pattern), namespace_param(namespace)],
    ))
}

/// Insert statement binding `values` in registry order.
pub fn insert_track(values: Vec<Value>) -> CatalogQuery {
    debug_assert_eq!(values.len(), TRACK_COLUMNS.len());
    let lists = column_lists();
    CatalogQuery::new(
        format!(
            "INSERT INTO tracks {}{}",
            lists.query_columns,
            lists.parameter_columns.trim_end()
        ),
        values,
    )
}

/// Header columns needed to seed a path walk.
pub fn track_header(id: i64, namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT parent, title, artist, fname FROM tracks WHERE id = ?1 AND namespace = ?2"
            .to_string(),
        vec![Value::Integer(id), namespace_param(namespace)],
    )
}

pub fn path_node(me: i64, namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT me, up, name FROM paths WHERE me = ?1 AND namespace = ?2".to_string(),
        vec![Value::Integer(me), namespace_param(namespace)],
    )
}

pub fn subfolders(parent: i64, namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT me, up, name, namespace FROM paths WHERE up = ?1 AND namespace = ?2 \
         ORDER BY name, me"
            .to_string(),
        vec![Value::Integer(parent), namespace_param(namespace)],
    )
}

pub fn folder(me: i64, namespace: &Namespace) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT me, up, name, namespace FROM paths WHERE me = ?1 AND namespace = ?2".to_string(),
        vec![Value::Integer(me), namespace_param(namespace)],
    )
}

/// Devices are global, not namespaced.
pub fn device_info(alsa_name: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT friendly_name FROM devices WHERE alsa_name = ?1".to_string(),
        vec![text(alsa_name)],
    )
}
