//! Rebuilds a track's display path by climbing the folder hierarchy.
//!
//! Each folder only knows its parent (`up`), so the walk starts at the
//! track's folder and prepends one name per step until it reaches the
//! library root. Stored data is only read.

use std::collections::HashSet;

use log::{debug, warn};
use rusqlite::Connection;

use crate::error::{DbError, Result};
use crate::namespace::Namespace;
use crate::protocol::ResolvedPath;
use crate::query::{self, ROOT_SENTINEL};
use crate::session::fetch_optional;

struct TrackHeader {
    parent: i64,
    title: String,
    artist: String,
    fname: String,
}

struct PathNode {
    up: i64,
    name: String,
}

/// Climbs from a track to the library root.
pub struct PathResolver<'conn> {
    conn: &'conn Connection,
    max_depth: usize,
}

impl<'conn> PathResolver<'conn> {
    pub fn new(conn: &'conn Connection, max_depth: usize) -> Self {
        Self { conn, max_depth }
    }

    /// Resolves track `id`; `Ok(None)` when the track does not exist in `namespace`.
    ///
    /// Every folder up to and including the top-level one (`up = -1`)
    /// contributes its name. A folder that is missing or cannot be read ends
    /// the walk and the path gathered so far is returned. A folder chain
    /// that revisits a node or climbs past `max_depth` folders is reported
    /// as a [`DbError::PathIntegrity`] fault.
    pub fn resolve(&self, id: i64, namespace: &Namespace) -> Result<Option<ResolvedPath>> {
        let Some(header) = fetch_optional(
            self.conn,
            &query::track_header(id, namespace),
            |row| {
                Ok(TrackHeader {
                    parent: row.get("parent")?,
                    title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
                    artist: row.get::<_, Option<String>>("artist")?.unwrap_or_default(),
                    fname: row.get("fname")?,
                })
            },
        )?
        else {
            debug!("No track {} in namespace {}", id, namespace);
            return Ok(None);
        };

        let mut path = header.fname;
        let mut up = header.parent;
        let mut visited = HashSet::new();

        while up > ROOT_SENTINEL {
            if !visited.insert(up) {
                return Err(DbError::path_integrity(
                    id,
                    namespace.as_str(),
                    format!("folder {up} appears twice in its own ancestry"),
                ));
            }
            if visited.len() > self.max_depth {
                return Err(DbError::path_integrity(
                    id,
                    namespace.as_str(),
                    format!("folder chain deeper than {} levels", self.max_depth),
                ));
            }

            let node = fetch_optional(self.conn, &query::path_node(up, namespace), |row| {
                Ok(PathNode {
                    up: row.get("up")?,
                    name: row.get("name")?,
                })
            });
            let node = match node {
                Ok(Some(node)) => node,
                Ok(None) => {
                    warn!(
                        "Folder {} above track {} is missing in namespace {}",
                        up, id, namespace
                    );
                    break;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(
                        "Path of track {} truncated below folder {}: {}",
                        id, up, err
                    );
                    break;
                }
            };

            path = format!("{}/{}", node.name, path);
            up = node.up;
        }

        Ok(Some(ResolvedPath {
            path,
            title: header.title,
            artist: header.artist,
        }))
    }
}
