use log::{debug, info};
use rusqlite::Connection;

use crate::columns;
use crate::error::{DbError, Result};
use crate::marshal::{FolderLayout, TrackLayout};
use crate::namespace::Namespace;
use crate::path_resolver::PathResolver;
use crate::protocol::{NewTrack, ResolvedPath, SelectResult};
use crate::query;
use crate::session::{self, settle};

/// Catalog access over one SQLite session.
///
/// Every namespace argument may be empty, which selects `"default"`.
/// Read operations log query faults and keep whatever they had already
/// produced; transport, schema and path-integrity faults are returned.
pub struct DbManager {
    conn: Option<Connection>,
    max_path_depth: usize,
}

impl Default for DbManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DbManager {
    pub fn new() -> Self {
        Self {
            conn: None,
            max_path_depth: crate::config::PathsConfig::default().max_depth,
        }
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            ..Self::new()
        }
    }

    pub fn with_max_path_depth(mut self, max_path_depth: usize) -> Self {
        self.max_path_depth = max_path_depth;
        self
    }

    /// Opens the database at `host` (a file path or `:memory:`), replacing any open session.
    pub fn initialize(&mut self, host: &str) -> Result<bool> {
        self.shutdown();
        let conn = session::open(host)?;
        info!("Catalog database opened at {}", host);
        self.conn = Some(conn);
        Ok(true)
    }

    pub fn initialized(&self) -> bool {
        self.conn.is_some()
    }

    pub fn shutdown(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                log::error!("Failed to close catalog database: {}", err);
            }
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(DbError::not_initialized)
    }

    /// Creates missing catalog tables.
    pub fn initialize_schema(&self) -> Result<()> {
        session::create_schema(self.conn()?)
    }

    pub fn is_a_column(&self, name: &str) -> bool {
        columns::is_a_column(name)
    }

    /// Id of the namespace's root folder, `0` when it has none.
    pub fn get_root(&self, namespace: &str) -> Result<i64> {
        let namespace = Namespace::normalize(namespace);
        let root = session::fetch_scalar(self.conn()?, &query::root(&namespace));
        Ok(settle(root, || None)?.unwrap_or(0))
    }

    pub fn get_track_count(&self, namespace: &str) -> Result<i64> {
        let namespace = Namespace::normalize(namespace);
        let count = session::fetch_scalar(self.conn()?, &query::track_count(&namespace));
        Ok(settle(count, || None)?.unwrap_or(0))
    }

    pub fn get_artist_count(&self, namespace: &str) -> Result<i64> {
        let namespace = Namespace::normalize(namespace);
        let count = session::fetch_scalar(self.conn()?, &query::artist_count(&namespace));
        Ok(settle(count, || None)?.unwrap_or(0))
    }

    /// Appends the tracks directly inside folder `parent_id`, by track number.
    pub fn get_tracks(
        &self,
        results: &mut SelectResult,
        parent_id: i64,
        namespace: &str,
    ) -> Result<()> {
        let namespace = Namespace::normalize(namespace);
        let query = query::tracks_in_folder(parent_id, &namespace);
        settle(
            session::fetch_into::<TrackLayout>(self.conn()?, &query, results),
            || (),
        )
    }

    /// Appends tracks whose `column` is LIKE `pattern`, ordered by `orderby` or `column`.
    ///
    /// An unregistered `column` or `orderby` issues no query and appends nothing.
    pub fn multi_valued_query(
        &self,
        column: &str,
        pattern: &str,
        results: &mut SelectResult,
        namespace: &str,
        orderby: &str,
    ) -> Result<()> {
        let namespace = Namespace::normalize(namespace);
        let Some(query) = query::multi_valued(column, pattern, &namespace, orderby) else {
            return Ok(());
        };
        settle(
            session::fetch_into::<TrackLayout>(self.conn()?, &query, results),
            || (),
        )
    }

    /// Display path, title and artist of track `id`; `None` for an unknown track.
    pub fn path_from_id(&self, id: i64, namespace: &str) -> Result<Option<ResolvedPath>> {
        let namespace = Namespace::normalize(namespace);
        let resolver = PathResolver::new(self.conn()?, self.max_path_depth);
        let resolved = resolver.resolve(id, &namespace);
        settle(resolved, || None)
    }

    /// Friendly name of an ALSA device, empty when unknown.
    pub fn get_device_info(&self, alsa_name: &str) -> Result<String> {
        let friendly_name = session::fetch_optional(
            self.conn()?,
            &query::device_info(alsa_name),
            |row| row.get::<_, String>(0),
        );
        let friendly_name = settle(friendly_name, || None)?.unwrap_or_default();
        debug!("Device {} is {:?}", alsa_name, friendly_name);
        Ok(friendly_name)
    }

    /// Appends the folders directly below folder `id`, by name.
    pub fn get_subfolders(
        &self,
        results: &mut SelectResult,
        id: i64,
        namespace: &str,
    ) -> Result<()> {
        let namespace = Namespace::normalize(namespace);
        let query = query::subfolders(id, &namespace);
        settle(
            session::fetch_into::<FolderLayout>(self.conn()?, &query, results),
            || (),
        )
    }

    /// Appends folder `id` itself, when it exists in the namespace.
    pub fn get_folder(&self, results: &mut SelectResult, id: i64, namespace: &str) -> Result<()> {
        let namespace = Namespace::normalize(namespace);
        let query = query::folder(id, &namespace);
        settle(
            session::fetch_into::<FolderLayout>(self.conn()?, &query, results),
            || (),
        )
    }

    /// Ids of tracks whose `column` is LIKE `pattern`; empty for an unregistered column.
    pub fn find_ids(&self, column: &str, pattern: &str, namespace: &str) -> Result<Vec<i64>> {
        let namespace = Namespace::normalize(namespace);
        let Some(query) = query::find_ids(column, pattern, &namespace) else {
            return Ok(Vec::new());
        };
        settle(session::fetch_column(self.conn()?, &query), Vec::new)
    }

    /// Inserts a track and returns its id. Every failure is returned.
    pub fn insert_track(&self, track: &NewTrack) -> Result<i64> {
        let values = track.column_values()?;
        let conn = self.conn()?;
        session::execute(conn, &query::insert_track(values))?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::DbManager;
    use crate::error::DbError;
    use crate::protocol::{NewTrack, SelectResult};
    use crate::test_fixtures::{
        catalog_connection, ALBUM_FOLDER, ARTIST_FOLDER, KITCHEN_ROOT, ROOT_FOLDER, SONG_TRACK,
        UNTITLED_TRACK,
    };

    fn manager() -> DbManager {
        DbManager::from_connection(catalog_connection())
    }

    fn titles(results: &SelectResult) -> Vec<&str> {
        results
            .rows
            .iter()
            .map(|row| row.get("title").unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_uninitialized_manager_reports_transport_fault() {
        let db = DbManager::new();
        assert!(!db.initialized());
        let err = db.get_track_count("").expect_err("no session is open");
        assert!(matches!(err, DbError::Transport(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_initialize_and_shutdown_lifecycle() {
        let mut db = DbManager::new();
        assert!(db.initialize(":memory:").expect("in-memory database should open"));
        assert!(db.initialized());
        db.initialize_schema().expect("schema should be created");
        assert_eq!(db.get_track_count("").expect("count should run"), 0);

        db.shutdown();
        assert!(!db.initialized());
    }

    #[test]
    fn test_get_root_substitutes_default_namespace() {
        let db = manager();
        assert_eq!(db.get_root("").expect("root lookup"), ROOT_FOLDER);
        assert_eq!(db.get_root("default").expect("root lookup"), ROOT_FOLDER);
        assert_eq!(db.get_root("kitchen").expect("root lookup"), KITCHEN_ROOT);
        assert_eq!(db.get_root("garage").expect("root lookup"), 0);
    }

    #[test]
    fn test_track_count_is_namespace_scoped() {
        let db = manager();
        assert_eq!(db.get_track_count("default").expect("count"), 5);
        assert_eq!(db.get_track_count("").expect("count"), 5);
        assert_eq!(db.get_track_count("kitchen").expect("count"), 1);
        assert_eq!(db.get_track_count("%").expect("count"), 0);
    }

    #[test]
    fn test_artist_count_counts_each_artist_once() {
        let db = manager();
        assert_eq!(db.get_artist_count("").expect("count"), 3);
        assert_eq!(db.get_artist_count("kitchen").expect("count"), 1);
    }

    #[test]
    fn test_get_tracks_orders_by_track_number() {
        let db = manager();
        let mut results = SelectResult::default();
        db.get_tracks(&mut results, ALBUM_FOLDER, "")
            .expect("folder listing should run");

        assert_eq!(titles(&results), vec!["04 Track.flac", "Song"]);
        assert_eq!(
            results.rows[1].get("id"),
            Some(SONG_TRACK.to_string().as_str())
        );
        assert!(results.rows.iter().all(|row| row.get("type") == Some("track")));
    }

    #[test]
    fn test_multi_valued_query_orders_by_column_within_namespace() {
        let db = manager();
        let mut results = SelectResult::default();
        db.multi_valued_query("artist", "Bach%", &mut results, "default", "")
            .expect("pattern query should run");

        let artists: Vec<&str> = results
            .rows
            .iter()
            .map(|row| row.get("artist").unwrap_or_default())
            .collect();
        assert_eq!(artists.len(), 3);
        let mut sorted = artists.clone();
        sorted.sort();
        assert_eq!(artists, sorted);
        assert!(results
            .rows
            .iter()
            .all(|row| row.get("namespace") == Some("default")));
    }

    #[test]
    fn test_multi_valued_query_honors_orderby() {
        let db = manager();
        let mut results = SelectResult::default();
        db.multi_valued_query("artist", "Bach%", &mut results, "", "title")
            .expect("pattern query should run");
        assert_eq!(titles(&results), vec!["Chaconne", "Fugue", "Toccata"]);
    }

    #[test]
    fn test_multi_valued_query_skips_unregistered_column() {
        let db = manager();
        let mut results = SelectResult::default();
        db.multi_valued_query("; DROP TABLE tracks", "%", &mut results, "default", "")
            .expect("invalid columns are not errors");

        assert!(results.is_empty());
        assert_eq!(db.get_track_count("").expect("tracks table intact"), 5);
    }

    #[test]
    fn test_multi_valued_query_appends_to_existing_results() {
        let db = manager();
        let mut results = SelectResult::default();
        db.get_tracks(&mut results, ALBUM_FOLDER, "").expect("listing");
        db.multi_valued_query("title", "News", &mut results, "kitchen", "")
            .expect("pattern query");
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_path_from_id_resolves_display_path() {
        let db = manager();
        let resolved = db
            .path_from_id(UNTITLED_TRACK, "")
            .expect("resolution should run")
            .expect("track exists");
        assert_eq!(resolved.path, "Music/Artist/Album/04 Track.flac");
        assert_eq!(resolved.title, "");
        assert_eq!(resolved.artist, "Artist");

        assert!(db.path_from_id(9_999, "").expect("lookup").is_none());
    }

    #[test]
    fn test_path_from_id_propagates_cycle_fault() {
        let db = manager();
        let err = db
            .path_from_id(crate::test_fixtures::CYCLE_TRACK, "loop")
            .expect_err("cycle must surface");
        assert!(matches!(err, DbError::PathIntegrity { .. }));
    }

    #[test]
    fn test_get_device_info() {
        let db = manager();
        assert_eq!(db.get_device_info("hw:0,0").expect("lookup"), "Living Room DAC");
        assert_eq!(db.get_device_info("hw:9,9").expect("lookup"), "");
    }

    #[test]
    fn test_get_subfolders_lists_children_by_name() {
        let db = manager();
        let mut results = SelectResult::default();
        db.get_subfolders(&mut results, ROOT_FOLDER, "")
            .expect("subfolder listing should run");

        let names: Vec<&str> = results
            .rows
            .iter()
            .map(|row| row.get("name").unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Artist", "Bach"]);
        assert!(results.rows.iter().all(|row| row.get("type") == Some("folder")));
    }

    #[test]
    fn test_get_folder_returns_single_folder_row() {
        let db = manager();
        let mut results = SelectResult::default();
        db.get_folder(&mut results, ARTIST_FOLDER, "").expect("folder lookup");
        assert_eq!(results.len(), 1);
        assert_eq!(results.rows[0].get("name"), Some("Artist"));
        assert_eq!(results.rows[0].get("up"), Some("1"));

        let mut other = SelectResult::default();
        db.get_folder(&mut other, ARTIST_FOLDER, "kitchen").expect("folder lookup");
        assert!(other.is_empty());
    }

    #[test]
    fn test_find_ids_gates_on_registry() {
        let db = manager();
        assert_eq!(
            db.find_ids("artist", "Bach, J.S.", "").expect("lookup"),
            vec![102, 103]
        );
        assert!(db.find_ids("artist) OR (1=1", "%", "").expect("lookup").is_empty());
    }

    #[test]
    fn test_insert_track_binds_values_positionally() {
        let db = manager();
        let track = NewTrack {
            title: "Air".into(),
            artist: "Bach, J.S.".into(),
            album: "Suite No. 3".into(),
            composer: "J.S. Bach".into(),
            genre: "Baroque".into(),
            source: "CD".into(),
            duration: 312,
            year: "1731".into(),
            track: 2,
            publisher: "Archiv".into(),
            parent: 4,
            fname: "air.flac".into(),
            namespace: String::new(),
        };
        let id = db.insert_track(&track).expect("insert should succeed");

        let mut results = SelectResult::default();
        db.multi_valued_query("id", &id.to_string(), &mut results, "", "")
            .expect("lookup by id");
        let row = &results.rows[0];
        for (column, expected) in [
            ("title", "Air"),
            ("artist", "Bach, J.S."),
            ("album", "Suite No. 3"),
            ("composer", "J.S. Bach"),
            ("genre", "Baroque"),
            ("source", "CD"),
            ("duration", "312"),
            ("year", "1731"),
            ("track", "2"),
            ("publisher", "Archiv"),
            ("parent", "4"),
            ("fname", "air.flac"),
            ("namespace", "default"),
        ] {
            assert_eq!(row.get(column), Some(expected), "column {column}");
        }
    }

    #[test]
    fn test_missing_table_is_logged_not_raised() {
        let db = DbManager::from_connection(
            rusqlite::Connection::open_in_memory().expect("in-memory database"),
        );
        let mut results = SelectResult::default();
        db.get_tracks(&mut results, 1, "").expect("query faults are logged");
        assert!(results.is_empty());
        assert_eq!(db.get_track_count("").expect("query faults are logged"), 0);
        assert!(db.insert_track(&NewTrack::default()).is_err());
    }
}
