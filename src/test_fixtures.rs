//! In-memory catalog shared by unit tests.

use rusqlite::{params, Connection};

use crate::session::create_schema;

pub const ROOT_FOLDER: i64 = 1;
pub const ARTIST_FOLDER: i64 = 2;
pub const ALBUM_FOLDER: i64 = 3;
pub const KITCHEN_ROOT: i64 = 20;
pub const SONG_TRACK: i64 = 100;
pub const UNTITLED_TRACK: i64 = 101;
pub const CYCLE_TRACK: i64 = 300;

/// Library layout:
///
/// ```text
/// default:  Music(1) -> Artist(2) -> Album(3) {song.mp3, 04 Track.flac}
///           Music(1) -> Bach(4) {three Bach works}
/// kitchen:  Kitchen(20) -> Radio(21) {one track}
/// loop:     a(10) <-> b(11), track 300 inside a
/// ```
pub fn catalog_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory database should open");
    create_schema(&conn).expect("schema should be created");

    let folders: [(i64, i64, &str, &str); 8] = [
        (ROOT_FOLDER, -1, "Music", "default"),
        (ARTIST_FOLDER, ROOT_FOLDER, "Artist", "default"),
        (ALBUM_FOLDER, ARTIST_FOLDER, "Album", "default"),
        (4, ROOT_FOLDER, "Bach", "default"),
        (KITCHEN_ROOT, -1, "Kitchen", "kitchen"),
        (21, KITCHEN_ROOT, "Radio", "kitchen"),
        (10, 11, "a", "loop"),
        (11, 10, "b", "loop"),
    ];
    for (me, up, name, namespace) in folders {
        conn.execute(
            "INSERT INTO paths (me, up, name, namespace) VALUES (?1, ?2, ?3, ?4)",
            params![me, up, name, namespace],
        )
        .expect("folder fixture insert");
    }

    let tracks: [(i64, &str, &str, i64, i64, &str, &str); 7] = [
        (SONG_TRACK, "Song", "Artist", 2, ALBUM_FOLDER, "song.mp3", "default"),
        (UNTITLED_TRACK, "", "Artist", 1, ALBUM_FOLDER, "04 Track.flac", "default"),
        (102, "Toccata", "Bach, J.S.", 3, 4, "toccata.flac", "default"),
        (103, "Fugue", "Bach, J.S.", 1, 4, "fugue.flac", "default"),
        (104, "Chaconne", "Bach Ensemble", 2, 4, "chaconne.flac", "default"),
        (200, "News", "Bach Radio", 1, 21, "news.mp3", "kitchen"),
        (CYCLE_TRACK, "Spin", "Loop", 1, 10, "spin.wav", "loop"),
    ];
    for (id, title, artist, track, parent, fname, namespace) in tracks {
        conn.execute(
            "INSERT INTO tracks (id, title, artist, track, parent, fname, namespace)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, title, artist, track, parent, fname, namespace],
        )
        .expect("track fixture insert");
    }

    conn.execute(
        "INSERT INTO devices (alsa_name, friendly_name) VALUES (?1, ?2)",
        params!["hw:0,0", "Living Room DAC"],
    )
    .expect("device fixture insert");

    conn
}
