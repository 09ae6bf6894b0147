//! Seeded in-memory catalog shared by the database tests.

use crate::query::Database;
use rusqlite::{Connection, OpenFlags};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

const SCHEMA: &str = "
    CREATE TABLE release (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        released TEXT,
        country TEXT
    );
    CREATE TABLE fabric_releases (
        fabric_num INTEGER NOT NULL,
        fabric_live BOOLEAN NOT NULL,
        release_id INTEGER NOT NULL,
        title TEXT NOT NULL
    );
    CREATE TABLE fabric_release_artists (
        release_id INTEGER NOT NULL,
        artist_name TEXT,
        anv TEXT
    );
    CREATE TABLE fabric_tracks (
        release_id INTEGER NOT NULL,
        track_id INTEGER NOT NULL,
        track_sequence INTEGER NOT NULL,
        track_position TEXT,
        track_title TEXT
    );
    CREATE TABLE fabric_tracks_artists (
        track_id INTEGER NOT NULL,
        track_artist TEXT
    );
    CREATE TABLE fabric_release_blacklist (
        release_id INTEGER NOT NULL
    );
";

const DATA: &str = r#"
    INSERT INTO release VALUES
        (101, 'fabric 01', '1999-11-01', 'UK'),
        (102, 'fabric 02', '2000-01-01', 'UK'),
        (103, 'fabric 01 (Unofficial)', '2001-01-01', 'Russia'),
        (104, 'fabric 03', NULL, 'UK'),
        (201, 'FabricLive.01', '2001-10-01', 'UK');

    INSERT INTO fabric_releases VALUES
        (1, 0, 101, 'fabric 01'),
        (2, 0, 102, 'fabric 02'),
        (1, 0, 103, 'fabric 01 (Unofficial)'),
        (3, 0, 104, 'fabric 03, "Special"'),
        (1, 1, 201, 'FabricLive.01');

    INSERT INTO fabric_release_artists VALUES
        (101, 'Craig Richards (2)', 'Craig Richards'),
        (101, 'Terry Francis', NULL),
        (102, 'Terry Francis', ''),
        (103, 'Nobody', NULL),
        (104, 'Morgan Geist', 'Morgan "M" Geist'),
        (201, 'James Lavelle', NULL);

    INSERT INTO fabric_tracks VALUES
        (101, 1002, 2, 'A2', 'Track, Two'),
        (101, 1001, 1, 'A1', 'Track One'),
        (103, 3001, 1, '1', 'Bootleg'),
        (104, 4001, 1, '1', 'Quote "Me"'),
        (201, 2001, 1, '1', 'Live Cut');

    INSERT INTO fabric_tracks_artists VALUES
        (1001, '[]:[Ricardo Villalobos]'),
        (1001, '[Zip]:[Thomas Franzmann]'),
        (2001, '[]:[Unkle]');

    INSERT INTO fabric_release_blacklist VALUES (103);
"#;

/// Keeps the seeding connection open so the shared-cache database outlives
/// the per-query connections opened by the code under test.
pub struct FixtureDb {
    _seed: Connection,
    pub db: Database,
}

impl FixtureDb {
    pub fn seeded() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let uri = format!(
            "file:discogsdata-fixture-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            id
        );
        let seed = Connection::open_with_flags(&uri, OpenFlags::default()).unwrap();
        seed.execute_batch(SCHEMA).unwrap();
        seed.execute_batch(DATA).unwrap();
        Self {
            _seed: seed,
            db: Database::with_flags(uri, OpenFlags::default()),
        }
    }
}

/// In-memory log destination for asserting on emitted diagnostics.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber writing plain `ERROR`-and-above events into this buffer.
    pub fn error_subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::ERROR)
            .finish()
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(String::from).collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
