//! Fixed report queries over the fabric catalog relations.
//!
//! Both queries take exactly two positional parameters: `?1` is the catalog
//! number and `?2` the `fabric_live` flag. Artist credits are aggregated as
//! `[anv]:[artist_name]` pairs for [`crate::normalize`] to resolve.
//!
//! Credits are joined in insertion order with `group_concat(... ORDER BY
//! rowid)`. That needs SQLite 3.44 or newer (the bundled build qualifies),
//! and `fabric_release_artists` and `fabric_tracks_artists` must be ordinary
//! rowid tables: views or `WITHOUT ROWID` tables fail at prepare time.

use crate::models::{Field, Record, Series};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, error, info};

pub const FABRIC_RELEASE_QUERY: &str = "
    SELECT
        fr.fabric_num AS fabric_num,
        fr.release_id AS release_id,
        fr.title AS release_title,
        group_concat(
            '[' || coalesce(fra.anv, '') || ']:[' || coalesce(fra.artist_name, '') || ']',
            ', ' ORDER BY fra.rowid
        ) AS release_artist,
        max(r.released) AS release_date,
        max(r.country) AS release_country
    FROM fabric_releases fr
    JOIN fabric_release_artists fra ON fra.release_id = fr.release_id
    JOIN release r ON r.id = fr.release_id
    WHERE fr.fabric_num = ?1
      AND fr.fabric_live = ?2
      AND fr.release_id NOT IN (SELECT release_id FROM fabric_release_blacklist)
    GROUP BY fr.release_id, fr.fabric_num, fr.title
    ORDER BY fr.release_id
";

pub const FABRIC_TRACK_QUERY: &str = "
    WITH fabric_release AS (
        SELECT
            fr.fabric_num AS fabric_num,
            fr.release_id AS release_id,
            fr.title AS release_title,
            group_concat(
                '[' || coalesce(fra.anv, '') || ']:[' || coalesce(fra.artist_name, '') || ']',
                ', ' ORDER BY fra.rowid
            ) AS release_artist
        FROM fabric_releases fr
        JOIN fabric_release_artists fra ON fra.release_id = fr.release_id
        WHERE fr.fabric_num = ?1
          AND fr.fabric_live = ?2
          AND fr.release_id NOT IN (SELECT release_id FROM fabric_release_blacklist)
        GROUP BY fr.release_id, fr.fabric_num, fr.title
    ),
    track_credits AS (
        SELECT track_id, group_concat(track_artist, ' ' ORDER BY rowid) AS track_artists
        FROM fabric_tracks_artists
        GROUP BY track_id
    )
    SELECT
        fabric_release.*,
        ft.track_id AS track_id,
        ft.track_sequence AS track_sequence,
        ft.track_position AS track_position,
        ft.track_title AS track_title,
        tc.track_artists AS track_artists
    FROM fabric_release
    JOIN fabric_tracks ft ON ft.release_id = fabric_release.release_id
    LEFT JOIN track_credits tc ON tc.track_id = ft.track_id
    ORDER BY fabric_release.release_id, ft.track_sequence
";

/// Which of the two fixed reports to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Release,
    Tracks,
}

impl Report {
    pub fn sql(self) -> &'static str {
        match self {
            Report::Release => FABRIC_RELEASE_QUERY,
            Report::Tracks => FABRIC_TRACK_QUERY,
        }
    }

    /// Word used in diagnostics ("No tracks for fabric release: 7").
    pub fn label(self) -> &'static str {
        match self {
            Report::Release => "info",
            Report::Tracks => "tracks",
        }
    }
}

/// Location of the catalog database plus the flags used to open it.
#[derive(Debug, Clone)]
pub struct Database {
    location: String,
    flags: OpenFlags,
}

impl Database {
    /// Read-only access to a file path or `file:` URI.
    pub fn new(location: impl Into<String>) -> Self {
        Self::with_flags(
            location,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    pub fn with_flags(location: impl Into<String>, flags: OpenFlags) -> Self {
        Self {
            location: location.into(),
            flags,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn connect(&self) -> Result<Connection> {
        Connection::open_with_flags(&self.location, self.flags)
            .with_context(|| format!("Failed to open database: {}", self.location))
    }
}

/// Run `report` for one catalog number, handing each record to `emit`.
///
/// A connection is opened for this call only and closed before returning.
/// When `headers` is set the column names are emitted first, even if no row
/// matches. An empty result is logged and reported as `Ok(0)`.
pub fn run_report<F>(
    db: &Database,
    report: Report,
    number: u32,
    series: Series,
    headers: bool,
    mut emit: F,
) -> Result<usize>
where
    F: FnMut(Record) -> Result<()>,
{
    info!("Extracting {} for {} release {}", report.label(), series, number);

    let conn = db.connect()?;
    let count = {
        let mut stmt = conn
            .prepare(report.sql())
            .with_context(|| format!("Failed to prepare {} query", report.label()))?;

        if headers {
            let columns = stmt.column_names().into_iter().map(String::from).collect();
            emit(Record::Header(columns))?;
        }

        let column_count = stmt.column_count();
        let mut rows = stmt
            .query(params![number, series.is_live()])
            .with_context(|| format!("Failed to run {} query", report.label()))?;

        let mut count = 0;
        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                fields.push(Field::from(row.get_ref(idx)?));
            }
            emit(Record::Row(fields))?;
            count += 1;
        }
        count
    };
    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close database connection")?;

    if count == 0 {
        error!("No {} for {} release: {}", report.label(), series, number);
    } else {
        debug!("{} rows for {} release {}", count, series, number);
    }
    Ok(count)
}
