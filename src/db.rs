// 🗄️ Library Store - Loaders and a local SQLite snapshot
//
// Stands in for the journal's persistence layer. The engine never touches
// this module; binaries use it to get a `Vec<LibraryEntry>` to aggregate.
//
// Row order is insertion order (rowid), which keeps every first-seen
// tie-break in the engine reproducible across runs.

use crate::entry::{default_uuid, LibraryEntry, ReadingStatus, ReviewRecord};
use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// FILE LOADERS
// ============================================================================

/// Flat CSV row:
/// id,title,author,category,status,rating,start_date,end_date,review
#[derive(Debug, Deserialize)]
struct CsvEntryRow {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rating: Option<f64>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    review: Option<String>,
}

impl CsvEntryRow {
    fn into_entry(self) -> LibraryEntry {
        let status = self.status.as_deref().and_then(|raw| match raw.parse::<ReadingStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                debug!("'{}': {}", self.title, e);
                None
            }
        });

        let has_review = status.is_some()
            || self.rating.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.review.is_some();

        LibraryEntry {
            id: self.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(default_uuid),
            title: self.title,
            author: self.author.unwrap_or_default(),
            category: self.category,
            review: has_review.then(|| ReviewRecord {
                status,
                rating: self.rating,
                start_date: self.start_date,
                end_date: self.end_date,
                review_text: self.review,
                notes: None,
            }),
        }
    }
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<LibraryEntry>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut entries = Vec::new();
    for result in rdr.deserialize() {
        let row: CsvEntryRow = result.context("Failed to deserialize library entry")?;
        entries.push(row.into_entry());
    }

    info!("Loaded {} entries from {:?}", entries.len(), csv_path);
    Ok(entries)
}

/// JSON array of `LibraryEntry`
pub fn load_json(json_path: &Path) -> Result<Vec<LibraryEntry>> {
    let raw = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read {:?}", json_path))?;
    let entries: Vec<LibraryEntry> =
        serde_json::from_str(&raw).context("Failed to parse library entries JSON")?;

    info!("Loaded {} entries from {:?}", entries.len(), json_path);
    Ok(entries)
}

/// Pick a loader by file extension (.json, anything else as CSV)
pub fn load_entries(path: &Path) -> Result<Vec<LibraryEntry>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_csv(path),
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            category TEXT,
            has_review INTEGER NOT NULL DEFAULT 0,
            status TEXT,
            rating REAL,
            start_date TEXT,
            end_date TEXT,
            review_text TEXT,
            notes TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_status ON entries(status)",
        [],
    )?;

    Ok(())
}

/// Insert or update by id; returns rows written
pub fn insert_entries(conn: &Connection, entries: &[LibraryEntry]) -> Result<usize> {
    let mut written = 0;

    for entry in entries {
        let review = entry.review.as_ref();
        written += conn
            .execute(
                "INSERT INTO entries (
                    id, title, author, category, has_review,
                    status, rating, start_date, end_date, review_text, notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    author = excluded.author,
                    category = excluded.category,
                    has_review = excluded.has_review,
                    status = excluded.status,
                    rating = excluded.rating,
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    review_text = excluded.review_text,
                    notes = excluded.notes",
                params![
                    entry.id,
                    entry.title,
                    entry.author,
                    entry.category,
                    review.is_some(),
                    review.and_then(|r| r.status).map(|s| s.as_str()),
                    review.and_then(|r| r.rating),
                    review.and_then(|r| r.start_date.clone()),
                    review.and_then(|r| r.end_date.clone()),
                    review.and_then(|r| r.review_text.clone()),
                    review.and_then(|r| r.notes.clone()),
                ],
            )
            .with_context(|| format!("Failed to store entry '{}'", entry.title))?;
    }

    info!("Stored {} entries", written);
    Ok(written)
}

pub fn get_all_entries(conn: &Connection) -> Result<Vec<LibraryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, author, category, has_review,
                status, rating, start_date, end_date, review_text, notes
         FROM entries
         ORDER BY rowid ASC",
    )?;

    let entries = stmt
        .query_map([], |row| {
            let has_review: bool = row.get(4)?;
            let status: Option<String> = row.get(5)?;

            let review = if has_review {
                Some(ReviewRecord {
                    status: status.and_then(|s| s.parse().ok()),
                    rating: row.get(6)?,
                    start_date: row.get(7)?,
                    end_date: row.get(8)?,
                    review_text: row.get(9)?,
                    notes: row.get(10)?,
                })
            } else {
                None
            };

            Ok(LibraryEntry {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                category: row.get(3)?,
                review,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
