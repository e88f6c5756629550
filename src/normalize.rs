// 🧹 Entry Normalizer - One pass that applies every aggregation default
//
// Status defaulting, category fallback, rating guard and date parsing all
// happen here, once, so every aggregator sees the same view of an entry.
// Absence is the only error channel: nothing in this module fails.

use crate::entry::{LibraryEntry, ReadingStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;

/// Category used wherever an entry has none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Read-only view of a `LibraryEntry` with defaults applied
#[derive(Debug, Clone, Copy)]
pub struct NormalizedEntry<'a> {
    pub entry: &'a LibraryEntry,
    pub status: ReadingStatus,
    /// Present only when the stored rating is > 0
    pub rating: Option<f64>,
    pub category: &'a str,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl<'a> NormalizedEntry<'a> {
    pub fn is(&self, status: ReadingStatus) -> bool {
        self.status == status
    }

    /// Finished with a usable completion date
    pub fn finished_on(&self) -> Option<NaiveDate> {
        if self.status == ReadingStatus::Finished {
            self.end_date
        } else {
            None
        }
    }

    /// Whole days between start and end, only when end >= start
    pub fn reading_days(&self) -> Option<i64> {
        let start = self.start_date?;
        let end = self.end_date?;
        let days = (end - start).num_days();
        if days >= 0 {
            Some(days)
        } else {
            debug!(
                "Skipping reading-speed sample for '{}': end {} before start {}",
                self.entry.title, end, start
            );
            None
        }
    }
}

pub fn normalize(entry: &LibraryEntry) -> NormalizedEntry<'_> {
    let review = entry.review.as_ref();

    let status = review
        .and_then(|r| r.status)
        .unwrap_or(ReadingStatus::WantToRead);

    let rating = review.and_then(|r| r.rating).filter(|r| *r > 0.0);

    let category = entry.category.as_deref().unwrap_or(UNCATEGORIZED);

    let start_date = review
        .and_then(|r| r.start_date.as_deref())
        .and_then(|raw| parse_field(entry, "start_date", raw));
    let end_date = review
        .and_then(|r| r.end_date.as_deref())
        .and_then(|raw| parse_field(entry, "end_date", raw));

    NormalizedEntry {
        entry,
        status,
        rating,
        category,
        start_date,
        end_date,
    }
}

pub fn normalize_all(entries: &[LibraryEntry]) -> Vec<NormalizedEntry<'_>> {
    entries.iter().map(normalize).collect()
}

fn parse_field(entry: &LibraryEntry, field: &str, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_date(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        debug!("Ignoring unparsable {} '{}' on '{}'", field, raw, entry.title);
    }
    parsed
}

/// Parse the date forms the journal stores
///
/// Accepts YYYY-MM-DD, RFC 3339 timestamps (date as written), naive
/// YYYY-MM-DDTHH:MM:SS[.f] and MM/DD/YYYY. Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ReviewRecord;

    fn create_test_entry(status: Option<ReadingStatus>, rating: Option<f64>) -> LibraryEntry {
        LibraryEntry::new("Test Book", "Test Author").with_review(ReviewRecord {
            status,
            rating,
            ..Default::default()
        })
    }

    #[test]
    fn test_status_defaults_to_want_to_read() {
        let no_review = LibraryEntry::new("Dune", "Frank Herbert");
        assert_eq!(normalize(&no_review).status, ReadingStatus::WantToRead);

        let no_status = create_test_entry(None, Some(4.0));
        assert_eq!(normalize(&no_status).status, ReadingStatus::WantToRead);

        // Input stays untouched
        assert_eq!(no_status.review.as_ref().unwrap().status, None);
    }

    #[test]
    fn test_category_fallback() {
        let entry = LibraryEntry::new("Dune", "Frank Herbert");
        assert_eq!(normalize(&entry).category, UNCATEGORIZED);

        let entry = entry.with_category("Sci-Fi");
        assert_eq!(normalize(&entry).category, "Sci-Fi");
    }

    #[test]
    fn test_rating_guard() {
        assert_eq!(normalize(&create_test_entry(None, Some(0.0))).rating, None);
        assert_eq!(normalize(&create_test_entry(None, Some(-1.0))).rating, None);
        assert_eq!(normalize(&create_test_entry(None, Some(f64::NAN))).rating, None);
        assert_eq!(normalize(&create_test_entry(None, None)).rating, None);
        assert_eq!(normalize(&create_test_entry(None, Some(3.5))).rating, Some(3.5));
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date(" 2024-03-05 "), Some(expected));
        assert_eq!(parse_date("2024-03-05T22:15:00+09:00"), Some(expected));
        assert_eq!(parse_date("2024-03-05T08:00:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-05T08:00:00.123"), Some(expected));
        assert_eq!(parse_date("03/05/2024"), Some(expected));

        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn test_bad_date_only_drops_that_field() {
        let entry = LibraryEntry::new("Dune", "Frank Herbert").with_review(ReviewRecord {
            status: Some(ReadingStatus::Finished),
            start_date: Some("not a date".to_string()),
            end_date: Some("2024-01-10".to_string()),
            ..Default::default()
        });

        let normalized = normalize(&entry);
        assert_eq!(normalized.start_date, None);
        assert_eq!(normalized.end_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(normalized.finished_on(), normalized.end_date);
        assert_eq!(normalized.reading_days(), None);
    }

    #[test]
    fn test_reading_days() {
        let mut review = ReviewRecord {
            status: Some(ReadingStatus::Finished),
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-01-11".to_string()),
            ..Default::default()
        };
        let entry = LibraryEntry::new("A", "B").with_review(review.clone());
        assert_eq!(normalize(&entry).reading_days(), Some(10));

        review.end_date = Some("2024-01-01".to_string());
        let same_day = LibraryEntry::new("A", "B").with_review(review.clone());
        assert_eq!(normalize(&same_day).reading_days(), Some(0));

        review.end_date = Some("2023-12-31".to_string());
        let backwards = LibraryEntry::new("A", "B").with_review(review);
        assert_eq!(normalize(&backwards).reading_days(), None);
    }

    #[test]
    fn test_finished_on_requires_finished_status() {
        let entry = LibraryEntry::new("A", "B").with_review(ReviewRecord {
            status: Some(ReadingStatus::Dropped),
            end_date: Some("2024-01-11".to_string()),
            ..Default::default()
        });
        assert_eq!(normalize(&entry).finished_on(), None);
    }
}
