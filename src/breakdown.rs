// 🔎 Monthly Breakdown Selector - Which month's books are on screen
//
// The selected month is caller-held state. The selector only decides the
// default (most recent bucket) and lists the Finished entries of whatever
// month is selected.
//
// A selection that falls out of a re-windowed series is left in place and
// lists nothing; `is_stale` lets the caller notice and reselect.

use crate::bucketing::MonthKey;
use crate::entry::LibraryEntry;
use crate::habits::MonthlyPoint;
use crate::normalize::NormalizedEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    selected: Option<MonthKey>,
}

impl MonthlyBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<MonthKey> {
        self.selected
    }

    /// Default to the most recent bucket when nothing is selected yet
    pub fn sync(&mut self, series: &[MonthlyPoint]) {
        if self.selected.is_none() {
            self.selected = series.last().map(|p| p.month);
        }
    }

    pub fn select(&mut self, month: MonthKey) {
        self.selected = Some(month);
    }

    /// Selection exists but is not a bucket of `series`
    pub fn is_stale(&self, series: &[MonthlyPoint]) -> bool {
        match self.selected {
            Some(month) => !series.iter().any(|p| p.month == month),
            None => false,
        }
    }

    pub fn selected_point<'s>(&self, series: &'s [MonthlyPoint]) -> Option<&'s MonthlyPoint> {
        let month = self.selected?;
        series.iter().find(|p| p.month == month)
    }

    /// Finished entries of the selected month, newest end date first
    ///
    /// Empty when nothing is selected or the selection is not in `series`.
    pub fn entries<'a>(
        &self,
        series: &[MonthlyPoint],
        entries: &[NormalizedEntry<'a>],
    ) -> Vec<&'a LibraryEntry> {
        match self.selected_point(series) {
            Some(point) => entries_in_month(entries, point.month),
            None => Vec::new(),
        }
    }
}

pub fn entries_in_month<'a>(entries: &[NormalizedEntry<'a>], month: MonthKey) -> Vec<&'a LibraryEntry> {
    let mut matched: Vec<(chrono::NaiveDate, &'a LibraryEntry)> = entries
        .iter()
        .filter_map(|e| e.finished_on().map(|d| (d, e.entry)))
        .filter(|(d, _)| month.contains(*d))
        .collect();

    matched.sort_by_key(|(d, _)| Reverse(*d));
    matched.into_iter().map(|(_, entry)| entry).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketing::TrailingWindow;
    use crate::entry::{ReadingStatus, ReviewRecord};
    use crate::habits::monthly_series;
    use crate::normalize::normalize_all;

    fn finished_on(title: &str, end: &str) -> LibraryEntry {
        LibraryEntry::new(title, "Test Author").with_review(ReviewRecord {
            status: Some(ReadingStatus::Finished),
            end_date: Some(end.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_defaults_to_most_recent_bucket() {
        let entries = vec![
            finished_on("Early", "2024-03-02"),
            finished_on("Late", "2024-03-20"),
        ];
        let normalized = normalize_all(&entries);
        let series = monthly_series(&normalized, TrailingWindow::SixMonths);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 2);

        let mut breakdown = MonthlyBreakdown::new();
        breakdown.sync(&series);
        assert_eq!(breakdown.selected(), MonthKey::new(2024, 3));
        assert_eq!(breakdown.selected_point(&series).unwrap().count, 2);

        let titles: Vec<&str> = breakdown
            .entries(&series, &normalized)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Late", "Early"]);
    }

    #[test]
    fn test_sync_keeps_explicit_selection() {
        let entries = vec![
            finished_on("Jan", "2024-01-10"),
            finished_on("Feb", "2024-02-10"),
        ];
        let normalized = normalize_all(&entries);
        let series = monthly_series(&normalized, TrailingWindow::All);

        let mut breakdown = MonthlyBreakdown::new();
        breakdown.select(MonthKey::new(2024, 1).unwrap());
        breakdown.sync(&series);

        assert_eq!(breakdown.selected(), MonthKey::new(2024, 1));
        assert_eq!(breakdown.entries(&series, &normalized)[0].title, "Jan");
    }

    #[test]
    fn test_stale_selection_left_in_place() {
        let entries: Vec<LibraryEntry> = (1..=8)
            .map(|m| finished_on(&format!("M{}", m), &format!("2024-{:02}-01", m)))
            .collect();
        let normalized = normalize_all(&entries);

        let mut breakdown = MonthlyBreakdown::new();
        breakdown.select(MonthKey::new(2024, 1).unwrap());

        let six = monthly_series(&normalized, TrailingWindow::SixMonths);
        breakdown.sync(&six);

        assert!(breakdown.is_stale(&six));
        assert_eq!(breakdown.selected(), MonthKey::new(2024, 1));
        assert!(breakdown.selected_point(&six).is_none());

        assert!(breakdown.entries(&six, &normalized).is_empty());

        let all = monthly_series(&normalized, TrailingWindow::All);
        assert!(!breakdown.is_stale(&all));
        assert_eq!(breakdown.entries(&all, &normalized).len(), 1);
    }

    #[test]
    fn test_empty_series() {
        let mut breakdown = MonthlyBreakdown::new();
        breakdown.sync(&[]);

        assert_eq!(breakdown.selected(), None);
        assert!(!breakdown.is_stale(&[]));
        assert!(breakdown.entries(&[], &[]).is_empty());
    }

    #[test]
    fn test_entries_in_month_ignores_other_statuses() {
        let mut reading = finished_on("Reading", "2024-04-10");
        reading.review.as_mut().unwrap().status = Some(ReadingStatus::Reading);
        let entries = vec![reading, finished_on("Done", "2024-04-11")];

        let listed = entries_in_month(&normalize_all(&entries), MonthKey::new(2024, 4).unwrap());
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Done");
    }
}
