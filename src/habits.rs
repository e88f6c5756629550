// 📈 Habits Aggregator - Monthly completions and reading speed
//
// Monthly series: Finished entries with a parseable end date, one bucket per
// calendar month, ascending, then cut to the trailing window.
//
// Reading speed: every entry whose start and end dates both parse and are
// in order. Extremes are a single fold with strict comparisons, so on equal
// day counts the first entry encountered wins for both fastest and slowest.

use crate::bucketing::{month_buckets, MonthKey, TrailingWindow};
use crate::entry::LibraryEntry;
use crate::normalize::NormalizedEntry;
use serde::Serialize;

// ============================================================================
// MONTHLY SERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    pub month: MonthKey,
    /// e.g. "Mar 2024"
    pub label: String,
    pub count: usize,
}

/// Full ascending series, no window applied
pub fn monthly_series_all(entries: &[NormalizedEntry<'_>]) -> Vec<MonthlyPoint> {
    month_buckets(entries.iter(), |e| e.finished_on())
        .into_iter()
        .map(|(month, bucket)| MonthlyPoint {
            month,
            label: month.label(),
            count: bucket.len(),
        })
        .collect()
}

pub fn monthly_series(entries: &[NormalizedEntry<'_>], window: TrailingWindow) -> Vec<MonthlyPoint> {
    let all = monthly_series_all(entries);
    window.apply(&all).to_vec()
}

// ============================================================================
// READING SPEED
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedSample<'a> {
    pub entry: &'a LibraryEntry,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingSpeed<'a> {
    /// Rounded mean; 0 when there are no samples
    pub average_days: i64,
    pub sample_count: usize,
    pub fastest: Option<SpeedSample<'a>>,
    pub slowest: Option<SpeedSample<'a>>,
}

impl<'a> ReadingSpeed<'a> {
    pub fn empty() -> Self {
        ReadingSpeed {
            average_days: 0,
            sample_count: 0,
            fastest: None,
            slowest: None,
        }
    }
}

struct SpeedFold<'a> {
    total_days: i64,
    count: usize,
    fastest: Option<SpeedSample<'a>>,
    slowest: Option<SpeedSample<'a>>,
}

pub fn reading_speed<'a>(entries: &[NormalizedEntry<'a>]) -> ReadingSpeed<'a> {
    let init = SpeedFold {
        total_days: 0,
        count: 0,
        fastest: None,
        slowest: None,
    };

    let fold = entries
        .iter()
        .filter_map(|e| {
            e.reading_days().map(|days| SpeedSample {
                entry: e.entry,
                days,
            })
        })
        .fold(init, |mut acc, sample| {
            acc.total_days += sample.days;
            acc.count += 1;

            // Strict comparisons: an equal later sample never displaces the first
            if acc.fastest.map_or(true, |f| sample.days < f.days) {
                acc.fastest = Some(sample);
            }
            if acc.slowest.map_or(true, |s| sample.days > s.days) {
                acc.slowest = Some(sample);
            }
            acc
        });

    if fold.count == 0 {
        return ReadingSpeed::empty();
    }

    ReadingSpeed {
        average_days: (fold.total_days as f64 / fold.count as f64).round() as i64,
        sample_count: fold.count,
        fastest: fold.fastest,
        slowest: fold.slowest,
    }
}

// ============================================================================
// HABITS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitsStats<'a> {
    pub window: TrailingWindow,
    pub monthly: Vec<MonthlyPoint>,
    pub speed: ReadingSpeed<'a>,
}

pub fn habits<'a>(entries: &[NormalizedEntry<'a>], window: TrailingWindow) -> HabitsStats<'a> {
    HabitsStats {
        window,
        monthly: monthly_series(entries, window),
        speed: reading_speed(entries),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ReadingStatus, ReviewRecord};
    use crate::normalize::normalize_all;

    fn create_test_entry(title: &str, status: ReadingStatus, start: Option<&str>, end: Option<&str>) -> LibraryEntry {
        LibraryEntry::new(title, "Test Author").with_review(ReviewRecord {
            status: Some(status),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            ..Default::default()
        })
    }

    fn finished_on(title: &str, end: &str) -> LibraryEntry {
        create_test_entry(title, ReadingStatus::Finished, None, Some(end))
    }

    #[test]
    fn test_monthly_series_groups_and_sorts() {
        let entries = vec![
            finished_on("A", "2024-03-10"),
            finished_on("B", "2023-12-01"),
            finished_on("C", "2024-03-28"),
            finished_on("D", "not-a-date"),
            create_test_entry("E", ReadingStatus::Reading, None, Some("2024-03-15")),
        ];
        let series = monthly_series_all(&normalize_all(&entries));

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Dec 2023");
        assert_eq!(series[0].count, 1);
        assert_eq!(series[1].label, "Mar 2024");
        assert_eq!(series[1].count, 2);
    }

    #[test]
    fn test_monthly_series_window_is_suffix() {
        let entries: Vec<LibraryEntry> = (1..=9)
            .map(|m| finished_on(&format!("Book {}", m), &format!("2024-{:02}-05", m)))
            .collect();
        let normalized = normalize_all(&entries);

        let all = monthly_series(&normalized, TrailingWindow::All);
        let six = monthly_series(&normalized, TrailingWindow::SixMonths);
        let twelve = monthly_series(&normalized, TrailingWindow::TwelveMonths);

        assert_eq!(all.len(), 9);
        assert_eq!(six.as_slice(), &all[3..]);
        assert_eq!(twelve, all);
    }

    #[test]
    fn test_reading_speed_average_and_extremes() {
        let entries = vec![
            create_test_entry("Ten", ReadingStatus::Finished, Some("2024-01-01"), Some("2024-01-11")),
            create_test_entry("Three", ReadingStatus::Finished, Some("2024-02-01"), Some("2024-02-04")),
            create_test_entry("Twenty", ReadingStatus::Finished, Some("2024-03-01"), Some("2024-03-21")),
        ];
        let speed = reading_speed(&normalize_all(&entries));

        // 33 / 3 = 11
        assert_eq!(speed.average_days, 11);
        assert_eq!(speed.sample_count, 3);
        assert_eq!(speed.fastest.unwrap().entry.title, "Three");
        assert_eq!(speed.fastest.unwrap().days, 3);
        assert_eq!(speed.slowest.unwrap().entry.title, "Twenty");
        assert_eq!(speed.slowest.unwrap().days, 20);
    }

    #[test]
    fn test_reading_speed_rounds_mean() {
        let entries = vec![
            create_test_entry("One", ReadingStatus::Finished, Some("2024-01-01"), Some("2024-01-02")),
            create_test_entry("Two", ReadingStatus::Finished, Some("2024-01-01"), Some("2024-01-03")),
        ];
        // 1.5 rounds up
        assert_eq!(reading_speed(&normalize_all(&entries)).average_days, 2);
    }

    #[test]
    fn test_reading_speed_ties_first_encountered_wins() {
        let entries = vec![
            create_test_entry("First", ReadingStatus::Finished, Some("2024-01-01"), Some("2024-01-06")),
            create_test_entry("Second", ReadingStatus::Finished, Some("2024-02-01"), Some("2024-02-06")),
            create_test_entry("Third", ReadingStatus::Finished, Some("2024-03-01"), Some("2024-03-06")),
        ];
        let speed = reading_speed(&normalize_all(&entries));

        assert_eq!(speed.fastest.unwrap().entry.title, "First");
        assert_eq!(speed.slowest.unwrap().entry.title, "First");
    }

    #[test]
    fn test_start_after_end_is_excluded() {
        let entries = vec![
            create_test_entry("Backwards", ReadingStatus::Finished, Some("2024-05-10"), Some("2024-05-01")),
            create_test_entry("Normal", ReadingStatus::Finished, Some("2024-05-01"), Some("2024-05-05")),
        ];
        let speed = reading_speed(&normalize_all(&entries));

        assert_eq!(speed.sample_count, 1);
        assert_eq!(speed.average_days, 4);
        assert_eq!(speed.fastest.unwrap().entry.title, "Normal");
        assert_eq!(speed.slowest.unwrap().entry.title, "Normal");
    }

    #[test]
    fn test_reading_speed_counts_any_status_with_both_dates() {
        let entries = vec![
            create_test_entry("Done", ReadingStatus::Finished, Some("2024-05-01"), Some("2024-05-05")),
            create_test_entry("Abandoned", ReadingStatus::Dropped, Some("2024-01-01"), Some("2024-03-01")),
            create_test_entry("Current", ReadingStatus::Reading, Some("2024-06-01"), Some("2024-06-02")),
            create_test_entry("Someday", ReadingStatus::WantToRead, None, None),
        ];
        let speed = reading_speed(&normalize_all(&entries));

        assert_eq!(speed.sample_count, 3);
        assert_eq!(speed.fastest.unwrap().entry.title, "Current");
        assert_eq!(speed.slowest.unwrap().entry.title, "Abandoned");
        assert_eq!(speed.slowest.unwrap().days, 60);
    }

    #[test]
    fn test_single_sample_is_fastest_and_slowest() {
        let entries = vec![create_test_entry(
            "Only",
            ReadingStatus::Finished,
            Some("2024-05-01"),
            Some("2024-05-01"),
        )];
        let speed = reading_speed(&normalize_all(&entries));

        assert_eq!(speed.average_days, 0);
        assert_eq!(speed.fastest, speed.slowest);
        assert_eq!(speed.fastest.unwrap().days, 0);
    }

    #[test]
    fn test_empty_habits() {
        let stats = habits(&[], TrailingWindow::SixMonths);

        assert!(stats.monthly.is_empty());
        assert_eq!(stats.speed, ReadingSpeed::empty());
        assert_eq!(stats.speed.average_days, 0);
        assert!(stats.speed.fastest.is_none());
        assert!(stats.speed.slowest.is_none());
    }
}
