// 🧮 Statistics Engine - Every dashboard view from one snapshot
//
// Normalizes the snapshot once, then runs each aggregator independently.
// Each call is a full recomputation; nothing is cached between calls.

use crate::breakdown::MonthlyBreakdown;
use crate::bucketing::{MonthKey, TrailingWindow};
use crate::calendar::{CalendarMonth, DayIndex};
use crate::config::EngineConfig;
use crate::entry::LibraryEntry;
use crate::habits::{habits, HabitsStats};
use crate::normalize::normalize_all;
use crate::overview::{overview, OverviewStats};
use crate::taxonomy::{taxonomy, RankingPopulation, TaxonomyStats};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Caller-chosen view parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewParams {
    /// "Now" for the this-month figure
    pub today: NaiveDate,
    pub window: TrailingWindow,
}

impl ViewParams {
    pub fn new(today: NaiveDate, window: TrailingWindow) -> Self {
        ViewParams { today, window }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport<'a> {
    pub today: NaiveDate,
    pub overview: OverviewStats,
    pub habits: HabitsStats<'a>,
    pub genres: TaxonomyStats,
    pub wishlist: TaxonomyStats,
}

impl<'a> StatsReport<'a> {
    pub fn summary(&self) -> String {
        let top_genre = self
            .genres
            .categories
            .first()
            .map(|c| c.name.as_str())
            .unwrap_or("none");

        format!(
            "{}; {} months with completions (window {}), avg {} days per book; top genre: {}; {} on the wishlist",
            self.overview.summary(),
            self.habits.monthly.len(),
            self.habits.window,
            self.habits.speed.average_days,
            top_genre,
            self.wishlist.matched_entries
        )
    }
}

pub struct StatsEngine {
    pub config: EngineConfig,
}

impl StatsEngine {
    pub fn new() -> Self {
        StatsEngine {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        StatsEngine { config }
    }

    /// Params for `today` using the configured default window
    pub fn default_params(&self, today: NaiveDate) -> ViewParams {
        ViewParams::new(today, self.config.default_window)
    }

    pub fn compute<'a>(&self, entries: &'a [LibraryEntry], params: &ViewParams) -> StatsReport<'a> {
        let normalized = normalize_all(entries);
        debug!(
            "Computing statistics over {} entries (window {}, today {})",
            normalized.len(),
            params.window,
            params.today
        );

        StatsReport {
            today: params.today,
            overview: overview(&normalized, params.today),
            habits: habits(&normalized, params.window),
            genres: taxonomy(&normalized, RankingPopulation::Finished, self.config.author_limit),
            wishlist: taxonomy(&normalized, RankingPopulation::Wishlist, self.config.author_limit),
        }
    }

    pub fn overview(&self, entries: &[LibraryEntry], today: NaiveDate) -> OverviewStats {
        overview(&normalize_all(entries), today)
    }

    pub fn habits<'a>(&self, entries: &'a [LibraryEntry], window: TrailingWindow) -> HabitsStats<'a> {
        habits(&normalize_all(entries), window)
    }

    pub fn taxonomy(&self, entries: &[LibraryEntry], population: RankingPopulation) -> TaxonomyStats {
        taxonomy(&normalize_all(entries), population, self.config.author_limit)
    }

    pub fn calendar<'a>(&self, entries: &'a [LibraryEntry], month: MonthKey) -> CalendarMonth<'a> {
        DayIndex::build(&normalize_all(entries)).month_view(month, self.config.week_start)
    }

    /// Entries of the breakdown's selected month within the windowed series,
    /// after applying the default selection
    pub fn breakdown<'a>(
        &self,
        entries: &'a [LibraryEntry],
        window: TrailingWindow,
        selection: &mut MonthlyBreakdown,
    ) -> Vec<&'a LibraryEntry> {
        let normalized = normalize_all(entries);
        let series = crate::habits::monthly_series(&normalized, window);
        selection.sync(&series);
        selection.entries(&series, &normalized)
    }
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketing::RankedCount;
    use crate::entry::{ReadingStatus, ReviewRecord};
    use crate::overview::AverageRating;

    fn create_test_entry(
        title: &str,
        category: &str,
        status: ReadingStatus,
        rating: Option<f64>,
        dates: Option<(&str, &str)>,
    ) -> LibraryEntry {
        LibraryEntry::new(title, "Test Author")
            .with_category(category)
            .with_review(ReviewRecord {
                status: Some(status),
                rating,
                start_date: dates.map(|(s, _)| s.to_string()),
                end_date: dates.map(|(_, e)| e.to_string()),
                ..Default::default()
            })
    }

    fn params() -> ViewParams {
        ViewParams::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), TrailingWindow::SixMonths)
    }

    #[test]
    fn test_report_scenario() {
        let engine = StatsEngine::new();
        let entries = vec![
            create_test_entry("A", "Fiction", ReadingStatus::Finished, Some(5.0), None),
            create_test_entry("B", "Fiction", ReadingStatus::Finished, Some(3.0), None),
            create_test_entry("C", "Sci-Fi", ReadingStatus::WantToRead, None, None),
        ];

        let report = engine.compute(&entries, &params());

        assert_eq!(report.overview.status_counts.finished, 2);
        assert_eq!(report.overview.status_counts.want_to_read, 1);
        assert_eq!(report.overview.status_counts.reading, 0);
        assert_eq!(report.overview.status_counts.dropped, 0);
        assert_eq!(report.overview.average_rating, AverageRating::Value(4.0));
        assert_eq!(report.overview.average_rating.to_string(), "4.0");
        assert_eq!(report.genres.categories, vec![RankedCount { name: "Fiction".into(), count: 2 }]);
        assert_eq!(report.wishlist.categories, vec![RankedCount { name: "Sci-Fi".into(), count: 1 }]);

        println!("✅ Test passed: {}", report.summary());
    }

    #[test]
    fn test_report_empty_input() {
        let engine = StatsEngine::new();
        let report = engine.compute(&[], &params());

        assert_eq!(report.overview.total_entries, 0);
        assert_eq!(report.overview.status_counts.total(), 0);
        assert!(report.overview.average_rating.is_no_data());
        assert_eq!(report.overview.finished_this_month, 0);
        assert!(report.habits.monthly.is_empty());
        assert_eq!(report.habits.speed.average_days, 0);
        assert!(report.habits.speed.fastest.is_none());
        assert!(report.habits.speed.slowest.is_none());
        assert!(report.genres.categories.is_empty());
        assert!(report.wishlist.authors.is_empty());

        let calendar = engine.calendar(&[], MonthKey::new(2024, 6).unwrap());
        assert_eq!(calendar.finished_in_month(), 0);

        let mut selection = MonthlyBreakdown::new();
        assert!(engine.breakdown(&[], TrailingWindow::All, &mut selection).is_empty());
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_report_serializes() {
        let engine = StatsEngine::new();
        let entries = vec![create_test_entry(
            "A",
            "Fiction",
            ReadingStatus::Finished,
            Some(4.5),
            Some(("2024-06-01", "2024-06-05")),
        )];

        let report = engine.compute(&entries, &params());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["overview"]["average_rating"], "4.5");
        assert_eq!(json["overview"]["finished_this_month"], 1);
        assert_eq!(json["habits"]["window"], "6");
        assert_eq!(json["habits"]["monthly"][0]["month"], "2024-06");
        assert_eq!(json["habits"]["speed"]["fastest"]["days"], 4);
        assert_eq!(json["habits"]["speed"]["fastest"]["entry"]["title"], "A");
    }

    #[test]
    fn test_breakdown_defaults_and_lists() {
        let engine = StatsEngine::new();
        let entries = vec![
            create_test_entry("Old", "X", ReadingStatus::Finished, None, Some(("2024-04-01", "2024-04-02"))),
            create_test_entry("New A", "X", ReadingStatus::Finished, None, Some(("2024-05-01", "2024-05-03"))),
            create_test_entry("New B", "X", ReadingStatus::Finished, None, Some(("2024-05-01", "2024-05-20"))),
        ];

        let mut selection = MonthlyBreakdown::new();
        let listed = engine.breakdown(&entries, TrailingWindow::SixMonths, &mut selection);

        assert_eq!(selection.selected(), MonthKey::new(2024, 5));
        let titles: Vec<&str> = listed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["New B", "New A"]);
    }

    #[test]
    fn test_custom_author_limit() {
        let engine = StatsEngine::with_config(EngineConfig {
            author_limit: 1,
            ..Default::default()
        });
        let mut entries = vec![
            create_test_entry("A", "X", ReadingStatus::Finished, None, None),
            create_test_entry("B", "X", ReadingStatus::Finished, None, None),
        ];
        entries[1].author = "Someone Else".to_string();

        let genres = engine.taxonomy(&entries, RankingPopulation::Finished);
        assert_eq!(genres.authors.len(), 1);
        assert_eq!(genres.authors[0].name, "Test Author");
    }
}
