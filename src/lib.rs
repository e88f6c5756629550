// Reading Stats - Core Library
// Reading-journal statistics engine, exposed for the CLI, API server, and tests

pub mod entry;
pub mod normalize;
pub mod bucketing;
pub mod overview;
pub mod habits;
pub mod taxonomy;
pub mod calendar;
pub mod breakdown;
pub mod report;
pub mod config;
pub mod db;

// Re-export commonly used types
pub use entry::{LibraryEntry, ReadingStatus, ReviewRecord};
pub use normalize::{normalize, normalize_all, parse_date, NormalizedEntry, UNCATEGORIZED};
pub use bucketing::{
    frequency_count, month_buckets, top_n, MonthKey, RankedCount, TrailingWindow,
};
pub use overview::{overview, AverageRating, OverviewStats, RatingBucket, StatusCounts};
pub use habits::{
    habits, monthly_series, monthly_series_all, reading_speed,
    HabitsStats, MonthlyPoint, ReadingSpeed, SpeedSample,
};
pub use taxonomy::{taxonomy, RankingPopulation, TaxonomyStats, AUTHOR_LIMIT};
pub use calendar::{calendar_month, CalendarDay, CalendarMonth, DayDetail, DayIndex, WeekStart};
pub use breakdown::{entries_in_month, MonthlyBreakdown};
pub use report::{StatsEngine, StatsReport, ViewParams};
pub use config::EngineConfig;
pub use db::{
    load_csv, load_json, load_entries,
    setup_database, insert_entries, get_all_entries, verify_count,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
