// 📊 Overview Aggregator - Status breakdown, average rating, this month
//
// "Today" is always passed in. Nothing here reads the wall clock, so the
// this-month figure is deterministic under test.

use crate::bucketing::MonthKey;
use crate::entry::ReadingStatus;
use crate::normalize::NormalizedEntry;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// STATUS COUNTS
// ============================================================================

/// Entry count for each of the four statuses, zero-filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub want_to_read: usize,
    pub reading: usize,
    pub finished: usize,
    pub dropped: usize,
}

impl StatusCounts {
    pub fn get(&self, status: ReadingStatus) -> usize {
        match status {
            ReadingStatus::WantToRead => self.want_to_read,
            ReadingStatus::Reading => self.reading,
            ReadingStatus::Finished => self.finished,
            ReadingStatus::Dropped => self.dropped,
        }
    }

    fn bump(&mut self, status: ReadingStatus) {
        match status {
            ReadingStatus::WantToRead => self.want_to_read += 1,
            ReadingStatus::Reading => self.reading += 1,
            ReadingStatus::Finished => self.finished += 1,
            ReadingStatus::Dropped => self.dropped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.want_to_read + self.reading + self.finished + self.dropped
    }

    /// All four statuses in fixed order
    pub fn iter(&self) -> impl Iterator<Item = (ReadingStatus, usize)> + '_ {
        ReadingStatus::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Statuses worth a chart slice (count > 0), fixed order
    pub fn non_zero(&self) -> Vec<(ReadingStatus, usize)> {
        self.iter().filter(|(_, count)| *count > 0).collect()
    }
}

// ============================================================================
// AVERAGE RATING
// ============================================================================

/// Average rating, or an explicit "no data" marker
///
/// Serializes as the display string: "N/A" or a one-decimal number ("4.0").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageRating {
    NoData,
    Value(f64),
}

impl AverageRating {
    pub fn from_ratings(ratings: impl IntoIterator<Item = f64>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));

        if count == 0 {
            AverageRating::NoData
        } else {
            AverageRating::Value(round_one_decimal(sum / count as f64))
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            AverageRating::NoData => None,
            AverageRating::Value(v) => Some(*v),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, AverageRating::NoData)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageRating::NoData => f.write_str("N/A"),
            AverageRating::Value(v) => write!(f, "{:.1}", v),
        }
    }
}

impl Serialize for AverageRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// RATING HISTOGRAM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    /// 0.5, 1.0, ... 5.0
    pub rating: f64,
    pub count: usize,
}

/// Ten half-star buckets over Finished entries with a rating
pub fn rating_histogram(entries: &[NormalizedEntry<'_>]) -> Vec<RatingBucket> {
    let mut counts = [0usize; 10];

    for rating in finished_ratings(entries) {
        let slot = ((rating * 2.0).round() as usize).clamp(1, 10) - 1;
        counts[slot] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, count)| RatingBucket {
            rating: (i + 1) as f64 / 2.0,
            count: *count,
        })
        .collect()
}

fn finished_ratings(entries: &[NormalizedEntry<'_>]) -> Vec<f64> {
    entries
        .iter()
        .filter(|e| e.is(ReadingStatus::Finished))
        .filter_map(|e| e.rating)
        .collect()
}

// ============================================================================
// OVERVIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub status_counts: StatusCounts,
    pub total_entries: usize,
    pub average_rating: AverageRating,
    pub finished_this_month: usize,
    pub rating_histogram: Vec<RatingBucket>,
}

impl OverviewStats {
    pub fn summary(&self) -> String {
        format!(
            "{} books ({} finished, {} reading, {} want to read, {} dropped), avg rating {}, {} finished this month",
            self.total_entries,
            self.status_counts.finished,
            self.status_counts.reading,
            self.status_counts.want_to_read,
            self.status_counts.dropped,
            self.average_rating,
            self.finished_this_month
        )
    }
}

pub fn overview(entries: &[NormalizedEntry<'_>], today: NaiveDate) -> OverviewStats {
    let mut status_counts = StatusCounts::default();
    for entry in entries {
        status_counts.bump(entry.status);
    }

    let this_month = MonthKey::of(today);
    let finished_this_month = entries
        .iter()
        .filter_map(|e| e.finished_on())
        .filter(|d| this_month.contains(*d))
        .count();

    OverviewStats {
        status_counts,
        total_entries: entries.len(),
        average_rating: AverageRating::from_ratings(finished_ratings(entries)),
        finished_this_month,
        rating_histogram: rating_histogram(entries),
    }
}

// ============================================================================
// TESTS
// ============================================================================
