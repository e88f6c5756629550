// 🪣 Bucketing & Ranking Primitives
//
// Shared building blocks for the aggregators:
// - frequency counting in first-seen order
// - top-N ranking with a stable (first-seen) tie-break
// - calendar-month keys and month bucketing
// - trailing windows over an ascending series

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

// ============================================================================
// FREQUENCY COUNT + TOP-N
// ============================================================================

/// Count keys by exact equality, keeping the order in which keys first appear
pub fn frequency_count<T, K, F>(items: impl IntoIterator<Item = T>, key_of: F) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for item in items {
        let key = key_of(&item);
        match index.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCount {
    pub name: String,
    pub count: usize,
}

/// Sort descending by count and optionally truncate
///
/// `sort_by` is stable, so equal counts keep first-seen order.
pub fn top_n(counts: Vec<(String, usize)>, limit: Option<usize>) -> Vec<RankedCount> {
    let mut ranked: Vec<RankedCount> = counts
        .into_iter()
        .map(|(name, count)| RankedCount { name, count })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    ranked
}

// ============================================================================
// MONTH KEY
// ============================================================================

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, ordered by (year, month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthKey {
    /// `None` when month is outside 1-12 or the month has no representable
    /// first day
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| MonthKey { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Stays put at the last representable month
    pub fn next(&self) -> Self {
        let (year, month) = if self.month >= 12 {
            (self.year.checked_add(1), 1)
        } else {
            (Some(self.year), self.month + 1)
        };
        year.and_then(|y| MonthKey::new(y, month)).unwrap_or(*self)
    }

    /// Stays put at the first representable month
    pub fn prev(&self) -> Self {
        let (year, month) = if self.month <= 1 {
            (self.year.checked_sub(1), 12)
        } else {
            (Some(self.year), self.month - 1)
        };
        year.and_then(|y| MonthKey::new(y, month)).unwrap_or(*self)
    }

    /// e.g. "Mar 2024"
    pub fn label(&self) -> String {
        let name = MONTH_ABBREVIATIONS
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{} {}", name, self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    /// Parses "YYYY-MM"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| anyhow::anyhow!("Expected YYYY-MM, got: {}", s))?;
        let year: i32 = year.parse()?;
        let month: u32 = month.parse()?;
        MonthKey::new(year, month).ok_or_else(|| anyhow::anyhow!("Month out of range: {}", s))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Group items into ascending month buckets, preserving input order inside
/// each bucket. Items without a date are skipped.
pub fn month_buckets<T, F>(items: impl IntoIterator<Item = T>, date_of: F) -> Vec<(MonthKey, Vec<T>)>
where
    F: Fn(&T) -> Option<NaiveDate>,
{
    let mut buckets: BTreeMap<MonthKey, Vec<T>> = BTreeMap::new();

    for item in items {
        if let Some(date) = date_of(&item) {
            buckets.entry(MonthKey::of(date)).or_default().push(item);
        }
    }

    buckets.into_iter().collect()
}

// ============================================================================
// TRAILING WINDOW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingWindow {
    #[default]
    SixMonths,
    TwelveMonths,
    All,
}

impl TrailingWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailingWindow::SixMonths => "6",
            TrailingWindow::TwelveMonths => "12",
            TrailingWindow::All => "all",
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            TrailingWindow::SixMonths => Some(6),
            TrailingWindow::TwelveMonths => Some(12),
            TrailingWindow::All => None,
        }
    }

    /// Last N elements of an ascending series, or all of it. Never pads.
    pub fn apply<'s, T>(&self, series: &'s [T]) -> &'s [T] {
        match self.limit() {
            Some(n) if series.len() > n => &series[series.len() - n..],
            _ => series,
        }
    }
}

impl FromStr for TrailingWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "6" => Ok(TrailingWindow::SixMonths),
            "12" => Ok(TrailingWindow::TwelveMonths),
            "all" => Ok(TrailingWindow::All),
            other => anyhow::bail!("Unknown trailing window '{}' (expected 6, 12 or all)", other),
        }
    }
}

impl fmt::Display for TrailingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TrailingWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrailingWindow {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
