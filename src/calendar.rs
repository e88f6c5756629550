// 📅 Calendar Day-Index - What was finished on which day
//
// Finished entries with a parseable end date are indexed by that date, in
// input order. A month view pads the displayed month out to whole weeks;
// padding days carry their data but are never selectable.

use crate::bucketing::MonthKey;
use crate::entry::LibraryEntry;
use crate::normalize::NormalizedEntry;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    fn offset(&self, weekday: Weekday) -> i64 {
        match self {
            WeekStart::Sunday => weekday.num_days_from_sunday() as i64,
            WeekStart::Monday => weekday.num_days_from_monday() as i64,
        }
    }
}

// ============================================================================
// DAY INDEX
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DayIndex<'a> {
    days: BTreeMap<NaiveDate, Vec<&'a LibraryEntry>>,
}

impl<'a> DayIndex<'a> {
    pub fn build(entries: &[NormalizedEntry<'a>]) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<&'a LibraryEntry>> = BTreeMap::new();

        for entry in entries {
            if let Some(date) = entry.finished_on() {
                days.entry(date).or_default().push(entry.entry);
            }
        }

        DayIndex { days }
    }

    /// Entries finished on `date`, in input order
    pub fn entries_on(&self, date: NaiveDate) -> &[&'a LibraryEntry] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_days(&self) -> usize {
        self.days.len()
    }

    /// Month view padded to whole weeks
    pub fn month_view(&self, month: MonthKey, week_start: WeekStart) -> CalendarMonth<'a> {
        let first = month.first_day();
        let last = month.last_day();

        // Padding is clipped at the ends of the supported date range
        let grid_start = first
            .checked_sub_signed(Duration::days(week_start.offset(first.weekday())))
            .unwrap_or(first);
        let grid_end = last
            .checked_add_signed(Duration::days(6 - week_start.offset(last.weekday())))
            .unwrap_or(last);

        let days = std::iter::successors(Some(grid_start), |d| d.succ_opt())
            .take_while(|d| *d <= grid_end)
            .map(|date| {
                let entries = self.entries_on(date).to_vec();
                CalendarDay {
                    date,
                    in_month: month.contains(date),
                    count: entries.len(),
                    representative: entries.last().copied(),
                    entries,
                }
            })
            .collect();

        CalendarMonth {
            month,
            label: month.label(),
            week_start,
            days,
        }
    }
}

// ============================================================================
// MONTH VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    /// false for leading/trailing padding days
    pub in_month: bool,
    pub count: usize,
    /// Last entry added for this day
    pub representative: Option<&'a LibraryEntry>,
    #[serde(skip)]
    entries: Vec<&'a LibraryEntry>,
}

impl<'a> CalendarDay<'a> {
    pub fn has_entries(&self) -> bool {
        self.count > 0
    }

    /// The "+ N more" figure shown under the representative
    pub fn more_count(&self) -> usize {
        self.count.saturating_sub(1)
    }

    pub fn is_selectable(&self) -> bool {
        self.in_month && self.has_entries()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth<'a> {
    pub month: MonthKey,
    pub label: String,
    pub week_start: WeekStart,
    pub days: Vec<CalendarDay<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail<'a> {
    pub date: NaiveDate,
    pub entries: Vec<&'a LibraryEntry>,
}

impl<'a> CalendarMonth<'a> {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay<'a>]> {
        self.days.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay<'a>> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Drill-down on one day
    ///
    /// `None` for padding days and empty days. All entries share one end
    /// date, so descending end-date order is the stable input order.
    pub fn select_day(&self, date: NaiveDate) -> Option<DayDetail<'a>> {
        let day = self.day(date).filter(|d| d.is_selectable())?;
        Some(DayDetail {
            date: day.date,
            entries: day.entries.clone(),
        })
    }

    pub fn finished_in_month(&self) -> usize {
        self.days.iter().filter(|d| d.in_month).map(|d| d.count).sum()
    }
}

pub fn calendar_month<'a>(
    entries: &[NormalizedEntry<'a>],
    month: MonthKey,
    week_start: WeekStart,
) -> CalendarMonth<'a> {
    DayIndex::build(entries).month_view(month, week_start)
}

// ============================================================================
// TESTS
// ============================================================================
