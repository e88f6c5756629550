// 📚 Library Entry - One book plus the reader's optional review record
//
// Entries are produced by the persistence/editing layers and handed to the
// statistics engine as an immutable snapshot. Nothing in this crate mutates
// an entry once it has been loaded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// READING STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingStatus {
    #[serde(rename = "want_to_read", alias = "WantToRead", alias = "Want to Read")]
    WantToRead,

    #[serde(rename = "reading", alias = "Reading")]
    Reading,

    #[serde(rename = "finished", alias = "Finished")]
    Finished,

    #[serde(rename = "dropped", alias = "Dropped")]
    Dropped,
}

impl ReadingStatus {
    /// Fixed display order used by every status table
    pub const ALL: [ReadingStatus; 4] = [
        ReadingStatus::WantToRead,
        ReadingStatus::Reading,
        ReadingStatus::Finished,
        ReadingStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
            ReadingStatus::Dropped => "dropped",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "Want to Read",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Finished => "Finished",
            ReadingStatus::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReadingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "want_to_read" | "wanttoread" => Ok(ReadingStatus::WantToRead),
            "reading" => Ok(ReadingStatus::Reading),
            "finished" => Ok(ReadingStatus::Finished),
            "dropped" => Ok(ReadingStatus::Dropped),
            other => anyhow::bail!("Unknown reading status: {}", other),
        }
    }
}

// ============================================================================
// REVIEW RECORD
// ============================================================================

/// The current reader's review of a book
///
/// Dates are kept as the strings the editor stored. They are parsed (and
/// possibly rejected) only when a statistic needs them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub status: Option<ReadingStatus>,

    /// 0-5 in half-point steps; 0 means "not rated"
    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// LIBRARY ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    #[serde(default = "default_uuid")]
    pub id: String,

    pub title: String,

    /// Free text, may end with an annotation such as "(Translator)"
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub review: Option<ReviewRecord>,
}

pub(crate) fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl LibraryEntry {
    pub fn new(title: &str, author: &str) -> Self {
        LibraryEntry {
            id: default_uuid(),
            title: title.to_string(),
            author: author.to_string(),
            category: None,
            review: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_review(mut self, review: ReviewRecord) -> Self {
        self.review = Some(review);
        self
    }

    pub fn status(&self) -> Option<ReadingStatus> {
        self.review.as_ref().and_then(|r| r.status)
    }

    /// Author with a trailing "(...)" annotation removed, for display only.
    /// Statistics always group on the raw `author` string.
    pub fn display_author(&self) -> &str {
        let trimmed = self.author.trim_end();
        if trimmed.ends_with(')') {
            if let Some(open) = trimmed.rfind('(') {
                let head = trimmed[..open].trim_end();
                if !head.is_empty() {
                    return head;
                }
            }
        }
        trimmed
    }
}

// ============================================================================
// TESTS
// ============================================================================
