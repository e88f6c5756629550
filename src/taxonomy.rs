// 🏷️ Taxonomy Aggregator - Category and author rankings
//
// The same ranking backs two views: "genres" ranks what has been finished,
// "wishlist" ranks what is waiting to be read.

use crate::bucketing::{frequency_count, top_n, RankedCount};
use crate::entry::ReadingStatus;
use crate::normalize::NormalizedEntry;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default number of authors kept in the author ranking
pub const AUTHOR_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPopulation {
    /// Finished books (genre/author view)
    Finished,
    /// Want-to-read books (wishlist view)
    Wishlist,
}

impl RankingPopulation {
    pub fn status(&self) -> ReadingStatus {
        match self {
            RankingPopulation::Finished => ReadingStatus::Finished,
            RankingPopulation::Wishlist => ReadingStatus::WantToRead,
        }
    }
}

impl FromStr for RankingPopulation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finished" | "genres" => Ok(RankingPopulation::Finished),
            "wishlist" | "want_to_read" => Ok(RankingPopulation::Wishlist),
            other => anyhow::bail!("Unknown ranking population: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyStats {
    pub population: RankingPopulation,
    pub matched_entries: usize,
    /// Full ranking; display layers slice it
    pub categories: Vec<RankedCount>,
    /// Top `author_limit` authors
    pub authors: Vec<RankedCount>,
}

pub fn taxonomy(
    entries: &[NormalizedEntry<'_>],
    population: RankingPopulation,
    author_limit: usize,
) -> TaxonomyStats {
    let status = population.status();
    let matching: Vec<&NormalizedEntry<'_>> = entries.iter().filter(|e| e.is(status)).collect();

    let categories = frequency_count(matching.iter(), |e| e.category.to_string());
    // Raw author string; an empty author is its own bucket
    let authors = frequency_count(matching.iter(), |e| e.entry.author.clone());

    TaxonomyStats {
        population,
        matched_entries: matching.len(),
        categories: top_n(categories, None),
        authors: top_n(authors, Some(author_limit)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
