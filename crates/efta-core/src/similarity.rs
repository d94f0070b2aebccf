//! Scoring rules for "similar products" recommendations.
//!
//! A candidate's score is `category_match * CATEGORY_WEIGHT + tag_matches`,
//! where `category_match` is 1 when the candidate shares the source product's
//! category and `tag_matches` counts distinct shared tags. The store does the
//! per-row arithmetic; this module owns the weights, the source-side
//! normalization, and the decision of how to fill a short result list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Weight of a category match relative to a single shared tag.
pub const CATEGORY_WEIGHT: i32 = 10;

/// Result count used when the caller does not ask for one.
pub const DEFAULT_SIMILAR_LIMIT: usize = 8;

/// The source product's contribution to scoring: its effective category and
/// its tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityProfile {
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl SimilarityProfile {
    /// Build a profile from the source product's effective category and tags.
    ///
    /// A blank category counts as absent. Tags are trimmed and deduplicated,
    /// keeping first-seen order, and blank tags are dropped.
    #[must_use]
    pub fn new(category: Option<&str>, tags: &[String]) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToOwned::to_owned);

        let mut seen = HashSet::new();
        let tags = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && seen.insert(*t))
            .map(ToOwned::to_owned)
            .collect();

        Self { category, tags }
    }

    /// `true` when neither a category nor any tag is available, so no
    /// candidate can score above zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.tags.is_empty()
    }
}

/// Per-candidate annotations returned alongside each recommended product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Similarity {
    /// 1 when the candidate shares the source category, else 0.
    pub category_match: i32,
    pub tag_matches: i32,
    pub similarity_score: i32,
}

impl Similarity {
    #[must_use]
    pub fn new(category_match: bool, tag_matches: i32) -> Self {
        let category_match = i32::from(category_match);
        Self {
            category_match,
            tag_matches,
            similarity_score: category_match * CATEGORY_WEIGHT + tag_matches,
        }
    }

    /// Annotation for a randomly sampled product: the category match is kept
    /// for information, but it carries no tag matches and no score.
    #[must_use]
    pub fn sampled(category_match: bool) -> Self {
        Self {
            category_match: i32::from(category_match),
            tag_matches: 0,
            similarity_score: 0,
        }
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.similarity_score > 0
    }
}

/// What to do after the ranked query returned its top candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPlan {
    /// The ranked list already holds `limit` positive-score items.
    Complete,
    /// Keep the ranked items and append this many random picks.
    Backfill { count: usize },
    /// Nothing scored above zero: discard the ranked list and return this
    /// many random picks instead.
    RandomSample { count: usize },
}

/// Decide how to complete a ranked result list of at most `limit` items.
#[must_use]
pub fn plan_fill(ranked: &[Similarity], limit: usize) -> FillPlan {
    if !ranked.iter().any(Similarity::is_positive) {
        return FillPlan::RandomSample { count: limit };
    }

    match limit.checked_sub(ranked.len()) {
        Some(0) | None => FillPlan::Complete,
        Some(count) => FillPlan::Backfill { count },
    }
}
