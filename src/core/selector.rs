use crate::core::filters::filter_by_mobility;
use crate::models::{OpportunityCandidate, SimilarityMatch, StudentProfile};

/// Final number of recommendations returned to the caller
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Matches requested from the index when geographic filtering will apply
pub const DEFAULT_MOBILE_FETCH_SIZE: usize = 10;

/// Fallback and truncation policy applied after the similarity search
///
/// Mobile students get a wider index window because the location filter may
/// discard most of it. Everyone else takes the top results as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    result_limit: usize,
    mobile_fetch_size: usize,
}

impl Selector {
    pub fn new(result_limit: usize, mobile_fetch_size: usize) -> Self {
        Self {
            result_limit,
            mobile_fetch_size: mobile_fetch_size.max(result_limit),
        }
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// How many matches to ask the index for
    pub fn fetch_size(&self, profile: &StudentProfile) -> usize {
        if profile.mobility.is_mobile() {
            self.mobile_fetch_size
        } else {
            self.result_limit
        }
    }

    /// Pick the final candidates from matches sorted ascending by score
    ///
    /// Never reorders; never returns more than `result_limit` entries. When
    /// no match survives the location filter, the best unfiltered matches
    /// are used instead.
    pub fn select(&self, profile: &StudentProfile, matches: &[SimilarityMatch]) -> Vec<OpportunityCandidate> {
        let unfiltered = || {
            matches
                .iter()
                .take(self.result_limit)
                .map(|m| m.candidate.clone())
                .collect::<Vec<_>>()
        };

        if !profile.mobility.is_mobile() {
            return unfiltered();
        }

        let mut filtered = filter_by_mobility(matches.iter().map(|m| &m.candidate), profile);

        if filtered.is_empty() {
            tracing::debug!(
                "No candidates left after {:?} filter for {}, falling back to unfiltered matches",
                profile.mobility,
                profile.id
            );
            return unfiltered();
        }

        filtered.truncate(self.result_limit);
        filtered
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_LIMIT, DEFAULT_MOBILE_FETCH_SIZE)
    }
}
