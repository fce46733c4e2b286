use crate::models::{Mobility, OpportunityCandidate, StudentProfile};
use deunicode::deunicode;

/// Fold a place name for comparison: diacritics stripped, lowercased, trimmed
///
/// "São Paulo" and " sao paulo" fold to the same key.
#[inline]
pub fn normalize_place(value: &str) -> String {
    deunicode(value.trim()).to_lowercase()
}

/// Accent- and case-insensitive equality of two place names
#[inline]
pub fn same_place(a: &str, b: &str) -> bool {
    normalize_place(a) == normalize_place(b)
}

/// Check whether a candidate is reachable under the student's mobility
///
/// Non-mobile students accept every candidate.
#[inline]
pub fn matches_location(candidate: &OpportunityCandidate, profile: &StudentProfile) -> bool {
    match profile.mobility {
        Mobility::City => same_place(&candidate.city, &profile.city),
        Mobility::State => same_place(&candidate.state, &profile.state),
        Mobility::None => true,
    }
}

/// Narrow candidates to those in the student's city or state
///
/// Returns a subsequence of `candidates`; relative order is preserved.
pub fn filter_by_mobility<'a, I>(candidates: I, profile: &StudentProfile) -> Vec<OpportunityCandidate>
where
    I: IntoIterator<Item = &'a OpportunityCandidate>,
{
    candidates
        .into_iter()
        .filter(|candidate| matches_location(candidate, profile))
        .cloned()
        .collect()
}
