//! Recomenda - semantic opportunity recommendations for students
//!
//! Matches a student profile against a precomputed vector index of
//! opportunities, narrows the results by the student's mobility and records
//! every recommendation it hands out.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, SearchError, SearchOutcome, Selector};
pub use models::{Mobility, OpportunityCandidate, Recommendation, SimilarityMatch, StudentProfile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let selector = Selector::default();
        assert_eq!(selector.result_limit(), 5);
    }
}
