// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Mobility, OpportunityCandidate, Recommendation, SimilarityMatch, StudentProfile};
pub use requests::SearchRequest;
pub use responses::{ErrorResponse, HealthResponse, HelloResponse, NotFoundResponse, SearchResponse};
