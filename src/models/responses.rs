use serde::{Deserialize, Serialize};
use crate::models::domain::OpportunityCandidate;

/// Response for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub text: Vec<OpportunityCandidate>,
}

/// Root greeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    pub hello: String,
}

impl Default for HelloResponse {
    fn default() -> Self {
        Self { hello: "world".to_string() }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub index_documents: usize,
    pub database: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error payload, kept to a single field for client compatibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Error body for lookups that found nothing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub detail: String,
}
