use crate::core::{
    query::build_query,
    recorder::{RecommendationRecorder, RecordError, RecordingReport},
    selector::Selector,
};
use crate::models::OpportunityCandidate;
use crate::services::{GatewayError, IndexError, PostgresError, ProfileSource, SimilaritySearch};
use std::sync::Arc;
use thiserror::Error;

/// Terminal failures of a search request
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Student not found: {0}")]
    UpstreamNotFound(String),

    #[error("Upstream rejected credentials")]
    UpstreamAuthError,

    #[error("Upstream service failed: {0}")]
    UpstreamServerError(String),

    #[error("Opportunity not found: {0}")]
    OpportunityNotFound(String),

    #[error("Similarity index unavailable: {0}")]
    IndexUnavailable(#[from] IndexError),

    #[error("Failed to persist recommendation: {0}")]
    PersistenceError(#[from] PostgresError),
}

impl From<GatewayError> for SearchError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => SearchError::UpstreamNotFound(what),
            GatewayError::Unauthorized => SearchError::UpstreamAuthError,
            other => SearchError::UpstreamServerError(other.to_string()),
        }
    }
}

impl From<RecordError> for SearchError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Lookup { name, source: GatewayError::NotFound(_) } => {
                SearchError::OpportunityNotFound(name)
            }
            RecordError::Lookup { source, .. } => SearchError::from(source),
            RecordError::Persistence { source, .. } => SearchError::PersistenceError(source),
        }
    }
}

impl SearchError {
    /// Message placed in the `error` field of the response body
    pub fn client_message(&self) -> &'static str {
        match self {
            SearchError::UpstreamNotFound(_) => "Aluno não encontrado",
            SearchError::UpstreamAuthError => "Erro de autenticação",
            SearchError::OpportunityNotFound(_) => "Oportunidade não encontrada",
            SearchError::IndexUnavailable(_) => "Serviço de busca indisponível",
            SearchError::UpstreamServerError(_) | SearchError::PersistenceError(_) => "Erro interno no servidor",
        }
    }
}

/// Result of a successful search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub matches: Vec<OpportunityCandidate>,
    pub recording: RecordingReport,
}

/// Per-request orchestration: profile, query, search, select, record
///
/// Holds no per-request state; one instance serves every worker.
#[derive(Clone)]
pub struct Recommender {
    profiles: Arc<dyn ProfileSource>,
    index: Arc<dyn SimilaritySearch>,
    recorder: RecommendationRecorder,
    selector: Selector,
}

impl Recommender {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        index: Arc<dyn SimilaritySearch>,
        recorder: RecommendationRecorder,
        selector: Selector,
    ) -> Self {
        Self {
            profiles,
            index,
            recorder,
            selector,
        }
    }

    /// Produce and record recommendations for one student
    ///
    /// A profile failure stops before the index or store is touched.
    pub async fn recommend(&self, student_id: &str) -> Result<SearchOutcome, SearchError> {
        let profile = self.profiles.fetch_student(student_id).await.map_err(|e| {
            tracing::error!("Failed to fetch profile for {}: {}", student_id, e);
            SearchError::from(e)
        })?;

        let query = build_query(&profile);
        let fetch_size = self.selector.fetch_size(&profile);

        let matches = self.index.search(&query, fetch_size).await.map_err(|e| {
            tracing::error!("Similarity search failed for {}: {}", student_id, e);
            SearchError::from(e)
        })?;

        tracing::debug!(
            "Index returned {} of {} requested matches for {} (mobility: {:?})",
            matches.len(),
            fetch_size,
            student_id,
            profile.mobility
        );

        let selected = self.selector.select(&profile, &matches);

        let recording = self.recorder.record(&selected, student_id).await.map_err(|e| {
            tracing::error!("Aborted recording for {}: {}", student_id, e);
            SearchError::from(e)
        })?;

        tracing::info!(
            "Returning {} recommendations for student {} ({} recorded, {} failed)",
            selected.len(),
            student_id,
            recording.recorded.len(),
            recording.failures.len()
        );

        Ok(SearchOutcome {
            matches: selected,
            recording,
        })
    }
}
