use crate::models::{OpportunityCandidate, Recommendation};
use crate::services::{GatewayError, OpportunityLookup, PostgresError, RecommendationStore};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// How recording failures interact with the search response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingPolicy {
    /// Resolve all candidates concurrently; failures are logged and reported
    /// but never fail the search
    #[default]
    Isolated,
    /// Legacy behavior: stop at the first failure and fail the search with it
    Strict,
}

/// A recording step that failed
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to resolve opportunity '{name}': {source}")]
    Lookup {
        name: String,
        #[source]
        source: GatewayError,
    },

    #[error("Failed to store recommendation for '{name}': {source}")]
    Persistence {
        name: String,
        #[source]
        source: PostgresError,
    },
}

impl RecordError {
    pub fn name(&self) -> &str {
        match self {
            RecordError::Lookup { name, .. } | RecordError::Persistence { name, .. } => name,
        }
    }
}

/// A candidate that could not be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFailure {
    pub name: String,
    pub reason: String,
}

impl From<&RecordError> for RecordingFailure {
    fn from(err: &RecordError) -> Self {
        Self {
            name: err.name().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of recording one batch of recommendations
#[derive(Debug, Clone, Default)]
pub struct RecordingReport {
    pub recorded: Vec<Recommendation>,
    pub failures: Vec<RecordingFailure>,
}

impl RecordingReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes one recommendation row per selected opportunity
///
/// There is no transaction around the batch: rows inserted before a failure
/// stay committed.
#[derive(Clone)]
pub struct RecommendationRecorder {
    lookup: Arc<dyn OpportunityLookup>,
    store: Arc<dyn RecommendationStore>,
    policy: RecordingPolicy,
}

impl RecommendationRecorder {
    pub fn new(
        lookup: Arc<dyn OpportunityLookup>,
        store: Arc<dyn RecommendationStore>,
        policy: RecordingPolicy,
    ) -> Self {
        Self { lookup, store, policy }
    }

    pub fn policy(&self) -> RecordingPolicy {
        self.policy
    }

    /// Record the selected opportunities for a student
    ///
    /// Only the strict policy returns `Err`.
    pub async fn record(
        &self,
        selected: &[OpportunityCandidate],
        student_id: &str,
    ) -> Result<RecordingReport, RecordError> {
        match self.policy {
            RecordingPolicy::Strict => self.record_strict(selected, student_id).await,
            RecordingPolicy::Isolated => Ok(self.record_isolated(selected, student_id).await),
        }
    }

    async fn store_one(&self, name: &str, student_id: &str, opportunity_id: i64) -> Result<Recommendation, RecordError> {
        self.store
            .insert(student_id, opportunity_id)
            .await
            .map_err(|source| RecordError::Persistence { name: name.to_string(), source })
    }

    async fn record_strict(
        &self,
        selected: &[OpportunityCandidate],
        student_id: &str,
    ) -> Result<RecordingReport, RecordError> {
        let mut report = RecordingReport::default();

        for candidate in selected {
            let opportunity_id = self
                .lookup
                .opportunity_id(&candidate.name)
                .await
                .map_err(|source| RecordError::Lookup { name: candidate.name.clone(), source })?;

            let recommendation = self.store_one(&candidate.name, student_id, opportunity_id).await?;
            report.recorded.push(recommendation);
        }

        Ok(report)
    }

    async fn record_isolated(&self, selected: &[OpportunityCandidate], student_id: &str) -> RecordingReport {
        let lookups = join_all(selected.iter().map(|candidate| async move {
            let resolved = self
                .lookup
                .opportunity_id(&candidate.name)
                .await
                .map_err(|source| RecordError::Lookup { name: candidate.name.clone(), source });
            (candidate, resolved)
        }))
        .await;

        let mut report = RecordingReport::default();

        for (candidate, resolved) in lookups {
            let outcome = match resolved {
                Ok(opportunity_id) => self.store_one(&candidate.name, student_id, opportunity_id).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(recommendation) => report.recorded.push(recommendation),
                Err(e) => {
                    tracing::warn!("Skipping recommendation for student {}: {}", student_id, e);
                    report.failures.push(RecordingFailure::from(&e));
                }
            }
        }

        report
    }
}
