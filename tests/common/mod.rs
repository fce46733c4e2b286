// Shared in-memory collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use recomenda::core::{RecommendationRecorder, Recommender, RecordingPolicy, Selector};
use recomenda::models::{Mobility, OpportunityCandidate, Recommendation, SimilarityMatch, StudentProfile};
use recomenda::services::{
    GatewayError, IndexError, OpportunityLookup, PostgresError, ProfileSource, RecommendationStore,
    SimilaritySearch,
};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn create_profile(id: &str, mobility: Mobility, city: &str, state: &str) -> StudentProfile {
    StudentProfile {
        id: id.to_string(),
        schooling_level: "Ensino Médio".to_string(),
        interest_areas: vec!["Tecnologia".to_string()],
        description: "Quero aprender programação".to_string(),
        mobility,
        city: city.to_string(),
        state: state.to_string(),
    }
}

/// Matches named op0..opN in ascending score order, one per (city, state)
pub fn create_matches(places: &[(&str, &str)]) -> Vec<SimilarityMatch> {
    places
        .iter()
        .enumerate()
        .map(|(i, (city, state))| SimilarityMatch {
            candidate: OpportunityCandidate::new(format!("op{}", i), *city, *state),
            score: i as f32,
        })
        .collect()
}

pub fn names(list: &[OpportunityCandidate]) -> Vec<String> {
    list.iter().map(|c| c.name.clone()).collect()
}

#[derive(Default)]
pub struct FakeProfiles {
    profiles: HashMap<String, StudentProfile>,
    unauthorized: bool,
}

impl FakeProfiles {
    pub fn with(profiles: Vec<StudentProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
            unauthorized: false,
        }
    }

    pub fn unauthorized() -> Self {
        Self { profiles: HashMap::new(), unauthorized: true }
    }
}

#[async_trait]
impl ProfileSource for FakeProfiles {
    async fn fetch_student(&self, student_id: &str) -> Result<StudentProfile, GatewayError> {
        if self.unauthorized {
            return Err(GatewayError::Unauthorized);
        }
        self.profiles
            .get(student_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("student {}", student_id)))
    }
}

/// Returns a fixed ranking, truncated to the requested size
#[derive(Default)]
pub struct FakeIndex {
    matches: Vec<SimilarityMatch>,
    fail: bool,
    pub requests: Mutex<Vec<(String, usize)>>,
}

impl FakeIndex {
    pub fn with(matches: Vec<SimilarityMatch>) -> Self {
        Self { matches, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn requested_sizes(&self) -> Vec<usize> {
        self.requests.lock().unwrap().iter().map(|(_, k)| *k).collect()
    }
}

#[async_trait]
impl SimilaritySearch for FakeIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SimilarityMatch>, IndexError> {
        self.requests.lock().unwrap().push((query.to_string(), k));
        if self.fail {
            return Err(IndexError::Empty);
        }
        Ok(self.matches.iter().take(k).cloned().collect())
    }
}

/// Resolves `opN` to N unless the name is marked as missing or broken
#[derive(Default)]
pub struct FakeLookup {
    missing: Vec<String>,
    broken: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn missing(names: &[&str]) -> Self {
        Self { missing: names.iter().map(|s| s.to_string()).collect(), ..Default::default() }
    }

    pub fn broken(names: &[&str]) -> Self {
        Self { broken: names.iter().map(|s| s.to_string()).collect(), ..Default::default() }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl OpportunityLookup for FakeLookup {
    async fn opportunity_id(&self, name: &str) -> Result<i64, GatewayError> {
        self.calls.lock().unwrap().push(name.to_string());
        if self.missing.iter().any(|m| m == name) {
            return Err(GatewayError::NotFound(format!("opportunity {}", name)));
        }
        if self.broken.iter().any(|m| m == name) {
            return Err(GatewayError::ServerError(StatusCode::INTERNAL_SERVER_ERROR));
        }
        name.trim_start_matches("op")
            .parse()
            .map_err(|_| GatewayError::InvalidResponse(format!("no id for {}", name)))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Recommendation>>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MemoryStore {
    pub fn failing_writes() -> Self {
        Self { fail_writes: true, ..Default::default() }
    }

    pub fn failing_reads() -> Self {
        Self { fail_reads: true, ..Default::default() }
    }

    pub fn rows(&self) -> Vec<Recommendation> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn insert(&self, student_id: &str, opportunity_id: i64) -> Result<Recommendation, PostgresError> {
        if self.fail_writes {
            return Err(PostgresError::Unavailable("writes disabled".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = Recommendation {
            id: rows.len() as i64 + 1,
            student_id: student_id.to_string(),
            opportunity_id,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Recommendation>, PostgresError> {
        if self.fail_reads {
            return Err(PostgresError::Unavailable("reads disabled".into()));
        }
        Ok(self.rows())
    }

    async fn get(&self, id: i64) -> Result<Option<Recommendation>, PostgresError> {
        Ok(self.rows().into_iter().find(|r| r.id == id))
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<Recommendation>, PostgresError> {
        Ok(self.rows().into_iter().filter(|r| r.student_id == student_id).collect())
    }

    async fn health_check(&self) -> Result<bool, PostgresError> {
        Ok(!self.fail_reads)
    }
}

/// Everything a pipeline test needs to inspect after a run
pub struct Harness {
    pub index: Arc<FakeIndex>,
    pub lookup: Arc<FakeLookup>,
    pub store: Arc<MemoryStore>,
    pub recommender: Recommender,
}

pub fn harness(
    profiles: FakeProfiles,
    index: FakeIndex,
    lookup: FakeLookup,
    store: MemoryStore,
    policy: RecordingPolicy,
) -> Harness {
    let index = Arc::new(index);
    let lookup = Arc::new(lookup);
    let store = Arc::new(store);

    let recorder = RecommendationRecorder::new(lookup.clone(), store.clone(), policy);
    let recommender = Recommender::new(Arc::new(profiles), index.clone(), recorder, Selector::default());

    Harness { index, lookup, store, recommender }
}
