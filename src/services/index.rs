use crate::models::{OpportunityCandidate, SimilarityMatch};
use crate::services::embeddings::{Embedder, EmbeddingError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised while loading or querying the opportunity index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to read index file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse index file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid payload in document {position}: {message}")]
    InvalidPayload { position: usize, message: String },

    #[error("Vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Index contains no documents")]
    Empty,

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Nearest-neighbour search over opportunities
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Up to `k` matches, sorted ascending by distance
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SimilarityMatch>, IndexError>;
}

/// On-disk document: the vector plus its opportunity record
///
/// Newer index builds store `payload` as a JSON object. Older builds only
/// carry `page_content`, a record serialized with single-quoted strings.
#[derive(Debug, Deserialize)]
struct StoredDocument {
    embedding: Vec<f32>,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    page_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    dimension: Option<usize>,
    documents: Vec<StoredDocument>,
}

#[derive(Debug, Clone)]
struct IndexedOpportunity {
    embedding: Vec<f32>,
    candidate: OpportunityCandidate,
}

/// Rewrite a single-quoted record literal as strict JSON
///
/// Single-quoted strings become double-quoted (escaping inner `"`),
/// double-quoted strings pass through, and the bare words `None`, `True` and
/// `False` map to `null`, `true` and `false`.
pub fn normalize_record_syntax(raw: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Outside,
        Single,
        Double,
    }

    let mut out = String::with_capacity(raw.len() + 8);
    let mut state = State::Outside;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Outside => match c {
                '\'' => {
                    state = State::Single;
                    out.push('"');
                }
                '"' => {
                    state = State::Double;
                    out.push('"');
                }
                c if c.is_ascii_alphabetic() => {
                    let mut word = String::from(c);
                    while let Some(&next) = chars.peek() {
                        if !next.is_ascii_alphanumeric() && next != '_' {
                            break;
                        }
                        word.push(next);
                        chars.next();
                    }
                    out.push_str(match word.as_str() {
                        "None" => "null",
                        "True" => "true",
                        "False" => "false",
                        other => other,
                    });
                }
                c => out.push(c),
            },
            State::Single => match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(escaped) => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    None => out.push_str("\\\\"),
                },
                '"' => out.push_str("\\\""),
                '\'' => {
                    state = State::Outside;
                    out.push('"');
                }
                c => out.push(c),
            },
            State::Double => {
                out.push(c);
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    }
                    '"' => state = State::Outside,
                    _ => {}
                }
            }
        }
    }

    out
}

fn parse_candidate(position: usize, doc: StoredDocument) -> Result<IndexedOpportunity, IndexError> {
    let invalid = |message: String| IndexError::InvalidPayload { position, message };

    let value = match (doc.payload, doc.page_content) {
        (Some(payload), _) => payload,
        (None, Some(content)) => serde_json::from_str(&normalize_record_syntax(&content))
            .map_err(|e| invalid(e.to_string()))?,
        (None, None) => return Err(invalid("document has neither payload nor page_content".into())),
    };

    let candidate = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

    Ok(IndexedOpportunity {
        embedding: doc.embedding,
        candidate,
    })
}

#[inline]
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Immutable, in-memory flat index of opportunity vectors
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexedOpportunity>,
}

impl VectorIndex {
    /// Parse an index from its JSON representation
    ///
    /// All payloads are decoded here, so a malformed document fails the
    /// load instead of a later query.
    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        let file: IndexFile = serde_json::from_str(json)?;

        let entries = file
            .documents
            .into_iter()
            .enumerate()
            .map(|(position, doc)| parse_candidate(position, doc))
            .collect::<Result<Vec<_>, _>>()?;

        let dimension = match (file.dimension, entries.first()) {
            (_, None) => return Err(IndexError::Empty),
            (Some(declared), Some(_)) => declared,
            (None, Some(first)) => first.embedding.len(),
        };

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                got: bad.embedding.len(),
            });
        }

        Ok(Self { dimension, entries })
    }

    /// Load an index file from disk
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact nearest-neighbour search by squared euclidean distance
    ///
    /// Equal distances keep index order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SimilarityMatch>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (squared_l2(query, &entry.embedding), i))
            // inf - inf yields NaN; rank it as farthest
            .map(|(d, i)| (if d.is_nan() { f32::INFINITY } else { d }, i))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, i)| SimilarityMatch {
                candidate: self.entries[i].candidate.clone(),
                score,
            })
            .collect())
    }
}

/// Process-wide handle to the loaded index
///
/// Readers clone the inner `Arc`, so a reload never disturbs searches already
/// in flight.
pub struct SharedIndex {
    path: PathBuf,
    current: RwLock<Arc<VectorIndex>>,
}

impl SharedIndex {
    /// Load the index at `path`; fails if the file is missing or corrupt
    pub async fn load<P: Into<PathBuf>>(path: P) -> Result<Self, IndexError> {
        let path = path.into();
        let index = VectorIndex::load(&path).await?;

        tracing::info!(
            "Loaded {} opportunities ({} dimensions) from {}",
            index.len(),
            index.dimension(),
            path.display()
        );

        Ok(Self::from_index(path, index))
    }

    pub fn from_index(path: PathBuf, index: VectorIndex) -> Self {
        Self {
            path,
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Snapshot of the current index
    pub async fn current(&self) -> Arc<VectorIndex> {
        self.current.read().await.clone()
    }

    /// Re-read the index file, keeping the old index if loading fails
    pub async fn reload(&self) -> Result<usize, IndexError> {
        let index = VectorIndex::load(&self.path).await?;
        let len = index.len();

        *self.current.write().await = Arc::new(index);

        tracing::info!("Reloaded opportunity index ({} documents)", len);
        Ok(len)
    }
}

/// Embeds the query text and searches the shared index
pub struct SimilarityIndexClient {
    embedder: Arc<dyn Embedder>,
    index: Arc<SharedIndex>,
}

impl SimilarityIndexClient {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<SharedIndex>) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl SimilaritySearch for SimilarityIndexClient {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SimilarityMatch>, IndexError> {
        let vector = self.embedder.embed(query).await?;
        let index = self.index.current().await;
        index.search(&vector, k)
    }
}
