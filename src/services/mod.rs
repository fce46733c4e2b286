// Service exports
pub mod embeddings;
pub mod gateway;
pub mod index;
pub mod postgres;

pub use embeddings::{Embedder, EmbeddingError, OpenAiEmbedder, DEFAULT_EMBEDDING_MODEL};
pub use gateway::{GatewayClient, GatewayError, OpportunityLookup, ProfileSource};
pub use index::{normalize_record_syntax, IndexError, SharedIndex, SimilarityIndexClient, SimilaritySearch, VectorIndex};
pub use postgres::{PostgresClient, PostgresError, RecommendationStore};
