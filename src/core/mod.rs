// Core pipeline exports
pub mod filters;
pub mod query;
pub mod recommender;
pub mod recorder;
pub mod selector;

pub use filters::{filter_by_mobility, matches_location, normalize_place, same_place};
pub use query::build_query;
pub use recommender::{Recommender, SearchError, SearchOutcome};
pub use recorder::{RecommendationRecorder, RecordError, RecordingFailure, RecordingPolicy, RecordingReport};
pub use selector::{Selector, DEFAULT_MOBILE_FETCH_SIZE, DEFAULT_RESULT_LIMIT};
