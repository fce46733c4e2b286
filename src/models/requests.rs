use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to compute recommendations for a student
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    pub id_aluno: String,
}
