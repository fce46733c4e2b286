use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::SearchError;
use crate::models::{ErrorResponse, HealthResponse, HelloResponse, SearchRequest, SearchResponse};
use crate::routes::AppState;

/// Configure search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(home))
        .route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search));
}

async fn home() -> impl Responder {
    HttpResponse::Ok().json(HelloResponse::default())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = state.store.health_check().await.unwrap_or(false);
    let index_documents = state.index.current().await.len();

    let status = if database { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index_documents,
        database,
        timestamp: chrono::Utc::now(),
    })
}

/// Status used for an error payload when upstream statuses are propagated
pub fn error_status(err: &SearchError) -> StatusCode {
    match err {
        SearchError::UpstreamNotFound(_) => StatusCode::NOT_FOUND,
        SearchError::UpstreamAuthError => StatusCode::UNAUTHORIZED,
        SearchError::UpstreamServerError(_) => StatusCode::BAD_GATEWAY,
        SearchError::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::OpportunityNotFound(_) | SearchError::PersistenceError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Recommend opportunities for a student
///
/// POST /search
///
/// Request body:
/// ```json
/// { "id_aluno": "string" }
/// ```
///
/// Responds with `{"text": [...]}` on success and `{"error": "..."}` on failure.
/// Error payloads use status 200 unless `search.propagate_upstream_status` is set.
async fn search(state: web::Data<AppState>, req: web::Json<SearchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(format!("Validation failed: {}", errors)));
    }

    tracing::info!("Searching opportunities for student: {}", req.id_aluno);

    match state.recommender.recommend(&req.id_aluno).await {
        Ok(outcome) => {
            if !outcome.recording.is_complete() {
                tracing::warn!(
                    "Recorded {} of {} recommendations for {}",
                    outcome.recording.recorded.len(),
                    outcome.matches.len(),
                    req.id_aluno
                );
            }
            HttpResponse::Ok().json(SearchResponse { text: outcome.matches })
        }
        Err(e) => {
            let status = if state.propagate_upstream_status {
                error_status(&e)
            } else {
                StatusCode::OK
            };
            HttpResponse::build(status).json(ErrorResponse::new(e.client_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_status(&SearchError::UpstreamNotFound("1".into())), StatusCode::NOT_FOUND);
        assert_eq!(error_status(&SearchError::UpstreamAuthError), StatusCode::UNAUTHORIZED);
        assert_eq!(error_status(&SearchError::UpstreamServerError("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            error_status(&SearchError::OpportunityNotFound("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
