use actix_web::{web, HttpResponse, Responder};
use crate::models::{ErrorResponse, NotFoundResponse};
use crate::routes::AppState;
use crate::services::PostgresError;

/// Configure recommendation history routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/recomendacoes", web::get().to(list_recommendations))
        .route("/recomendacoes/", web::get().to(list_recommendations))
        .route("/recomendacoes/aluno/{aluno_id}", web::get().to(list_for_student))
        .route("/recomendacoes/{id}", web::get().to(get_recommendation));
}

fn store_failure(context: &str, err: PostgresError) -> HttpResponse {
    tracing::error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse::new("Erro interno no servidor"))
}

/// GET /recomendacoes/
async fn list_recommendations(state: web::Data<AppState>) -> impl Responder {
    match state.store.list_all().await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => store_failure("Failed to list recommendations", e),
    }
}

/// GET /recomendacoes/{id}
async fn get_recommendation(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();

    match state.store.get(id).await {
        Ok(Some(row)) => HttpResponse::Ok().json(row),
        Ok(None) => HttpResponse::NotFound().json(NotFoundResponse {
            detail: "Recomendacao not found".to_string(),
        }),
        Err(e) => store_failure(&format!("Failed to fetch recommendation {}", id), e),
    }
}

/// GET /recomendacoes/aluno/{aluno_id}
async fn list_for_student(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let student_id = path.into_inner();

    match state.store.list_for_student(&student_id).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => store_failure(&format!("Failed to list recommendations for {}", student_id), e),
    }
}
