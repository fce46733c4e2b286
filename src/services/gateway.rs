use crate::models::StudentProfile;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the API gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: gateway rejected the request")]
    Unauthorized,

    #[error("Gateway returned {0}")]
    ServerError(StatusCode),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of student profiles
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_student(&self, student_id: &str) -> Result<StudentProfile, GatewayError>;
}

/// Resolves an opportunity name to its identifier
#[async_trait]
pub trait OpportunityLookup: Send + Sync {
    async fn opportunity_id(&self, name: &str) -> Result<i64, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct OpportunityRef {
    id: i64,
}

/// Client for the student and institution services behind the gateway
pub struct GatewayClient {
    base_url: String,
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Map non-success statuses onto the error taxonomy
    fn check_status(response: Response, what: &str) -> Result<Response, GatewayError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(what.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
            status => Err(GatewayError::ServerError(status)),
        }
    }
}

#[async_trait]
impl ProfileSource for GatewayClient {
    async fn fetch_student(&self, student_id: &str) -> Result<StudentProfile, GatewayError> {
        let url = format!("{}/aluno/{}", self.base_url, urlencoding::encode(student_id));

        tracing::debug!("Fetching student profile from: {}", url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response, &format!("student {}", student_id))?;

        let mut profile: StudentProfile = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse student: {}", e)))?;

        if profile.id.is_empty() {
            profile.id = student_id.to_string();
        }

        Ok(profile)
    }
}

#[async_trait]
impl OpportunityLookup for GatewayClient {
    async fn opportunity_id(&self, name: &str) -> Result<i64, GatewayError> {
        let url = format!("{}/instituicao", self.base_url);

        let response = self.client.get(&url).query(&[("nome", name)]).send().await?;
        let response = Self::check_status(response, &format!("opportunity {}", name))?;

        let found: OpportunityRef = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse opportunity: {}", e)))?;

        tracing::debug!("Resolved opportunity '{}' to id {}", name, found.id);

        Ok(found.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mobility;
    use mockito::{Matcher, Server};

    fn client(url: String) -> GatewayClient {
        GatewayClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_gateway_client_creation() {
        let gateway = client("http://gateway.test/".to_string());
        assert_eq!(gateway.base_url, "http://gateway.test");
    }

    #[tokio::test]
    async fn test_fetch_student() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/aluno/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"escolaridade":"Ensino Médio","areas_interesse":["Tecnologia"],
                    "descricao":"curioso","disponibilidade_de_deslocamento":"estado",
                    "cidade":"Recife","uf":"PE"}"#,
            )
            .create_async()
            .await;

        let profile = client(server.url()).fetch_student("42").await.unwrap();

        mock.assert_async().await;
        assert_eq!(profile.id, "42");
        assert_eq!(profile.mobility, Mobility::State);
        assert_eq!(profile.city, "Recife");
    }

    #[tokio::test]
    async fn test_fetch_student_with_null_location() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/aluno/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"escolaridade":"Superior","areas_interesse":"Saúde","descricao":null,
                    "disponibilidade_de_deslocamento":false,"cidade":null,"uf":null}"#,
            )
            .create_async()
            .await;

        let profile = client(server.url()).fetch_student("7").await.unwrap();

        assert_eq!(profile.id, "7");
        assert_eq!(profile.mobility, Mobility::None);
        assert!(profile.city.is_empty() && profile.state.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_student_status_mapping() {
        let mut server = Server::new_async().await;
        let _missing = server.mock("GET", "/aluno/missing").with_status(404).create_async().await;
        let _locked = server.mock("GET", "/aluno/locked").with_status(401).create_async().await;
        let _broken = server.mock("GET", "/aluno/broken").with_status(500).create_async().await;

        let gateway = client(server.url());

        assert!(matches!(gateway.fetch_student("missing").await, Err(GatewayError::NotFound(_))));
        assert!(matches!(gateway.fetch_student("locked").await, Err(GatewayError::Unauthorized)));
        assert!(matches!(
            gateway.fetch_student("broken").await,
            Err(GatewayError::ServerError(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[tokio::test]
    async fn test_opportunity_lookup_by_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/instituicao")
            .match_query(Matcher::UrlEncoded("nome".into(), "Escola São José".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 17, "nome": "Escola São José"}"#)
            .create_async()
            .await;

        let id = client(server.url()).opportunity_id("Escola São José").await.unwrap();

        mock.assert_async().await;
        assert_eq!(id, 17);
    }

    #[tokio::test]
    async fn test_opportunity_lookup_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/instituicao")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let result = client(server.url()).opportunity_id("Nada").await;
        assert!(matches!(result, Err(GatewayError::NotFound(_))));
    }
}
