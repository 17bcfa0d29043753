use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use shared::{EmailRequest, EmailResponse, ErrorResponse, TeamMember};

use crate::email;
use crate::team;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Contact / appointment email
pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!("Rejected email payload: {}", e.body_text());
        api_error(StatusCode::BAD_REQUEST, e.body_text())
    })?;

    email::deliver(&state, &request)
        .await
        .map(Json)
        .map_err(|e| api_error(e.status(), e.to_string()))
}

/// Team members
pub async fn team(State(state): State<AppState>) -> Json<Vec<TeamMember>> {
    Json(team::load_team(&state.http, state.config.team_data_url.as_deref()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use shared::ContactRequest;

    fn request(email: &str) -> EmailRequest {
        EmailRequest::Contact(ContactRequest {
            name: "Ada".into(),
            email: email.into(),
            phone: None,
            subject: None,
            message: "Hello".into(),
        })
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_send_email_simulated() {
        let state = AppState::new(ServerConfig::default());
        let Json(res) = send_email(State(state), Ok(Json(request("ada@example.com"))))
            .await
            .unwrap();
        assert!(res.success && res.simulated);
    }

    #[tokio::test]
    async fn test_send_email_validation_is_400() {
        let state = AppState::new(ServerConfig::default());
        let (status, Json(body)) = send_email(State(state), Ok(Json(request("nope"))))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("email"));
    }

    #[tokio::test]
    async fn test_team_without_remote() {
        let state = AppState::new(ServerConfig::default());
        let Json(members) = team(State(state)).await;
        assert_eq!(members, team::fallback_team());
    }
}
