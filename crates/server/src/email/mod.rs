//! Notification emails for contact and appointment submissions.

use std::fmt;

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::{EmailRequest, EmailResponse};

use crate::AppState;

#[derive(Debug)]
pub enum EmailError {
    /// Payload failed validation
    Validation(String),
    /// Provider answered with a non-success status
    Provider { status: u16, message: String },
    /// Provider could not be reached or answered garbage
    Transport(String),
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailError::Validation(msg) => write!(f, "{msg}"),
            EmailError::Provider { status, message } => {
                write!(f, "Email provider rejected the message ({status}): {message}")
            }
            EmailError::Transport(msg) => write!(f, "Email provider unreachable: {msg}"),
        }
    }
}

impl std::error::Error for EmailError {}

impl From<reqwest::Error> for EmailError {
    fn from(e: reqwest::Error) -> Self {
        EmailError::Transport(e.to_string())
    }
}

impl EmailError {
    pub fn status(&self) -> StatusCode {
        match self {
            EmailError::Validation(_) => StatusCode::BAD_REQUEST,
            EmailError::Provider { .. } | EmailError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderReply {
    id: String,
}

/// Validate, render and send. Falls back to logging when no provider key is set.
pub async fn deliver(state: &AppState, request: &EmailRequest) -> Result<EmailResponse, EmailError> {
    request.validate().map_err(EmailError::Validation)?;

    let subject = request.subject();
    let html = render_html(request);

    let Some(api_key) = state.config.resend_api_key.as_deref() else {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            id = %id,
            kind = request.kind(),
            to = %state.config.email_to,
            subject = %subject,
            "RESEND_API_KEY not set, simulating email"
        );
        tracing::debug!("{html}");
        return Ok(EmailResponse {
            success: true,
            simulated: true,
            id,
        });
    };

    let response = state
        .http
        .post(format!("{}/emails", state.config.resend_api_url))
        .bearer_auth(api_key)
        .json(&json!({
            "from": state.config.email_from,
            "to": [state.config.email_to],
            "reply_to": request.sender_email().trim(),
            "subject": subject,
            "html": html,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        tracing::error!("Email provider returned {status}: {message}");
        return Err(EmailError::Provider {
            status: status.as_u16(),
            message,
        });
    }

    let reply: ProviderReply = response.json().await?;
    tracing::info!(id = %reply.id, kind = request.kind(), "Email sent");
    Ok(EmailResponse {
        success: true,
        simulated: false,
        id: reply.id,
    })
}

/// HTML body of the notification. All user input is escaped.
pub fn render_html(request: &EmailRequest) -> String {
    let (title, rows): (&str, Vec<(&str, Option<&str>)>) = match request {
        EmailRequest::Contact(c) => (
            "New contact form submission",
            vec![
                ("Name", Some(c.name.as_str())),
                ("Email", Some(c.email.as_str())),
                ("Phone", c.phone.as_deref()),
                ("Subject", c.subject.as_deref()),
            ],
        ),
        EmailRequest::Appointment(a) => (
            "New appointment request",
            vec![
                ("Name", Some(a.name.as_str())),
                ("Email", Some(a.email.as_str())),
                ("Phone", Some(a.phone.as_str())),
                ("Service", Some(a.service.as_str())),
                ("Date", Some(a.date.as_str())),
                ("Time", Some(a.time.as_str())),
            ],
        ),
    };
    let message = match request {
        EmailRequest::Contact(c) => Some(c.message.as_str()),
        EmailRequest::Appointment(a) => a.message.as_deref(),
    };

    let mut html = format!("<h2>{title}</h2>\n<table>\n");
    for (label, value) in rows {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        html.push_str(&format!(
            "<tr><td><strong>{label}:</strong></td><td>{}</td></tr>\n",
            escape_html(value)
        ));
    }
    html.push_str("</table>\n");

    if let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) {
        html.push_str("<h3>Message</h3>\n<p>");
        html.push_str(&escape_html(message).replace('\n', "<br>"));
        html.push_str("</p>\n");
    }
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AppointmentRequest, ContactRequest};

    fn contact(message: &str) -> EmailRequest {
        EmailRequest::Contact(ContactRequest {
            name: "Ada <script>".into(),
            email: "ada@example.com".into(),
            phone: None,
            subject: Some("  ".into()),
            message: message.into(),
        })
    }

    #[test]
    fn test_html_escapes_input() {
        let html = render_html(&contact("a & b\nline two"));
        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(html.contains("a &amp; b<br>line two"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_html_skips_empty_optional_rows() {
        let html = render_html(&contact("hi"));
        assert!(!html.contains("Phone"));
        assert!(!html.contains("Subject"));
    }

    #[test]
    fn test_appointment_html_lists_booking() {
        let html = render_html(&EmailRequest::Appointment(AppointmentRequest {
            name: "Bo".into(),
            email: "bo@example.com".into(),
            phone: "555".into(),
            service: "Lighting design".into(),
            date: "2026-11-03".into(),
            time: "10:00".into(),
            message: None,
        }));
        assert!(html.starts_with("<h2>New appointment request</h2>"));
        assert!(html.contains("Lighting design"));
        assert!(!html.contains("Message"));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(EmailError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        let provider = EmailError::Provider {
            status: 422,
            message: "bad from".into(),
        };
        assert_eq!(provider.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(EmailError::Transport("down".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_simulated_without_key() {
        let state = AppState::new(crate::config::ServerConfig::default());
        let res = deliver(&state, &contact("hello")).await.unwrap();
        assert!(res.success);
        assert!(res.simulated);
        assert!(uuid::Uuid::parse_str(&res.id).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_payload_never_sends() {
        let state = AppState::new(crate::config::ServerConfig::default());
        let err = deliver(&state, &contact("")).await.unwrap_err();
        assert!(matches!(err, EmailError::Validation(_)));
    }
}
