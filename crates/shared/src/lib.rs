//! Wire types shared by the site backend and its clients.

use serde::{Deserialize, Serialize};

/// Contact form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// Appointment booking submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    /// As entered in the booking form, e.g. `2026-11-03`
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/send-email`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmailRequest {
    Contact(ContactRequest),
    Appointment(AppointmentRequest),
}

impl EmailRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            EmailRequest::Contact(_) => "contact",
            EmailRequest::Appointment(_) => "appointment",
        }
    }

    pub fn sender_name(&self) -> &str {
        match self {
            EmailRequest::Contact(c) => &c.name,
            EmailRequest::Appointment(a) => &a.name,
        }
    }

    pub fn sender_email(&self) -> &str {
        match self {
            EmailRequest::Contact(c) => &c.email,
            EmailRequest::Appointment(a) => &a.email,
        }
    }

    /// Subject line of the outgoing notification
    pub fn subject(&self) -> String {
        match self {
            EmailRequest::Contact(c) => match c.subject.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => format!("Contact form: {s}"),
                _ => format!("Contact form: message from {}", c.name.trim()),
            },
            EmailRequest::Appointment(a) => format!(
                "Appointment request: {} on {} at {}",
                a.service.trim(),
                a.date.trim(),
                a.time.trim()
            ),
        }
    }

    /// Check required fields. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let mut required: Vec<(&str, &str)> = vec![
            ("name", self.sender_name()),
            ("email", self.sender_email()),
        ];
        match self {
            EmailRequest::Contact(c) => required.push(("message", c.message.as_str())),
            EmailRequest::Appointment(a) => {
                required.push(("phone", a.phone.as_str()));
                required.push(("service", a.service.as_str()));
                required.push(("date", a.date.as_str()));
                required.push(("time", a.time.as_str()));
            }
        }

        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("Missing required field: {field}"));
        }
        if !looks_like_email(self.sender_email()) {
            return Err(format!("Invalid email address: {}", self.sender_email().trim()));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Success body of `POST /api/send-email`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailResponse {
    pub success: bool,
    /// No provider key configured; the message was only logged
    pub simulated: bool,
    pub id: String,
}

/// Error body used by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Entry of `GET /api/team`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
}
