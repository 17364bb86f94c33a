//! Domain DTOs for the project features API.
//!
//! # Design
//! Entities mirror the server's serializers but are defined independently
//! of the mock-server crate; integration tests catch schema drift.
//! Payload structs carry exactly the fields each endpoint expects and
//! nothing more.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareLink {
    pub id: Uuid,
    pub project: Uuid,
    pub project_name: String,
    pub token: String,
    pub share_url: String,
    pub whatsapp_url: String,
    pub mailto_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub project: Uuid,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub project: Uuid,
    pub user: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    DueSoon,
    Overdue,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    pub id: Uuid,
    pub project: Uuid,
    pub project_name: String,
    pub title: String,
    pub reminder_datetime: DateTime<Utc>,
    pub status: ReminderStatus,
    pub status_display: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i64,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

/// Body of `PATCH /share-links/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkUpdate {
    pub is_active: bool,
}

/// Body of `POST /notes/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    pub project: String,
    pub content: String,
}

/// Body of `PATCH /notes/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteContent {
    pub content: String,
}

/// Body of `POST /comments/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub project: String,
    pub message: String,
}

/// Body of `PATCH /comments/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentMessage {
    pub message: String,
}

/// Body of `POST /reminders/`. `reminder_datetime` is sent as given, usually
/// the value of a date-time input field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminder {
    pub project: String,
    pub title: String,
    pub reminder_datetime: String,
}

/// Partial update for `PATCH /reminders/{id}/`. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_datetime: Option<String>,
}

impl ReminderUpdate {
    pub fn title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn reminder_datetime(reminder_datetime: &str) -> Self {
        Self {
            reminder_datetime: Some(reminder_datetime.to_string()),
            ..Self::default()
        }
    }
}
