use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub owner: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: Uuid,
    pub project: Uuid,
    pub project_name: String,
    pub token: String,
    pub share_url: String,
    pub whatsapp_url: String,
    pub mailto_url: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_by: i64,
    pub created_by_name: String,
}

impl ShareLink {
    pub fn new(project: &Project, user: &User) -> Self {
        // 64 characters, the width of the real token column
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let share_url = format!("/projects/shared/{token}/");
        let message = format!("Check out this project: {}\n{share_url}", project.name);
        let subject = format!("Shared Project: {}", project.name);
        let body = format!(
            "I'd like to share this project with you:\n\n{}\n\nView it here: {share_url}",
            project.name
        );
        Self {
            id: Uuid::new_v4(),
            project: project.id,
            project_name: project.name.clone(),
            whatsapp_url: format!("https://wa.me/?text={}", urlencoding::encode(&message)),
            mailto_url: format!(
                "mailto:?subject={}&body={}",
                urlencoding::encode(&subject),
                urlencoding::encode(&body)
            ),
            token,
            share_url,
            created_at: Utc::now(),
            is_active: true,
            created_by: user.id,
            created_by_name: user.name.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub project: Uuid,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub project: Uuid,
    pub user: i64,
    pub user_name: String,
    pub user_email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    DueSoon,
    Overdue,
    Completed,
}

impl ReminderStatus {
    pub fn display(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "Pending",
            ReminderStatus::DueSoon => "Due Soon",
            ReminderStatus::Overdue => "Overdue",
            ReminderStatus::Completed => "Completed",
        }
    }

    /// Status implied by the scheduled time: past is overdue, the next 24
    /// hours are due soon.
    pub fn for_datetime(at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if at < now {
            ReminderStatus::Overdue
        } else if at - now <= Duration::hours(24) {
            ReminderStatus::DueSoon
        } else {
            ReminderStatus::Pending
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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
    pub created_by_name: String,
}

impl Reminder {
    pub fn set_status(&mut self, status: ReminderStatus) {
        self.status = status;
        self.status_display = status.display().to_string();
    }

    /// Recompute the status unless it was settled as overdue or completed.
    pub fn refresh_status(&mut self, now: DateTime<Utc>) {
        if matches!(self.status, ReminderStatus::Pending | ReminderStatus::DueSoon) {
            self.set_status(ReminderStatus::for_datetime(self.reminder_datetime, now));
        }
    }
}

/// Everything the server knows. Vectors keep insertion order so sorts with
/// equal keys stay deterministic.
#[derive(Debug, Default)]
pub struct Store {
    pub sessions: Vec<(String, User)>,
    pub projects: Vec<Project>,
    pub share_links: Vec<ShareLink>,
    pub notes: Vec<Note>,
    pub comments: Vec<Comment>,
    pub reminders: Vec<Reminder>,
}

impl Store {
    /// Register `user` as signed in under `session_key`.
    pub fn add_user(&mut self, session_key: &str, user: User) {
        self.sessions.push((session_key.to_string(), user));
    }

    pub fn add_project(&mut self, name: &str, owner: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.projects.push(Project {
            id,
            name: name.to_string(),
            owner,
        });
        id
    }

    pub fn user_for_session(&self, session_key: &str) -> Option<&User> {
        self.sessions
            .iter()
            .find(|(key, _)| key == session_key)
            .map(|(_, user)| user)
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn owns_project(&self, user: &User, project_id: Uuid) -> bool {
        self.project(project_id).is_some_and(|p| p.owner == user.id)
    }
}

/// ISO 8601 with or without an offset; naive values are taken as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|naive| naive.and_utc())
}
