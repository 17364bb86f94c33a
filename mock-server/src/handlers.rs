use std::cmp::Reverse;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::store::{parse_datetime, Comment, Note, Reminder, ReminderStatus, ShareLink, Store};
use crate::{authenticate, authorize_write, ApiFailure, Db};

type Created<T> = Result<(StatusCode, Json<T>), ApiFailure>;

#[derive(Deserialize)]
pub struct ProjectFilter {
    project_id: Option<String>,
}

impl ProjectFilter {
    fn project(&self) -> Result<Option<Uuid>, ApiFailure> {
        match self.project_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| ApiFailure::field("project_id", "Must be a valid UUID.")),
        }
    }
}

#[derive(Deserialize)]
pub struct ShareLinkInput {
    is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct NoteInput {
    project: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
pub struct CommentInput {
    project: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
pub struct ReminderInput {
    project: Option<String>,
    title: Option<String>,
    reminder_datetime: Option<String>,
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ApiFailure> {
    match value {
        None => Err(ApiFailure::field(field, "This field is required.")),
        Some(v) if v.trim().is_empty() => Err(ApiFailure::field(field, "This field may not be blank.")),
        Some(v) => Ok(v),
    }
}

/// Resolve the `project` field of a create payload to a project the caller owns.
fn project_for_create(
    store: &Store,
    user_id: i64,
    raw: Option<&str>,
    denied: &str,
) -> Result<(Uuid, String), ApiFailure> {
    let raw = required("project", raw)?;
    let invalid = || ApiFailure::field("project", &format!("Invalid pk \"{raw}\" - object does not exist."));
    let id = Uuid::parse_str(raw).map_err(|_| invalid())?;
    let project = store.project(id).ok_or_else(invalid)?;
    if project.owner != user_id {
        return Err(ApiFailure::detail(StatusCode::FORBIDDEN, denied));
    }
    Ok((project.id, project.name.clone()))
}

fn datetime(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiFailure> {
    parse_datetime(raw).ok_or_else(|| {
        ApiFailure::field(
            field,
            "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].",
        )
    })
}

// --- share links ---

pub async fn share_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(project_id): Path<Uuid>,
) -> Created<ShareLink> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let project = store.project(project_id).cloned().ok_or_else(ApiFailure::not_found)?;
    if project.owner != user.id {
        return Err(ApiFailure::error(
            StatusCode::FORBIDDEN,
            "You do not have permission to share this project.",
        ));
    }

    if let Some(existing) = store
        .share_links
        .iter()
        .find(|link| link.project == project_id && link.is_active)
    {
        return Ok((StatusCode::OK, Json(existing.clone())));
    }

    let link = ShareLink::new(&project, &user);
    info!(project = %project_id, link = %link.id, "share link created");
    store.share_links.push(link.clone());
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn list_share_links(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<ShareLink>>, ApiFailure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let project = filter.project()?;
    let mut links: Vec<ShareLink> = store
        .share_links
        .iter()
        .filter(|link| match project {
            Some(id) => link.project == id,
            None => link.created_by == user.id,
        })
        .cloned()
        .collect();
    links.sort_by_key(|link| Reverse(link.created_at));
    Ok(Json(links))
}

pub async fn update_share_link(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<ShareLinkInput>,
) -> Result<Json<ShareLink>, ApiFailure> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let link = store
        .share_links
        .iter_mut()
        .find(|link| link.id == id && link.created_by == user.id)
        .ok_or_else(ApiFailure::not_found)?;
    if let Some(is_active) = input.is_active {
        link.is_active = is_active;
    }
    Ok(Json(link.clone()))
}

// --- notes ---

pub async fn list_notes(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Note>>, ApiFailure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let project = filter.project()?;
    if let Some(id) = project {
        store.project(id).ok_or_else(ApiFailure::not_found)?;
    }
    let mut notes: Vec<Note> = store
        .notes
        .iter()
        .filter(|note| match project {
            Some(id) => note.project == id,
            None => store.owns_project(&user, note.project),
        })
        .cloned()
        .collect();
    notes.sort_by_key(|note| Reverse(note.created_at));
    Ok(Json(notes))
}

pub async fn create_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NoteInput>,
) -> Created<Note> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let (project, _) = project_for_create(
        &store,
        user.id,
        input.project.as_deref(),
        "You don't have permission to add notes to this project.",
    )?;
    let now = Utc::now();
    let note = Note {
        id: Uuid::new_v4(),
        project,
        content: input.content,
        created_at: now,
        updated_at: now,
    };
    store.notes.push(note.clone());
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<NoteInput>,
) -> Result<Json<Note>, ApiFailure> {
    let mut guard = db.write().await;
    let store = &mut *guard;
    let user = authorize_write(store, &headers)?;
    let projects = &store.projects;
    let note = store
        .notes
        .iter_mut()
        .find(|note| note.id == id && projects.iter().any(|p| p.id == note.project && p.owner == user.id))
        .ok_or_else(ApiFailure::not_found)?;
    if input.content.is_some() {
        note.content = input.content;
    }
    note.updated_at = Utc::now();
    Ok(Json(note.clone()))
}

pub async fn delete_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let index = store
        .notes
        .iter()
        .position(|note| note.id == id && store.owns_project(&user, note.project))
        .ok_or_else(ApiFailure::not_found)?;
    store.notes.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

// --- comments ---

pub async fn list_comments(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Comment>>, ApiFailure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let project = filter.project()?;
    let mut comments: Vec<Comment> = store
        .comments
        .iter()
        .filter(|comment| match project {
            Some(id) => comment.project == id,
            None => store.owns_project(&user, comment.project),
        })
        .cloned()
        .collect();
    comments.sort_by_key(|comment| Reverse(comment.timestamp));
    Ok(Json(comments))
}

pub async fn create_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CommentInput>,
) -> Created<Comment> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let message = required("message", input.message.as_deref())?.to_string();
    let (project, _) = project_for_create(
        &store,
        user.id,
        input.project.as_deref(),
        "You don't have permission to comment on this project.",
    )?;
    let now = Utc::now();
    let comment = Comment {
        id: Uuid::new_v4(),
        project,
        user: user.id,
        user_name: user.name,
        user_email: user.email,
        message,
        timestamp: now,
        updated_at: now,
    };
    store.comments.push(comment.clone());
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Comment>, ApiFailure> {
    let mut guard = db.write().await;
    let store = &mut *guard;
    let user = authorize_write(store, &headers)?;
    let message = match input.message.as_deref() {
        Some(message) => Some(required("message", Some(message))?.to_string()),
        None => None,
    };
    let projects = &store.projects;
    let comment = store
        .comments
        .iter_mut()
        .find(|c| c.id == id && projects.iter().any(|p| p.id == c.project && p.owner == user.id))
        .ok_or_else(ApiFailure::not_found)?;
    if let Some(message) = message {
        comment.message = message;
    }
    comment.updated_at = Utc::now();
    Ok(Json(comment.clone()))
}

pub async fn delete_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let index = store
        .comments
        .iter()
        .position(|c| c.id == id && store.owns_project(&user, c.project))
        .ok_or_else(ApiFailure::not_found)?;
    store.comments.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

// --- reminders ---

pub async fn list_reminders(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Reminder>>, ApiFailure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let project = filter.project()?;
    let now = Utc::now();
    let mut reminders: Vec<Reminder> = store
        .reminders
        .iter_mut()
        .filter(|r| match project {
            Some(id) => r.project == id,
            None => r.created_by == user.id,
        })
        .map(|r| {
            r.refresh_status(now);
            r.clone()
        })
        .collect();
    reminders.sort_by_key(|r| r.reminder_datetime);
    Ok(Json(reminders))
}

pub async fn create_reminder(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ReminderInput>,
) -> Created<Reminder> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let title = required("title", input.title.as_deref())?.to_string();
    let raw_datetime = required("reminder_datetime", input.reminder_datetime.as_deref())?;
    let reminder_datetime = datetime("reminder_datetime", raw_datetime)?;
    let now = Utc::now();
    if reminder_datetime < now {
        return Err(ApiFailure::field(
            "reminder_datetime",
            "Reminder datetime must be in the future.",
        ));
    }
    let (project, project_name) = project_for_create(
        &store,
        user.id,
        input.project.as_deref(),
        "You don't have permission to create reminders for this project.",
    )?;

    let status = ReminderStatus::for_datetime(reminder_datetime, now);
    let reminder = Reminder {
        id: Uuid::new_v4(),
        project,
        project_name,
        title,
        reminder_datetime,
        status,
        status_display: status.display().to_string(),
        created_at: now,
        updated_at: now,
        created_by: user.id,
        created_by_name: user.name,
    };
    store.reminders.push(reminder.clone());
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn update_reminder(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<ReminderInput>,
) -> Result<Json<Reminder>, ApiFailure> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let title = match input.title.as_deref() {
        Some(title) => Some(required("title", Some(title))?.to_string()),
        None => None,
    };
    let reminder_datetime = match input.reminder_datetime.as_deref() {
        Some(raw) => Some(datetime("reminder_datetime", raw)?),
        None => None,
    };
    let reminder = store
        .reminders
        .iter_mut()
        .find(|r| r.id == id && r.created_by == user.id)
        .ok_or_else(ApiFailure::not_found)?;
    if let Some(title) = title {
        reminder.title = title;
    }
    if let Some(at) = reminder_datetime {
        reminder.reminder_datetime = at;
    }
    let now = Utc::now();
    if reminder.status == ReminderStatus::Pending {
        reminder.set_status(ReminderStatus::for_datetime(reminder.reminder_datetime, now));
    }
    reminder.updated_at = now;
    Ok(Json(reminder.clone()))
}

pub async fn delete_reminder(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let user = authorize_write(&store, &headers)?;
    let index = store
        .reminders
        .iter()
        .position(|r| r.id == id && r.created_by == user.id)
        .ok_or_else(ApiFailure::not_found)?;
    store.reminders.remove(index);
    Ok(StatusCode::NO_CONTENT)
}
