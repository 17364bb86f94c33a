//! Client for the project features API (share links, notes, comments,
//! reminders).
//!
//! # Overview
//! `ProjectFeaturesClient` builds `HttpRequest` values and parses
//! `HttpResponse` values without touching the network (host-does-IO
//! pattern). `ProjectFeaturesApi` wraps it with a `Transport` and exposes
//! async per-resource method groups that always return an `ApiResult`.
//!
//! # Design
//! - Configuration, including the CSRF token, is read once into an
//!   immutable `ClientConfig` and passed to the constructor.
//! - Every response, whatever its status or content type, goes through one
//!   `parse_response`; faults never escape `ProjectFeaturesApi`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod result;
pub mod transport;
pub mod types;

pub use api::{CommentsApi, NotesApi, ProjectFeaturesApi, RemindersApi, ShareApi};
pub use client::{parse_response, ProjectFeaturesClient};
pub use config::{read_cookie, ClientConfig, API_BASE_PATH};
pub use error::ApiError;
pub use format::{format_date_for_input, format_date_time, DateFormatError};
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use result::{extract_error_message, ApiResult};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Comment, CommentMessage, NewComment, NewNote, NewReminder, Note, NoteContent, Reminder,
    ReminderStatus, ReminderUpdate, ShareLink, ShareLinkUpdate,
};
