//! Async facade: one method per endpoint, grouped by resource.
//!
//! # Design
//! `ProjectFeaturesApi` pairs the sync `ProjectFeaturesClient` with a
//! `Transport`. `send` is the one place faults are caught: build errors,
//! transport errors and unparsable bodies all come back as
//! `ApiResult::Failure` and are logged at `error` level. Resource groups
//! are borrowed views that only pick the `build_*` method; they add no
//! behaviour of their own.

use std::fmt::Display;

use tracing::{debug, error};

use crate::client::ProjectFeaturesClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, RequestOptions};
use crate::result::ApiResult;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::ReminderUpdate;

#[derive(Debug, Clone)]
pub struct ProjectFeaturesApi<T> {
    client: ProjectFeaturesClient,
    transport: T,
}

impl ProjectFeaturesApi<ReqwestTransport> {
    /// Facade over a fresh `reqwest` client for `config`.
    pub fn connect(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> ProjectFeaturesApi<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: ProjectFeaturesClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &ProjectFeaturesClient {
        &self.client
    }

    pub fn share(&self) -> ShareApi<'_, T> {
        ShareApi { api: self }
    }

    pub fn notes(&self) -> NotesApi<'_, T> {
        NotesApi { api: self }
    }

    pub fn comments(&self) -> CommentsApi<'_, T> {
        CommentsApi { api: self }
    }

    pub fn reminders(&self) -> RemindersApi<'_, T> {
        RemindersApi { api: self }
    }

    /// Generic request function: merge headers, execute, fold the response.
    pub async fn fetch(&self, url: &str, options: &RequestOptions) -> ApiResult {
        self.send(Ok(self.client.build_request(url, options))).await
    }

    async fn send(&self, request: Result<HttpRequest, ApiError>) -> ApiResult {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "API Error");
                return e.into();
            }
        };

        let method = request.method.as_str();
        let url = request.url.clone();
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(method, %url, status = response.status, "request completed");
                self.client.parse_response(response)
            }
            Err(e) => {
                error!(method, %url, error = %e, "API Error");
                e.into()
            }
        }
    }
}

pub struct ShareApi<'a, T> {
    api: &'a ProjectFeaturesApi<T>,
}

impl<T: Transport> ShareApi<'_, T> {
    /// Create a share link, or get the project's existing active one.
    pub async fn share_project(&self, project_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_share_project(project_id))).await
    }

    pub async fn get_share_links(&self, project_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_get_share_links(project_id))).await
    }

    pub async fn deactivate_share_link(&self, share_link_id: impl Display) -> ApiResult {
        self.api.send(self.api.client.build_deactivate_share_link(share_link_id)).await
    }
}

pub struct NotesApi<'a, T> {
    api: &'a ProjectFeaturesApi<T>,
}

impl<T: Transport> NotesApi<'_, T> {
    pub async fn get_notes(&self, project_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_get_notes(project_id))).await
    }

    pub async fn create_note(&self, project_id: impl Display, content: &str) -> ApiResult {
        self.api.send(self.api.client.build_create_note(project_id, content)).await
    }

    pub async fn update_note(&self, note_id: impl Display, content: &str) -> ApiResult {
        self.api.send(self.api.client.build_update_note(note_id, content)).await
    }

    pub async fn delete_note(&self, note_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_delete_note(note_id))).await
    }
}

pub struct CommentsApi<'a, T> {
    api: &'a ProjectFeaturesApi<T>,
}

impl<T: Transport> CommentsApi<'_, T> {
    pub async fn get_comments(&self, project_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_get_comments(project_id))).await
    }

    pub async fn create_comment(&self, project_id: impl Display, message: &str) -> ApiResult {
        self.api.send(self.api.client.build_create_comment(project_id, message)).await
    }

    pub async fn update_comment(&self, comment_id: impl Display, message: &str) -> ApiResult {
        self.api.send(self.api.client.build_update_comment(comment_id, message)).await
    }

    pub async fn delete_comment(&self, comment_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_delete_comment(comment_id))).await
    }
}

pub struct RemindersApi<'a, T> {
    api: &'a ProjectFeaturesApi<T>,
}

impl<T: Transport> RemindersApi<'_, T> {
    pub async fn get_reminders(&self, project_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_get_reminders(project_id))).await
    }

    pub async fn create_reminder(
        &self,
        project_id: impl Display,
        title: &str,
        reminder_datetime: &str,
    ) -> ApiResult {
        let request = self
            .api
            .client
            .build_create_reminder(project_id, title, reminder_datetime);
        self.api.send(request).await
    }

    pub async fn update_reminder(&self, reminder_id: impl Display, update: &ReminderUpdate) -> ApiResult {
        self.api.send(self.api.client.build_update_reminder(reminder_id, update)).await
    }

    pub async fn delete_reminder(&self, reminder_id: impl Display) -> ApiResult {
        self.api.send(Ok(self.api.client.build_delete_reminder(reminder_id))).await
    }
}
