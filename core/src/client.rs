//! Stateless HTTP request builder and response parser for the project
//! features API.
//!
//! # Design
//! `ProjectFeaturesClient` holds only an immutable `ClientConfig`. Every
//! endpoint has a `build_*` method producing an `HttpRequest`; all responses
//! go through the single `parse_response`, which folds status codes, content
//! types and error bodies into an `ApiResult`. The caller (or a `Transport`)
//! executes the round-trip in between.

use std::fmt::Display;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::{ClientConfig, CSRF_HEADER};
use crate::error::ApiError;
use crate::http::{merge_headers, Credentials, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::result::{extract_error_message, ApiResult};
use crate::types::{
    CommentMessage, NewComment, NewNote, NewReminder, NoteContent, ReminderUpdate, ShareLinkUpdate,
};

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ProjectFeaturesClient {
    config: ClientConfig,
}

impl ProjectFeaturesClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `Content-Type: application/json` plus the CSRF header when a token is
    /// configured.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())];
        if let Some(token) = &self.config.csrf_token {
            headers.push((CSRF_HEADER.to_string(), token.clone()));
        }
        headers
    }

    /// Generic request builder: caller headers are merged over the defaults
    /// and the request is restricted to same-origin credentials.
    pub fn build_request(&self, url: &str, options: &RequestOptions) -> HttpRequest {
        debug!(method = options.method.as_str(), url, "building request");
        HttpRequest {
            method: options.method,
            url: url.to_string(),
            headers: merge_headers(&self.default_headers(), &options.headers),
            body: options.body.clone(),
            credentials: Credentials::SameOrigin,
        }
    }

    /// Fold any response into the uniform result.
    pub fn parse_response(&self, response: HttpResponse) -> ApiResult {
        parse_response(response)
    }

    // --- share links ---

    pub fn build_share_project(&self, project_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("/projects/{project_id}/share/"))
    }

    pub fn build_get_share_links(&self, project_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Get, &by_project("/share-links/", project_id))
    }

    pub fn build_deactivate_share_link(&self, share_link_id: impl Display) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Patch,
            &format!("/share-links/{share_link_id}/"),
            &ShareLinkUpdate { is_active: false },
        )
    }

    // --- notes ---

    pub fn build_get_notes(&self, project_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Get, &by_project("/notes/", project_id))
    }

    pub fn build_create_note(&self, project_id: impl Display, content: &str) -> Result<HttpRequest, ApiError> {
        let body = NewNote {
            project: project_id.to_string(),
            content: content.to_string(),
        };
        self.request_with_body(HttpMethod::Post, "/notes/", &body)
    }

    pub fn build_update_note(&self, note_id: impl Display, content: &str) -> Result<HttpRequest, ApiError> {
        let body = NoteContent {
            content: content.to_string(),
        };
        self.request_with_body(HttpMethod::Patch, &format!("/notes/{note_id}/"), &body)
    }

    pub fn build_delete_note(&self, note_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/notes/{note_id}/"))
    }

    // --- comments ---

    pub fn build_get_comments(&self, project_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Get, &by_project("/comments/", project_id))
    }

    pub fn build_create_comment(&self, project_id: impl Display, message: &str) -> Result<HttpRequest, ApiError> {
        let body = NewComment {
            project: project_id.to_string(),
            message: message.to_string(),
        };
        self.request_with_body(HttpMethod::Post, "/comments/", &body)
    }

    pub fn build_update_comment(&self, comment_id: impl Display, message: &str) -> Result<HttpRequest, ApiError> {
        let body = CommentMessage {
            message: message.to_string(),
        };
        self.request_with_body(HttpMethod::Patch, &format!("/comments/{comment_id}/"), &body)
    }

    pub fn build_delete_comment(&self, comment_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/comments/{comment_id}/"))
    }

    // --- reminders ---

    pub fn build_get_reminders(&self, project_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Get, &by_project("/reminders/", project_id))
    }

    pub fn build_create_reminder(
        &self,
        project_id: impl Display,
        title: &str,
        reminder_datetime: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = NewReminder {
            project: project_id.to_string(),
            title: title.to_string(),
            reminder_datetime: reminder_datetime.to_string(),
        };
        self.request_with_body(HttpMethod::Post, "/reminders/", &body)
    }

    pub fn build_update_reminder(
        &self,
        reminder_id: impl Display,
        update: &ReminderUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Patch, &format!("/reminders/{reminder_id}/"), update)
    }

    pub fn build_delete_reminder(&self, reminder_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/reminders/{reminder_id}/"))
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        self.build_request(&self.config.endpoint(path), &RequestOptions::new(method))
    }

    fn request_with_body<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let options = RequestOptions::new(method).with_body(body);
        Ok(self.build_request(&self.config.endpoint(path), &options))
    }
}

/// Map a response to `ApiResult`.
///
/// 204 short-circuits to an empty success. Bodies are parsed only when the
/// content type says JSON; anything else is an empty object. Non-2xx
/// statuses become failures with the body's message or `HTTP <status>`.
pub fn parse_response(response: HttpResponse) -> ApiResult {
    if response.status == 204 {
        return ApiResult::empty();
    }

    let is_json = response
        .header("content-type")
        .is_some_and(|content_type| content_type.contains(JSON_CONTENT_TYPE));
    let data = if is_json {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(data) => data,
            Err(e) => {
                error!(status = response.status, error = %e, "response body is not valid JSON");
                return ApiResult::failure(e.to_string());
            }
        }
    } else {
        Value::Object(Map::new())
    };

    if !response.is_success() {
        let message = extract_error_message(&data).unwrap_or_else(|| format!("HTTP {}", response.status));
        debug!(status = response.status, %message, "request failed");
        return ApiResult::failure(message);
    }

    ApiResult::success(data)
}

fn by_project(path: &str, project_id: impl Display) -> String {
    format!("{path}?project_id={}", urlencoding::encode(&project_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ProjectFeaturesClient {
        ProjectFeaturesClient::new(ClientConfig::new("http://localhost:8000").with_csrf_token("tok"))
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn default_headers_carry_json_and_token() {
        let req = client().build_get_notes(1);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("X-CSRFToken"), Some("tok"));
        assert_eq!(req.credentials, Credentials::SameOrigin);
    }

    #[test]
    fn missing_token_omits_csrf_header() {
        let client = ProjectFeaturesClient::new(ClientConfig::new("http://localhost:8000"));
        let req = client.build_delete_note(1);
        assert!(req.header("X-CSRFToken").is_none());
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn caller_headers_override_defaults() {
        let options = RequestOptions::new(HttpMethod::Get)
            .with_header("x-csrftoken", "other")
            .with_header("Accept", "application/json");
        let req = client().build_request("http://localhost:8000/x", &options);
        assert_eq!(req.header("X-CSRFToken"), Some("other"));
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert_eq!(req.headers.len(), 3);
        // options are left as the caller built them
        assert_eq!(options.headers.len(), 2);
    }

    #[test]
    fn update_note_sends_only_content() {
        let req = client().build_update_note(5, "hello").unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:8000/project-features/api/notes/5/");
        assert_eq!(req.body.as_deref(), Some(r#"{"content":"hello"}"#));
    }

    #[test]
    fn share_project_posts_without_body() {
        let req = client().build_share_project("p1");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8000/project-features/api/projects/p1/share/");
        assert!(req.body.is_none());
    }

    #[test]
    fn deactivate_share_link_sends_inactive_flag() {
        let req = client().build_deactivate_share_link("s1").unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:8000/project-features/api/share-links/s1/");
        assert_eq!(body(&req), json!({"is_active": false}));
    }

    #[test]
    fn list_endpoints_filter_by_project() {
        let c = client();
        assert_eq!(
            c.build_get_share_links("p").url,
            "http://localhost:8000/project-features/api/share-links/?project_id=p"
        );
        assert_eq!(
            c.build_get_comments("p").url,
            "http://localhost:8000/project-features/api/comments/?project_id=p"
        );
        assert_eq!(
            c.build_get_reminders("p").url,
            "http://localhost:8000/project-features/api/reminders/?project_id=p"
        );
        assert_eq!(c.build_get_reminders("p").method, HttpMethod::Get);
    }

    #[test]
    fn project_filter_is_percent_encoded() {
        let req = client().build_get_notes("a b&c");
        assert!(req.url.ends_with("/notes/?project_id=a%20b%26c"));
    }

    #[test]
    fn create_payloads_carry_project() {
        let c = client();
        let note = c.build_create_note("p", "text").unwrap();
        assert_eq!(note.method, HttpMethod::Post);
        assert_eq!(body(&note), json!({"project": "p", "content": "text"}));

        let comment = c.build_create_comment("p", "hi").unwrap();
        assert!(comment.url.ends_with("/comments/"));
        assert_eq!(body(&comment), json!({"project": "p", "message": "hi"}));

        let reminder = c.build_create_reminder("p", "Ship", "2030-01-01T10:00").unwrap();
        assert_eq!(
            body(&reminder),
            json!({"project": "p", "title": "Ship", "reminder_datetime": "2030-01-01T10:00"})
        );
    }

    #[test]
    fn update_reminder_forwards_only_set_fields() {
        let req = client().build_update_reminder(9, &ReminderUpdate::title("New")).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert!(req.url.ends_with("/reminders/9/"));
        assert_eq!(body(&req), json!({"title": "New"}));
    }

    #[test]
    fn deletes_have_no_body() {
        let c = client();
        for req in [c.build_delete_note(1), c.build_delete_comment(2), c.build_delete_reminder(3)] {
            assert_eq!(req.method, HttpMethod::Delete);
            assert!(req.body.is_none());
        }
    }

    #[test]
    fn parse_no_content_ignores_body() {
        let result = client().parse_response(json_response(204, "not json at all"));
        assert_eq!(result, ApiResult::success(json!({})));
    }

    #[test]
    fn parse_json_success() {
        let result = client().parse_response(json_response(200, r#"{"foo":"bar"}"#));
        assert_eq!(result, ApiResult::success(json!({"foo": "bar"})));
    }

    #[test]
    fn parse_json_list_success() {
        let result = client().parse_response(json_response(200, r#"[{"id":1}]"#));
        assert_eq!(result.data(), Some(&json!([{"id": 1}])));
    }

    #[test]
    fn parse_charset_suffix_still_json() {
        let mut response = json_response(201, r#"{"id":1}"#);
        response.headers[0].1 = "application/json; charset=utf-8".to_string();
        assert_eq!(client().parse_response(response).data(), Some(&json!({"id": 1})));
    }

    #[test]
    fn parse_non_json_success_is_empty() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: "<html></html>".to_string(),
        };
        assert_eq!(client().parse_response(response), ApiResult::empty());
    }

    #[test]
    fn parse_error_field() {
        let result = client().parse_response(json_response(400, r#"{"error":"bad input"}"#));
        assert_eq!(result, ApiResult::failure("bad input"));
    }

    #[test]
    fn parse_whitespace_error_is_passed_through() {
        let result = client().parse_response(json_response(400, r#"{"error":" "}"#));
        assert_eq!(result.error(), Some(" "));
    }

    #[test]
    fn parse_detail_field() {
        let result = client().parse_response(json_response(400, r#"{"detail":"x"}"#));
        assert_eq!(result.error(), Some("x"));
    }

    #[test]
    fn parse_error_without_message_mentions_status() {
        let result = client().parse_response(json_response(400, r#"{"content":["This field is required."]}"#));
        assert!(result.error().unwrap().contains("400"));
    }

    #[test]
    fn parse_non_json_error_uses_status() {
        let response = HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(client().parse_response(response).error(), Some("HTTP 502"));
    }

    #[test]
    fn parse_bad_json_is_failure() {
        let result = client().parse_response(json_response(200, "not json"));
        assert!(!result.is_success());
        assert!(!result.error().unwrap().is_empty());
    }
}
