//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every endpoint
//! over real HTTP: once with the sync client and ureq as the executor, once
//! through the async facade and `ReqwestTransport`. Validates that request
//! building, credentials and response parsing work end-to-end.

use mock_server::{Store, User};
use project_features_core::{
    ApiResult, ClientConfig, Comment, HttpMethod, HttpRequest, HttpResponse, Note, ProjectFeaturesApi,
    ProjectFeaturesClient, Reminder, ReminderStatus, ReminderUpdate, ShareLink,
};
use uuid::Uuid;

const COOKIES: &str = "sessionid=s1; csrftoken=tok";

fn fixture() -> (Store, Uuid) {
    let mut store = Store::default();
    store.add_user(
        "s1",
        User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        },
    );
    let project = store.add_project("Roof", 1);
    (store, project)
}

fn future_input(hours: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::hours(hours))
        .format("%Y-%m-%dT%H:%M")
        .to_string()
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.header("Cookie", COOKIES)
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behaviour so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let body = req.body.clone().unwrap_or_default();
    let mut response = match req.method {
        HttpMethod::Get => with_headers(agent.get(&req.url), &req).call(),
        HttpMethod::Delete => with_headers(agent.delete(&req.url), &req).call(),
        HttpMethod::Post => with_headers(agent.post(&req.url), &req).send(body.as_bytes()),
        HttpMethod::Patch => with_headers(agent.patch(&req.url), &req).send(body.as_bytes()),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse { status, headers, body }
}

fn spawn_blocking_server(store: Store) -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, store).await
        })
        .unwrap();
    });
    addr
}

async fn spawn_server(store: Store) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener, store));
    addr
}

#[test]
fn sync_client_lifecycle() {
    // Step 1: start mock server on a random port.
    let (store, project) = fixture();
    let addr = spawn_blocking_server(store);
    let client = ProjectFeaturesClient::new(ClientConfig::from_cookie_header(&format!("http://{addr}"), COOKIES));
    let call = |req: HttpRequest| client.parse_response(execute(req));

    // Step 2: notes list starts empty.
    let notes: Vec<Note> = call(client.build_get_notes(project)).decode().unwrap();
    assert!(notes.is_empty(), "expected empty list");

    // Step 3: create, update, delete a note.
    let created: Note = call(client.build_create_note(project, "Measure").unwrap()).decode().unwrap();
    assert_eq!(created.content.as_deref(), Some("Measure"));
    assert_eq!(created.project, project);

    let updated: Note = call(client.build_update_note(created.id, "Measure twice").unwrap())
        .decode()
        .unwrap();
    assert_eq!(updated.content.as_deref(), Some("Measure twice"));

    let deleted = call(client.build_delete_note(created.id));
    assert_eq!(deleted, ApiResult::empty());

    // Step 4: deleting again surfaces the server's detail message.
    let missing = call(client.build_delete_note(created.id));
    assert_eq!(missing.error(), Some("Not found."));

    // Step 5: comments.
    let comment: Comment = call(client.build_create_comment(project, "Nice").unwrap()).decode().unwrap();
    assert_eq!(comment.user_name.as_deref(), Some("Ada"));
    let edited: Comment = call(client.build_update_comment(comment.id, "Very nice").unwrap())
        .decode()
        .unwrap();
    assert_eq!(edited.message, "Very nice");
    let comments: Vec<Comment> = call(client.build_get_comments(project)).decode().unwrap();
    assert_eq!(comments.len(), 1);
    assert!(call(client.build_delete_comment(comment.id)).is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn async_facade_lifecycle() {
    let (store, project) = fixture();
    let addr = spawn_server(store).await;
    let api = ProjectFeaturesApi::connect(ClientConfig::from_cookie_header(&format!("http://{addr}"), COOKIES))
        .unwrap();

    // share links: first call creates, second reuses
    let link: ShareLink = api.share().share_project(project).await.decode().unwrap();
    assert!(link.is_active);
    assert_eq!(link.project_name, "Roof");
    let again: ShareLink = api.share().share_project(project).await.decode().unwrap();
    assert_eq!(again.id, link.id);

    let deactivated: ShareLink = api.share().deactivate_share_link(link.id).await.decode().unwrap();
    assert!(!deactivated.is_active);
    let links: Vec<ShareLink> = api.share().get_share_links(project).await.decode().unwrap();
    assert_eq!(links.len(), 1);

    // notes
    let note: Note = api.notes().create_note(project, "Order tiles").await.decode().unwrap();
    let notes: Vec<Note> = api.notes().get_notes(project).await.decode().unwrap();
    assert_eq!(notes, vec![note.clone()]);
    assert!(api.notes().delete_note(note.id).await.is_success());

    // reminders
    let reminder: Reminder = api
        .reminders()
        .create_reminder(project, "Inspect roof", &future_input(72))
        .await
        .decode()
        .unwrap();
    assert_eq!(reminder.status, ReminderStatus::Pending);

    let moved: Reminder = api
        .reminders()
        .update_reminder(reminder.id, &ReminderUpdate::reminder_datetime(&future_input(3)))
        .await
        .decode()
        .unwrap();
    assert_eq!(moved.title, "Inspect roof");
    assert_eq!(moved.status, ReminderStatus::DueSoon);

    let renamed: Reminder = api
        .reminders()
        .update_reminder(reminder.id, &ReminderUpdate::title("Inspect gutters"))
        .await
        .decode()
        .unwrap();
    assert_eq!(renamed.reminder_datetime, moved.reminder_datetime);

    let past = api
        .reminders()
        .create_reminder(project, "Too late", "2000-01-01T00:00")
        .await;
    // validation errors carry no error/detail/message key
    assert_eq!(past.error(), Some("HTTP 400"));

    let reminders: Vec<Reminder> = api.reminders().get_reminders(project).await.decode().unwrap();
    assert_eq!(reminders.len(), 1);
    assert!(api.reminders().delete_reminder(reminder.id).await.is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_csrf_token_is_reported() {
    let (store, project) = fixture();
    let addr = spawn_server(store).await;
    let mut config = ClientConfig::from_cookie_header(&format!("http://{addr}"), COOKIES);
    config.csrf_token = None;
    let api = ProjectFeaturesApi::connect(config).unwrap();

    let result = api.notes().create_note(project, "x").await;
    assert_eq!(result.error(), Some("CSRF Failed: CSRF token missing."));

    // reads need no token
    assert!(api.notes().get_notes(project).await.is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn cookies_stay_on_their_origin() {
    let (store, project) = fixture();
    let addr = spawn_server(store).await;
    // configured origin differs from the server's, so no session cookie is sent
    let config = ClientConfig::from_cookie_header("http://localhost:1", COOKIES);
    let api = ProjectFeaturesApi::connect(config).unwrap();

    let url = format!("http://{addr}/project-features/api/notes/?project_id={project}");
    let result = api.fetch(&url, &Default::default()).await;
    assert_eq!(result.error(), Some("Authentication credentials were not provided."));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_failure_result() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ProjectFeaturesApi::connect(ClientConfig::new(&format!("http://{addr}"))).unwrap();
    let result = api.comments().get_comments("p").await;
    assert!(!result.is_success());
    assert!(!result.error().unwrap().is_empty());
}
