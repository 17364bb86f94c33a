use mock_server::{Store, User};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_SESSION: &str = "demo-session";
const DEMO_CSRF_TOKEN: &str = "demo-csrf-token";

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut store = Store::default();
    store.add_user(
        DEMO_SESSION,
        User {
            id: 1,
            name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
        },
    );
    let project = store.add_project("Demo project", 1);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, %project, "listening");
    info!(
        "cookie for clients: sessionid={DEMO_SESSION}; csrftoken={DEMO_CSRF_TOKEN}"
    );
    mock_server::run(listener, store).await
}
