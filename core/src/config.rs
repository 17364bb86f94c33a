//! Client configuration.
//!
//! The CSRF token is read once, here, and the resulting `ClientConfig` is
//! immutable for the life of the client.

/// Path prefix of every project-features endpoint.
pub const API_BASE_PATH: &str = "/project-features/api";

/// Cookie holding the CSRF token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header the server expects the CSRF token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    /// Origin the API lives on, without a trailing slash. Empty means
    /// origin-relative URLs.
    pub base_url: String,
    /// Value sent in [`CSRF_HEADER`]; the header is omitted when `None`.
    pub csrf_token: Option<String>,
    /// Raw `name=value; name=value` cookie string attached by transports
    /// that honour the credentials policy.
    pub cookies: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: None,
            cookies: None,
        }
    }

    /// Build a config from a browser-style cookie string, taking the CSRF
    /// token from its `csrftoken` entry.
    pub fn from_cookie_header(base_url: &str, cookies: &str) -> Self {
        let mut config = Self::new(base_url);
        config.csrf_token = read_cookie(cookies, CSRF_COOKIE);
        if !cookies.trim().is_empty() {
            config.cookies = Some(cookies.to_string());
        }
        config
    }

    /// Configuration from the environment:
    /// `PROJECT_FEATURES_BASE_URL`, `PROJECT_FEATURES_COOKIE` and
    /// `PROJECT_FEATURES_CSRF_TOKEN` (which overrides the cookie's token).
    pub fn from_env() -> Self {
        let base_url = std::env::var("PROJECT_FEATURES_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = match std::env::var("PROJECT_FEATURES_COOKIE") {
            Ok(cookies) => Self::from_cookie_header(&base_url, &cookies),
            Err(_) => Self::new(&base_url),
        };
        if let Ok(token) = std::env::var("PROJECT_FEATURES_CSRF_TOKEN") {
            config.csrf_token = Some(token);
        }
        config
    }

    pub fn with_csrf_token(mut self, token: &str) -> Self {
        self.csrf_token = Some(token.to_string());
        self
    }

    pub fn with_cookies(mut self, cookies: &str) -> Self {
        self.cookies = Some(cookies.to_string());
        self
    }

    /// Absolute (or origin-relative) URL of an API path such as `/notes/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{API_BASE_PATH}{path}", self.base_url)
    }
}

/// Value of cookie `name` in a `document.cookie` style string.
///
/// Entries are `;`-separated and trimmed; the first match wins. Values are
/// percent-decoded, falling back to the raw text when decoding fails.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|entry| entry.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
}
