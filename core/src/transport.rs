//! Executors for `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only I/O seam. The facade hands it fully built
//! requests and gets plain `HttpResponse` data back; any 4xx/5xx is data,
//! only a missing response is an `Err`. Tests substitute their own
//! implementation to inject responses or faults.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Method, Url};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport that applies the browser credentials modes to
/// the configured cookie string.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Option<Url>,
    cookies: Option<String>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Result<Self, ApiError> {
        let origin = if config.base_url.is_empty() {
            None
        } else {
            let url = Url::parse(&config.base_url)
                .map_err(|e| ApiError::InvalidConfig(format!("base URL {:?}: {e}", config.base_url)))?;
            Some(url)
        };
        Ok(Self {
            client,
            origin,
            cookies: config.cookies.clone(),
        })
    }

    /// Cookie string to attach to a request for `url`, if any.
    fn cookies_for(&self, url: &Url, credentials: Credentials) -> Option<&str> {
        let cookies = self.cookies.as_deref()?;
        match credentials {
            Credentials::Omit => None,
            Credentials::Include => Some(cookies),
            Credentials::SameOrigin => self
                .origin
                .as_ref()
                .filter(|origin| origin.origin() == url.origin())
                .map(|_| cookies),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = Url::parse(&request.url)
            .map_err(|e| ApiError::Transport(format!("invalid URL {:?}: {e}", request.url)))?;

        let mut builder = self.client.request(method(request.method), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookies) = self.cookies_for(&url, request.credentials) {
            builder = builder.header(COOKIE, cookies);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(status, url = %url, "response received");
        Ok(HttpResponse { status, headers, body })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
