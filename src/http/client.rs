//! Outbound client for the `GET /` self-call.

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, StatusCode};
use opentelemetry::Context;
use thiserror::Error;
use url::Url;

use crate::observability::{traces, HttpMetrics};

#[derive(Debug, Error)]
pub enum HelloError {
    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// Calls the service's own `/hello` with the caller's trace context.
#[derive(Clone)]
pub struct HelloClient {
    client: reqwest::Client,
    url: Url,
    metrics: HttpMetrics,
}

impl HelloClient {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:8080`. A path
    /// prefix is kept: `http://host/app` calls `http://host/app/hello`.
    pub fn new(base_url: &str, timeout: Duration, metrics: HttpMetrics) -> Result<Self, HelloError> {
        let url = hello_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self { client, url, metrics })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch `/hello`, propagating `cx` in the `traceparent` header.
    pub async fn fetch(&self, cx: &Context) -> Result<String, HelloError> {
        let mut headers = HeaderMap::new();
        traces::inject_context(cx, &mut headers);

        let start = Instant::now();
        let result = self.client.get(self.url.clone()).headers(headers).send().await;
        self.metrics.record_client_request(
            "GET",
            result.as_ref().ok().map(|response| response.status().as_u16()),
            start,
        );

        let response = result?;
        let status = response.status();
        if !status.is_success() {
            return Err(HelloError::Status(status));
        }

        Ok(response.text().await?)
    }
}

fn hello_url(base_url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("hello")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_is_resolved_under_base_path() {
        let cases = [
            ("http://127.0.0.1:8080", "http://127.0.0.1:8080/hello"),
            ("http://127.0.0.1:8080/", "http://127.0.0.1:8080/hello"),
            ("http://gateway/app", "http://gateway/app/hello"),
            ("http://gateway/app/", "http://gateway/app/hello"),
            ("https://gateway/a/b?x=1", "https://gateway/a/b/hello"),
        ];
        for (base, expected) in cases {
            assert_eq!(hello_url(base).unwrap().as_str(), expected, "base {base}");
        }
    }

    #[test]
    fn rejects_relative_base() {
        assert!(hello_url("not a url").is_err());
    }
}
