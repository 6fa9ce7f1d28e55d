//! Scraping session: one HTTP client, one retry policy, one stats sink.
//!
//! Single-attempt calls (`get_text`, `post_json_text`, `post_form_text`)
//! return a `FetchError` for anything but HTTP 200. The `*_with_retry`
//! variants wrap them in [`retry_on_failure`], count every failed attempt in
//! the shared [`ProcessingStats`], and collapse exhaustion to `None`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::Serialize;

use crate::config::{HeaderSet, DEFAULT_USER_AGENT, HTTP_STATUS_OK, REQUEST_TIMEOUT_SECS};
use crate::error_handling::{
    update_error_stats, ErrorType, FetchError, InitializationError, ProcessingStats,
};
use crate::initialization::init_client;

use super::retry::{retry_on_failure, RetryPolicy};

/// Settings for building a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed headers sent with every request.
    pub headers: HeaderSet,
    /// User-Agent header value.
    pub user_agent: String,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Retry behaviour for the `*_with_retry` calls.
    pub retry: RetryPolicy,
}

impl SessionConfig {
    /// Default settings for a site's header set.
    pub fn for_headers(headers: HeaderSet) -> Self {
        Self {
            headers,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// An HTTP client bound to one site's headers and retry policy.
///
/// The client keeps cookies for the lifetime of the session only when the
/// caller asks for it via [`Session::with_cookies`].
#[derive(Debug, Clone)]
pub struct Session {
    client: reqwest::Client,
    retry: RetryPolicy,
    stats: Arc<ProcessingStats>,
}

impl Session {
    /// Builds a session from `config`, reporting failures into `stats`.
    ///
    /// # Errors
    ///
    /// Returns an error if a header is invalid or the client cannot be built.
    pub fn new(
        config: SessionConfig,
        stats: Arc<ProcessingStats>,
    ) -> Result<Self, InitializationError> {
        let client = init_client(config.headers, &config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            retry: config.retry,
            stats,
        })
    }

    /// Builds a session whose client stores and replays cookies.
    ///
    /// Form-driven pages hand out a session cookie on the first GET and
    /// expect it back on every postback.
    ///
    /// # Errors
    ///
    /// Returns an error if a header is invalid or the client cannot be built.
    pub fn with_cookies(
        config: SessionConfig,
        stats: Arc<ProcessingStats>,
    ) -> Result<Self, InitializationError> {
        let client = reqwest::ClientBuilder::new()
            .default_headers(crate::initialization::build_default_headers(config.headers)?)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            retry: config.retry,
            stats,
        })
    }

    /// Shared statistics sink.
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Sends one request and returns the body of a 200 response.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<String, FetchError> {
        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        if status != HTTP_STATUS_OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// One GET attempt with query parameters.
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        self.send(self.client.get(url).query(query), url).await
    }

    /// One GET attempt with a tighter deadline than the session default.
    pub async fn get_text_with_timeout(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String, FetchError> {
        log::debug!("GET {url} (timeout {}s)", timeout.as_secs());
        self.send(self.client.get(url).query(query).timeout(timeout), url)
            .await
    }

    /// One POST attempt with a JSON body.
    pub async fn post_json_text<B>(&self, url: &str, body: &B) -> Result<String, FetchError>
    where
        B: Serialize + ?Sized,
    {
        log::debug!("POST {url} (json)");
        self.send(self.client.post(url).json(body), url).await
    }

    /// One POST attempt with a form-encoded body.
    pub async fn post_form_text<F>(&self, url: &str, form: &F) -> Result<String, FetchError>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("POST {url} (form)");
        self.send(self.client.post(url).form(form), url).await
    }

    /// GET with retries. `None` once every attempt failed.
    pub async fn get_with_retry(&self, url: &str, query: &[(&str, &str)]) -> Option<String> {
        let body = retry_on_failure(&self.retry, url, move || async move {
            self.counted(self.get_text(url, query).await)
        })
        .await;
        self.note_dropped(body)
    }

    /// JSON POST with retries. `None` once every attempt failed.
    pub async fn post_json_with_retry<B>(&self, url: &str, body: &B) -> Option<String>
    where
        B: Serialize + ?Sized,
    {
        let text = retry_on_failure(&self.retry, url, move || async move {
            self.counted(self.post_json_text(url, body).await)
        })
        .await;
        self.note_dropped(text)
    }

    /// Form POST with retries. `None` once every attempt failed.
    pub async fn post_form_with_retry<F>(&self, url: &str, form: &F) -> Option<String>
    where
        F: Serialize + ?Sized,
    {
        let text = retry_on_failure(&self.retry, url, move || async move {
            self.counted(self.post_form_text(url, form).await)
        })
        .await;
        self.note_dropped(text)
    }

    fn counted(&self, result: Result<String, FetchError>) -> Result<String, FetchError> {
        if let Err(e) = &result {
            update_error_stats(&self.stats, e);
        }
        result
    }

    fn note_dropped(&self, body: Option<String>) -> Option<String> {
        if body.is_none() {
            self.stats.increment_error(ErrorType::RequestDropped);
        }
        body
    }
}
