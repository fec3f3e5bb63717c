use super::error::{ErrorKind, Result as ResolveResult};
use super::{Label, LabelResolver};
use crate::code::Code;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use async_trait::async_trait;
use exn::ResultExt;
use rand::Rng;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use std::ops::Deref;
use std::time::Duration;
use tracing::instrument;

/// Everything needed to establish the lookup session.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Service root; the code is appended as a single path segment.
    pub base_url: String,
    pub timeout: Duration,
    /// Inclusive bounds of the uniformly distributed pre-request delay.
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

/// Resolves labels by scraping `{base_url}/{code}`.
///
/// One resolver owns one [`Client`], so every lookup in a run shares a single
/// connection pool. Requests carry a browser-like header set because the
/// service turns away anything that looks like a bot.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: Client,
    base_url: Url,
    min_delay_ms: u64,
    max_delay_ms: u64,
}
impl HttpResolver {
    /// Establishes the shared HTTP session.
    ///
    /// # Errors
    /// Returns [`LibraryErrorKind::Session`] if the base URL can't be used as
    /// a base for paths, a header value is invalid, or the client can't be
    /// built. A run cannot proceed without a session.
    pub fn new(settings: &HttpSettings) -> LibraryResult<Self> {
        Self::new_inner(settings).or_raise(|| LibraryErrorKind::Session)
    }

    fn new_inner(settings: &HttpSettings) -> ResolveResult<Self> {
        let base_url = Url::parse(&settings.base_url).or_raise(|| ErrorKind::Session)?;
        if base_url.cannot_be_a_base() {
            exn::bail!(ErrorKind::Session);
        }
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&settings.user_agent).or_raise(|| ErrorKind::Session)?);
        headers.insert(ACCEPT, HeaderValue::from_str(&settings.accept).or_raise(|| ErrorKind::Session)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language).or_raise(|| ErrorKind::Session)?,
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .or_raise(|| ErrorKind::Session)?;
        let min_delay_ms = u64::try_from(settings.min_delay.as_millis()).unwrap_or(u64::MAX);
        let max_delay_ms = u64::try_from(settings.max_delay.as_millis()).unwrap_or(u64::MAX).max(min_delay_ms);
        Ok(Self { client, base_url, min_delay_ms, max_delay_ms })
    }

    /// `{base_url}/{code}`, with the code percent-encoded as one segment.
    fn url(&self, code: &Code) -> Url {
        let mut url = self.base_url.clone();
        // Infallible: cannot-be-a-base URLs are rejected in the constructor.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(code.as_str());
        }
        url
    }

    fn delay(&self) -> Duration {
        if self.max_delay_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms))
    }

    /// The fallible half of [`resolve`](LabelResolver::resolve).
    async fn try_resolve(&self, code: &Code) -> ResolveResult<Label> {
        tokio::time::sleep(self.delay()).await;
        let url = self.url(code);
        tracing::info!(%code, %url, "Looking up label");
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::Request)?;
        let status = response.status();
        if status != StatusCode::OK {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Body)?;
        let label = shelve_extract::extract(&body).or_raise(|| ErrorKind::NotFound)?;
        Ok(Label::new(label))
    }
}

#[async_trait]
impl LabelResolver for HttpResolver {
    #[instrument(level = "debug", skip_all, fields(%code))]
    async fn resolve(&self, code: &Code) -> Label {
        match self.try_resolve(code).await {
            Ok(label) => {
                tracing::info!(%code, %label, "Resolved label");
                label
            },
            Err(e) => {
                match e.deref() {
                    ErrorKind::NotFound => tracing::warn!(%code, "No label found on page"),
                    ErrorKind::Status(status) => tracing::error!(%code, status, "Lookup failed"),
                    kind => tracing::error!(%code, %kind, error = ?e, "Lookup failed"),
                }
                Label::fallback()
            },
        }
    }
}
