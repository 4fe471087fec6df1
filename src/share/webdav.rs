//! WebDAV file share client.

use super::{FileShare, ShareEntry, multistatus, normalize_path};
use crate::config::ShareConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:resourcetype/>
    <D:getcontentlength/>
    <D:getlastmodified/>
  </D:prop>
</D:propfind>"#;

/// WebDAV client for the share exposing completed jobs
///
/// Two HTTP clients are kept: one with a total request timeout for listings and HEAD
/// requests, and one with only a connect timeout for long-running streaming reads.
#[derive(Clone, Debug)]
pub struct WebDavShare {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    base_url: Option<url::Url>,
    username: Option<String>,
    password: Option<String>,
}

impl WebDavShare {
    /// Create a share client from configuration
    ///
    /// An unset share URL is accepted here and reported when the share is first used.
    pub fn new(config: &ShareConfig) -> Result<Self> {
        let base_url = match config.url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(url::Url::parse(raw).map_err(|e| {
                Error::config(format!("invalid file share URL '{raw}': {e}"), "share.url")
            })?),
            _ => None,
        };

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            client,
            stream_client,
            base_url,
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone(),
        })
    }

    fn base_url(&self) -> Result<&url::Url> {
        self.base_url
            .as_ref()
            .ok_or_else(|| Error::config("file share URL is not configured", "share.url"))
    }

    /// Full URL of a share path, with every segment percent-encoded
    pub fn url_for(&self, path: &str) -> Result<url::Url> {
        let base = self.base_url()?;
        let encoded: Vec<String> = normalize_path(path)
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();

        let mut target = base.clone();
        let joined = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            encoded.join("/")
        );
        target.set_path(&joined);
        Ok(target)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    /// Read a file from the share
    ///
    /// `headers` are sent as-is (callers decide which client headers to pass through).
    /// HEAD requests use the timed client; everything else uses the streaming client so
    /// that long bodies are not cut off.
    ///
    /// # Errors
    ///
    /// - [`Error::Proxy`] if the request cannot be sent or no response arrives
    pub async fn read(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
    ) -> Result<reqwest::Response> {
        let url = self.url_for(path)?;
        let client = if method == Method::HEAD {
            &self.client
        } else {
            &self.stream_client
        };

        let request = self.authorize(client.request(method.clone(), url).headers(headers));
        request.send().await.map_err(|e| {
            tracing::warn!(path, method = %method, error = %e, "File share read failed");
            Error::Proxy(format!("file share request failed: {e}"))
        })
    }
}

#[async_trait]
impl FileShare for WebDavShare {
    async fn list(&self, path: &str) -> Result<Vec<ShareEntry>> {
        let dir = normalize_path(path);
        let mut url = self.url_for(&dir)?;
        // Collections are addressed with a trailing slash
        if !url.path().ends_with('/') {
            let with_slash = format!("{}/", url.path());
            url.set_path(&with_slash);
        }

        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| Error::Share(format!("PROPFIND method unavailable: {e}")))?;
        let request = self
            .client
            .request(method, url)
            .header("Depth", "1")
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/xml; charset=utf-8"),
            )
            .body(PROPFIND_BODY);

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status != StatusCode::MULTI_STATUS && !status.is_success() {
            return Err(Error::Share(format!("PROPFIND {dir} returned HTTP {status}")));
        }

        let body = response.text().await?;
        let base_path = self.base_url()?.path().to_string();
        let entries: Vec<ShareEntry> = multistatus::parse(&body, &base_path)?
            .into_iter()
            .filter(|entry| entry.path != dir)
            .collect();

        tracing::debug!(path = %dir, entries = entries.len(), "Listed share directory");
        Ok(entries)
    }
}
