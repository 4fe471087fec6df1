//! SABnzbd-compatible download manager client.

use super::{DownloadManager, HistoryPage, fields};
use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::types::{HistorySlot, JobId};
use async_trait::async_trait;
use serde_json::Value;

/// HTTP client for the SABnzbd `api` endpoint (also spoken by NZBDav)
#[derive(Clone, Debug)]
pub struct SabnzbdClient {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl SabnzbdClient {
    /// Create a client from the manager configuration
    ///
    /// Construction succeeds even when the manager is not configured; calls then fail
    /// with a configuration error.
    pub fn new(config: &ManagerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn api_url(&self) -> Result<url::Url> {
        let base = self
            .base_url
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| {
                Error::config("download manager base URL is not configured", "manager.base_url")
            })?;

        let api = format!("{}/api", base.trim_end_matches('/'));
        url::Url::parse(&api).map_err(|e| {
            Error::config(
                format!("invalid download manager URL '{base}': {e}"),
                "manager.base_url",
            )
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::config("download manager API key is not configured", "manager.api_key")
            })
    }

    async fn call(&self, query: &[(&str, &str)]) -> Result<(reqwest::StatusCode, Value)> {
        let api_url = self.api_url()?;
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(api_url)
            .query(query)
            .query(&[("output", "json"), ("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok((status, Value::Null));
        }
        let body = response.json::<Value>().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl DownloadManager for SabnzbdClient {
    async fn submit(&self, url: &str, category: &str, label: Option<&str>) -> Result<JobId> {
        let mut query = vec![("mode", "addurl"), ("name", url), ("cat", category)];
        if let Some(label) = label.filter(|l| !l.trim().is_empty()) {
            query.push(("nzbname", label));
        }

        let (status, body) = self.call(&query).await?;
        if !status.is_success() {
            return Err(Error::Submission(format!("manager returned HTTP {status}")));
        }
        if let Some(reason) = fields::rejection(&body) {
            return Err(Error::Submission(reason));
        }

        fields::submitted_job_id(&body)
            .ok_or_else(|| Error::Submission("manager response carried no job id".to_string()))
    }

    async fn history(&self, category: &str, page: HistoryPage) -> Result<Vec<HistorySlot>> {
        let start = page.start.to_string();
        let limit = page.limit.to_string();
        let query = [
            ("mode", "history"),
            ("cat", category),
            ("start", start.as_str()),
            ("limit", limit.as_str()),
        ];

        let (status, body) = self.call(&query).await?;
        if !status.is_success() {
            return Err(Error::Manager(format!(
                "history request returned HTTP {status}"
            )));
        }
        if let Some(reason) = fields::rejection(&body) {
            return Err(Error::Manager(reason));
        }

        Ok(fields::history_slots(&body)
            .iter()
            .filter_map(fields::history_slot)
            .collect())
    }

    fn name(&self) -> &str {
        "sabnzbd"
    }
}
