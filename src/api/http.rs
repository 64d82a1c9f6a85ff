//! `ureq` client for the ingestion API.

use std::time::Duration;

use rand::Rng;
use serde_json::{Value, json};

use crate::api::endpoints::{self, endpoint_for};
use crate::api::error::{ApiError, ApiResult};
use crate::api::IngestApi;
use crate::config::IngestConfig;
use crate::model::{DocumentKey, Item};

/// HTTP implementation of [`IngestApi`].
///
/// Transport failures and 5xx responses are retried up to `max_retries`
/// times with exponential backoff plus jitter. Any other non-2xx response
/// fails immediately.
pub struct HttpIngestApi {
    agent: ureq::Agent,
    root: String,
    api_key: Option<String>,
    max_retries: u32,
    backoff: Duration,
}

enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

impl HttpIngestApi {
    pub fn new(config: &IngestConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .build();
        Self {
            agent,
            root: config.api_root(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.root)
    }

    /// Send one request, once.
    fn send_once(
        &self,
        method: &Method,
        endpoint: &str,
        query: Option<(&str, &str)>,
        body: Option<&Value>,
    ) -> ApiResult<ureq::Response> {
        let mut request = self.agent.request(method.as_str(), &self.url(endpoint));
        if let Some(token) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        if let Some((name, value)) = query {
            request = request.query(name, value);
        }
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        match result {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(status, _)) => Err(ApiError::Rejected {
                endpoint: endpoint.to_string(),
                status,
            }),
            Err(ureq::Error::Transport(t)) => Err(ApiError::Transport {
                endpoint: endpoint.to_string(),
                message: t.to_string(),
            }),
        }
    }

    /// Send with retries on transport errors and server errors.
    fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<(&str, &str)>,
        body: Option<&Value>,
    ) -> ApiResult<ureq::Response> {
        let mut attempt = 0;
        loop {
            match self.send_once(&method, endpoint, query, body) {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_delay(attempt);
                    tracing::debug!(
                        endpoint,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying request"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff.as_millis() as u64;
        let exp = base.saturating_mul(1u64 << attempt.min(16));
        let jitter = if base == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=base)
        };
        Duration::from_millis(exp + jitter)
    }

    fn patch_document(&self, endpoint: &str, key: DocumentKey) -> ApiResult<()> {
        let key = key.to_string();
        self.send(Method::Patch, endpoint, Some(("head_item_key", &key)), None)
            .map(drop)
    }
}

impl IngestApi for HttpIngestApi {
    fn is_active(&self, key: DocumentKey) -> ApiResult<bool> {
        let endpoint = endpoints::HEAD_IS_ACTIVE;
        let key = key.to_string();
        match self.send(Method::Get, endpoint, Some(("head_item_key", &key)), None) {
            Ok(resp) if resp.status() == 200 => {
                let body: Value = resp.into_json().map_err(|e| ApiError::Transport {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;
                Ok(body.as_bool().unwrap_or(false))
            }
            Ok(_) => Ok(false),
            // Any refusal reads as "not active"; only an unreachable store is an error.
            Err(ApiError::Rejected { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn push(&self, item: &Item) -> ApiResult<()> {
        let body = item.body().map_err(|source| ApiError::Serialize {
            kind: item.kind.to_string(),
            source,
        })?;
        let endpoint = endpoint_for(item.kind);
        self.send(Method::Post, endpoint, None, Some(&body))
            .map(drop)
    }

    fn activate(&self, key: DocumentKey) -> ApiResult<()> {
        self.patch_document(endpoints::HEAD_ACTIVE, key)
    }

    fn generate(&self, key: DocumentKey) -> ApiResult<()> {
        self.patch_document(endpoints::HEAD_GENERATE, key)
    }

    fn request_summary(&self, key: DocumentKey) -> ApiResult<()> {
        let body = json!({ "head_item_key": key.to_string() });
        self.send(Method::Post, endpoints::TITLE_SUMMARY, None, Some(&body))
            .map(drop)
    }
}
