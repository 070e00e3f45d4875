use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::config::HttpConfig;
use crate::error::{Result, RosterError};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, ETAG, LAST_MODIFIED};
use std::time::Instant;
use tracing::{debug, warn};

/// `reqwest`-backed client with a per-request timeout and a bounded retry.
pub struct ReqwestHttp {
    client: reqwest::Client,
    config: HttpConfig,
}

impl ReqwestHttp {
    pub fn new(config: HttpConfig) -> Result<Self> {
        // reqwest handles gzip/deflate decompression with those features enabled
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_once(&self, url: &str) -> Result<HttpGetResult> {
        let started = Instant::now();
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(RosterError::Status {
                url: url.to_string(),
                status,
            });
        }

        let headers = resp.headers().clone();
        let bytes = resp.bytes().await?.to_vec();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let etag = headers
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let secs = started.elapsed().as_secs_f64();
        metrics::histogram!("roster_fetch_duration_seconds").record(secs);
        debug!(url, status, bytes = bytes.len(), secs, "GET completed");

        Ok(HttpGetResult {
            status,
            bytes,
            content_type,
            etag,
            last_modified,
        })
    }
}

/// Transport failures, throttling and server errors are worth another try;
/// anything else will not change on retry.
fn is_retryable(err: &RosterError) -> bool {
    match err {
        RosterError::Http(_) => true,
        RosterError::Status { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult> {
        let mut attempt = 1;
        loop {
            match self.get_once(url).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.config.max_attempts && is_retryable(&e) => {
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "GET failed, retrying: {}",
                        e
                    );
                    metrics::counter!("roster_fetch_retries_total").increment(1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
