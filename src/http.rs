//! One-shot `POST` helper with status-code-keyed retry. Retries only when
//! the response status matches the configured rule set, backing off
//! per attempt.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::{matches_any, HttpRetryOptions};
use crate::error::LiveError;

/// Issue a `POST` to `url` with JSON body `payload`, retrying on the
/// status codes `retry` names. Non-retryable or exhausted-retry failures
/// become [`LiveError::Http`]; a request that never completes in
/// `timeout_secs` becomes [`LiveError::Timeout`].
pub async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    headers: &HashMap<String, String>,
    payload: &T,
    retry: &HttpRetryOptions,
    timeout_secs: f64,
) -> Result<reqwest::Response, LiveError> {
    let mut attempt: u32 = 1;

    loop {
        let mut request = client.post(url).json(payload);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let send = tokio::time::timeout(
            Duration::from_secs_f64(timeout_secs),
            request.send(),
        )
        .await;

        let response = match send {
            Err(_) => {
                return Err(LiveError::Timeout {
                    context: format!("POST {}", url),
                    timeout_secs,
                })
            }
            Ok(Err(e)) => {
                return Err(LiveError::Transport(format!(
                    "POST {} failed: {}",
                    url, e
                )))
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retryable = matches_any(status.as_u16() as u32, &retry.status_codes);
        let exhausted = retry.max_attempts != 0 && attempt >= retry.max_attempts;

        if !retryable || exhausted {
            let request_id = response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                .collect();
            let body = response.text().await.ok();
            log::warn!(
                "POST {} returned {} (attempt {}, retryable={})",
                url,
                status,
                attempt,
                retryable
            );
            return Err(LiveError::Http {
                method: "POST".to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
                headers,
                request_id,
            });
        }

        log::warn!(
            "POST {} returned {}, retrying (attempt {})",
            url,
            status,
            attempt
        );
        tokio::time::sleep((retry.delay)(attempt)).await;
        attempt += 1;
    }
}
