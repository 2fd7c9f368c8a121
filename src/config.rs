//! Client configuration: retry policies, defaults seeded from the
//! environment, and deep-merged overrides.
//!
//! Process defaults are read from the environment once, then merged with
//! whatever the caller passes to [`crate::session::LiveSession::start`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LiveError;

/// A single close-code / status-code matching rule: an exact value or an
/// inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRule {
    Exact(u32),
    Range(u32, u32),
}

impl CodeRule {
    pub fn matches(&self, code: u32) -> bool {
        match self {
            CodeRule::Exact(c) => *c == code,
            CodeRule::Range(lo, hi) => (*lo..=*hi).contains(&code),
        }
    }
}

pub fn matches_any(code: u32, rules: &[CodeRule]) -> bool {
    rules.iter().any(|r| r.matches(code))
}

/// A delay function: given a 1-based attempt number, how long to wait
/// before the next attempt.
pub type DelayFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

fn exp_backoff(base_secs: f64, cap_secs: f64) -> DelayFn {
    Arc::new(move |attempt: u32| {
        let secs = (base_secs * 2f64.powi(attempt as i32 - 1)).min(cap_secs);
        Duration::from_secs_f64(secs.max(0.0))
    })
}

/// HTTP retry configuration: `max_attempts` (0 = unlimited), the set of
/// retryable status codes, and the backoff function.
#[derive(Clone)]
pub struct HttpRetryOptions {
    pub max_attempts: u32,
    pub status_codes: Vec<CodeRule>,
    pub delay: DelayFn,
}

impl Default for HttpRetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            status_codes: vec![
                CodeRule::Exact(408),
                CodeRule::Exact(413),
                CodeRule::Exact(429),
                CodeRule::Range(500, 599),
            ],
            delay: exp_backoff(0.3, 10.0),
        }
    }
}

/// WebSocket retry configuration, matching spec §6 "ws_retry".
#[derive(Clone)]
pub struct WsRetryOptions {
    pub max_attempts_per_connection: u32,
    pub max_connections: u32,
    pub close_codes: Vec<CodeRule>,
    pub delay: DelayFn,
}

impl Default for WsRetryOptions {
    fn default() -> Self {
        Self {
            max_attempts_per_connection: 5,
            max_connections: 0,
            close_codes: vec![CodeRule::Range(1002, 4399), CodeRule::Range(4500, 9999)],
            delay: exp_backoff(0.3, 2.0),
        }
    }
}

/// Caller-supplied overrides. Every field is optional; unset fields fall
/// back to [`ClientOptions::defaults`].
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub region: Option<String>,
    pub http_headers: Option<HashMap<String, String>>,
    pub http_retry: Option<HttpRetryOptions>,
    pub http_timeout: Option<f64>,
    pub ws_retry: Option<WsRetryOptions>,
    pub ws_timeout: Option<f64>,
}

impl ClientOptions {
    /// Process-wide defaults, seeded from the environment once per call
    /// (cheap enough not to bother caching; callers construct a client
    /// rarely compared to how often they stream audio).
    pub fn defaults() -> Self {
        Self {
            api_key: std::env::var("GLADIA_API_KEY").ok().filter(|s| !s.is_empty()),
            api_url: Some(
                std::env::var("GLADIA_API_URL")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "https://api.gladia.io".to_string()),
            ),
            region: std::env::var("GLADIA_REGION").ok().filter(|s| !s.is_empty()),
            http_headers: Some(HashMap::from([(
                "X-GLADIA-ORIGIN".to_string(),
                "sdk/rust".to_string(),
            )])),
            http_retry: Some(HttpRetryOptions::default()),
            http_timeout: Some(10.0),
            ws_retry: Some(WsRetryOptions::default()),
            ws_timeout: Some(10.0),
        }
    }

    /// Deep-merge `self` on top of `base`: any field `self` sets wins,
    /// anything left `None` falls through to `base`. Mirrors
    /// `deep_merge_dicts` for the `http_headers` map specifically (merged
    /// key-by-key rather than replaced wholesale).
    pub fn merge_over(self, base: ClientOptions) -> ClientOptions {
        let http_headers = match (base.http_headers, self.http_headers) {
            (Some(mut b), Some(o)) => {
                b.extend(o);
                Some(b)
            }
            (b, o) => o.or(b),
        };

        ClientOptions {
            api_key: self.api_key.or(base.api_key),
            api_url: self.api_url.or(base.api_url),
            region: self.region.or(base.region),
            http_headers,
            http_retry: self.http_retry.or(base.http_retry),
            http_timeout: self.http_timeout.or(base.http_timeout),
            ws_retry: self.ws_retry.or(base.ws_retry),
            ws_timeout: self.ws_timeout.or(base.ws_timeout),
        }
    }
}

/// Fully-resolved options: every field is required, and the API key header
/// has already been folded into `http_headers` when applicable.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub api_key: Option<String>,
    pub api_url: String,
    #[allow(dead_code)]
    pub region: Option<String>,
    pub http_headers: HashMap<String, String>,
    pub http_retry: HttpRetryOptions,
    pub http_timeout: f64,
    pub ws_retry: WsRetryOptions,
    pub ws_timeout: f64,
}

/// Resolve caller overrides against process defaults, validate the result,
/// and inject `X-GLADIA-KEY` when the host is the managed one.
///
/// The API key header is only injected for `*.gladia.io` hosts, so a caller
/// pointing at a local proxy never gets it. Load-bearing for local testing
/// against a stand-in server.
pub fn resolve(overrides: ClientOptions) -> Result<ResolvedOptions, LiveError> {
    let merged = overrides.merge_over(ClientOptions::defaults());

    let api_url = merged
        .api_url
        .unwrap_or_else(|| "https://api.gladia.io".to_string());

    let parsed = url::Url::parse(&api_url)
        .map_err(|e| LiveError::Configuration(format!("invalid url \"{}\": {}", api_url, e)))?;

    let is_managed_host = parsed
        .host_str()
        .map(|h| h.ends_with(".gladia.io"))
        .unwrap_or(false);

    if merged.api_key.is_none() && is_managed_host {
        return Err(LiveError::Configuration(
            "you have to set your \"api_key\" or define a proxy \"api_url\"".to_string(),
        ));
    }

    match parsed.scheme() {
        "http" | "https" | "ws" | "wss" => {}
        other => {
            return Err(LiveError::Configuration(format!(
                "only HTTP and WebSocket protocols are supported for api_url (received: {})",
                other
            )))
        }
    }

    let mut http_headers = merged.http_headers.unwrap_or_default();
    if is_managed_host {
        if let Some(key) = &merged.api_key {
            http_headers.insert("X-GLADIA-KEY".to_string(), key.clone());
        }
    }

    Ok(ResolvedOptions {
        api_key: merged.api_key,
        api_url,
        region: merged.region,
        http_headers,
        http_retry: merged.http_retry.unwrap_or_default(),
        http_timeout: merged.http_timeout.unwrap_or(10.0),
        ws_retry: merged.ws_retry.unwrap_or_default(),
        ws_timeout: merged.ws_timeout.unwrap_or(10.0),
    })
}
