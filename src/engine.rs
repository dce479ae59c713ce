// Probe executor for SQLi Sentinel
// Sends one GET per (parameter, payload) with the payload placed in the query string

use reqwest::header::COOKIE;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::auth::{AuthStrategy, NoAuth};
use crate::error::ScanError;

pub const USER_AGENT: &str = "SQLi Sentinel Security Scanner";
const MAX_REDIRECTS: usize = 10;

/// What came back from a probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Response { status: u16, body: String },
    /// Connection error, timeout or unreadable body
    NetworkFailure { reason: String },
}

/// A sent probe: the exact URL requested and its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub url: String,
    pub outcome: ProbeOutcome,
}

pub struct ProbeOptions<'a> {
    pub follow_redirects: bool,
    /// Also send the payload as a cookie named after the parameter
    pub send_cookie: bool,
    pub auth: &'a dyn AuthStrategy,
}

impl Default for ProbeOptions<'_> {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            send_cookie: false,
            auth: &NoAuth,
        }
    }
}

/// Set `param` to `value` in `base_url`'s query. The first occurrence is
/// replaced in place and later duplicates removed; absent names are appended.
pub fn build_probe_url(base_url: &str, param: &str, value: &str) -> Result<Url, ScanError> {
    let mut url = Url::parse(base_url).map_err(|e| ScanError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (k, v) in url.query_pairs() {
        if k == param {
            if !replaced {
                pairs.push((k.into_owned(), value.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if !replaced {
        pairs.push((param.to_string(), value.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(url)
}

pub struct ProbeEngine {
    following: Client,
    manual: Client,
}

impl ProbeEngine {
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let build = |policy: Policy| {
            Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .redirect(policy)
                .pool_max_idle_per_host(10)
                .build()
        };
        Ok(Self {
            following: build(Policy::limited(MAX_REDIRECTS))?,
            manual: build(Policy::none())?,
        })
    }

    pub async fn probe(
        &self,
        base_url: &str,
        param: &str,
        payload: &str,
        follow_redirects: bool,
    ) -> Result<Probe, ScanError> {
        let options = ProbeOptions {
            follow_redirects,
            ..ProbeOptions::default()
        };
        self.probe_with(base_url, param, payload, &options).await
    }

    pub async fn probe_with(
        &self,
        base_url: &str,
        param: &str,
        payload: &str,
        options: &ProbeOptions<'_>,
    ) -> Result<Probe, ScanError> {
        let url = build_probe_url(base_url, param, payload)?;
        let client = if options.follow_redirects {
            &self.following
        } else {
            &self.manual
        };

        let mut req = options.auth.apply_auth(client.get(url.clone()));
        if options.send_cookie {
            let encoded: String = url::form_urlencoded::byte_serialize(payload.as_bytes()).collect();
            req = req.header(COOKIE, format!("{}={}", param, encoded));
        }

        let outcome = match req.send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                match resp.text().await {
                    Ok(body) => ProbeOutcome::Response { status, body },
                    Err(e) => ProbeOutcome::NetworkFailure {
                        reason: format!("failed to read response body: {}", e),
                    },
                }
            }
            Err(e) => ProbeOutcome::NetworkFailure {
                reason: e.to_string(),
            },
        };

        Ok(Probe {
            url: url.to_string(),
            outcome,
        })
    }
}
