//! Blocking HTTP client for the monitoring server.
//!
//! All calls block — ALWAYS run them in a background thread.
//! Uses `ureq` with a timeout on every request.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const TIMEOUT_SECS: u64 = 15;

/// The three ways a request can fail: the network, the server, or the body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("server returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Handle to the monitoring server. Cheap to clone; clones share the
/// underlying agent and its connection pool.
#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.agent.get(&self.url(path)).call().map_err(into_api_error)?;
        serde_json::from_reader(resp.into_reader()).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a JSON body to `path`. The response body is ignored.
    pub fn post_json<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<()> {
        let payload = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.agent
            .post(&self.url(path))
            .set("content-type", "application/json")
            .send_string(&payload)
            .map_err(into_api_error)?;
        Ok(())
    }

    /// DELETE `path`. The response body is ignored.
    pub fn delete(&self, path: &str) -> ApiResult<()> {
        self.agent
            .delete(&self.url(path))
            .call()
            .map_err(into_api_error)?;
        Ok(())
    }
}

fn into_api_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            ApiError::Status { code, body }
        }
        ureq::Error::Transport(e) => ApiError::Transport(e.to_string()),
    }
}

/// Percent-encode a single path segment or query value.
pub fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = Client::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/tags"), "http://localhost:8080/api/tags");
    }

    #[test]
    fn test_urlencode_passthrough() {
        assert_eq!(urlencode("hana-cluster_01"), "hana-cluster_01");
    }

    #[test]
    fn test_urlencode_spaces_and_reserved() {
        assert_eq!(urlencode("env prod"), "env%20prod");
        assert_eq!(urlencode("a/b&c"), "a%2Fb%26c");
    }
}
