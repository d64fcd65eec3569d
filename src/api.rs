// API client module: a small blocking HTTP client that talks to the
// hosted MarkPre backend. Every command maps onto exactly one of the
// calls below; there are no retries, the status code and server message
// are surfaced to the caller as-is.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default backend, overridable with `MARKPRE_API_URL`.
pub const DEFAULT_API_URL: &str = "https://markpre.onrender.com/api";

/// The hosted free tier cold-starts, so requests can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure of a single API call. `Status` carries the message the server
/// put in its JSON error body, already falling back to `HTTP <code>`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot connect to {0}")]
    Connect(String),
    #[error("request timed out, the server may still be waking up, try again")]
    Timeout,
    #[error("{message}")]
    Status { code: u16, message: String },
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { code: 401, .. })
    }
}

/// One row of the user's presentation list. The backend returns more
/// fields; only the ones the CLI renders are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presentation {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "slideCount", default)]
    pub slide_count: Option<u64>,
    #[serde(rename = "wordCount", default)]
    pub word_count: Option<u64>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

/// Payload for creating a presentation from a markdown file.
#[derive(Debug, Serialize)]
pub struct NewPresentation {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Response envelope shared by all JSON endpoints:
/// `{ status, message, data }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

/// Blocking client holding the base URL and an optional bearer token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from `MARKPRE_API_URL` (or the hosted default),
    /// attaching `token` to every request when present.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let base_url =
            std::env::var("MARKPRE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(ApiClient {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in and return the bearer token the server handed out.
    pub fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint("auth/login");
        debug!(%url, "POST login");
        let resp = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .map_err(|err| self.transport(err))?;
        let resp = check(resp)?;
        let body: Value = resp
            .json()
            .map_err(|err| ApiError::Malformed(err.to_string()))?;
        extract_token(&body)
            .ok_or_else(|| ApiError::Malformed("no token in login response".to_string()))
    }

    /// Fetch all presentations owned by the logged-in user. Entries the
    /// client cannot decode are skipped rather than failing the listing.
    pub fn list_presentations(&self) -> Result<Vec<Presentation>, ApiError> {
        let url = self.endpoint("presentations/get-all-presentations-for-user");
        debug!(%url, "GET presentations");
        let resp = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .map_err(|err| self.transport(err))?;
        let resp = check(resp)?;
        let body: Envelope<Vec<Value>> = resp
            .json()
            .map_err(|err| ApiError::Malformed(err.to_string()))?;
        let mut out = Vec::new();
        for item in body.data.unwrap_or_default() {
            match serde_json::from_value::<Presentation>(item) {
                Ok(p) => out.push(p),
                Err(err) => debug!(%err, "skipping undecodable presentation"),
            }
        }
        Ok(out)
    }

    pub fn create_presentation(&self, req: &NewPresentation) -> Result<Presentation, ApiError> {
        let url = self.endpoint("presentations/create-new-presentation");
        debug!(%url, title = %req.title, "POST presentation");
        let resp = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(req)
            .send()
            .map_err(|err| self.transport(err))?;
        let resp = check(resp)?;
        let body: Envelope<Presentation> = resp
            .json()
            .map_err(|err| ApiError::Malformed(err.to_string()))?;
        body.data
            .ok_or_else(|| ApiError::Malformed("no presentation in response".to_string()))
    }

    pub fn delete_presentation(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("presentations/delete-presentation/{id}"));
        debug!(%url, "DELETE presentation");
        let resp = self
            .client
            .delete(&url)
            .headers(self.headers())
            .send()
            .map_err(|err| self.transport(err))?;
        check(resp).map(|_| ())
    }

    /// Download the rendered export. The body is the file itself, not a
    /// JSON envelope.
    pub fn export_presentation(&self, id: &str, format: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!("presentations/export/{id}?format={format}"));
        debug!(%url, "GET export");
        let resp = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .map_err(|err| self.transport(err))?;
        let resp = check(resp)?;
        let bytes = resp
            .bytes()
            .map_err(|err| ApiError::Malformed(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Probe the health endpoint, which lives on the server root rather
    /// than under `/api`. Returns the raw status code.
    pub fn health(&self) -> Result<u16, ApiError> {
        let url = health_url(&self.base_url);
        debug!(%url, "GET health");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|err| self.transport(err))?;
        Ok(resp.status().as_u16())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Content-type plus the Authorization header when a token is set.
    /// A token that cannot be encoded as a header value is dropped; the
    /// server then answers with the 401 the user can act on.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn transport(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connect(self.base_url.clone())
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Turn a non-success response into `ApiError::Status`, pulling the
/// human-readable `message` out of the JSON error body when there is one.
fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let code = status.as_u16();
    let body = resp.text().unwrap_or_default();
    Err(ApiError::Status {
        code,
        message: error_message(code, &body),
    })
}

fn error_message(code: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {code}"))
}

/// Layered token extraction from the login response. Older deployments
/// returned the token at the top level, current ones nest it under
/// `data`, so try `data.token`, then `token`, then `accessToken`.
pub fn extract_token(body: &Value) -> Option<String> {
    [
        body.pointer("/data/token"),
        body.get("token"),
        body.get("accessToken"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|t| !t.is_empty())
    .map(str::to_string)
}

/// Derive the health probe URL from the API base by stripping a trailing
/// `/api` segment.
pub fn health_url(base: &str) -> String {
    let root = base.trim_end_matches('/');
    let root = root.strip_suffix("/api").unwrap_or(root);
    format!("{root}/health")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_prefers_nested_data() {
        let body = json!({ "data": { "token": "nested" }, "token": "flat" });
        assert_eq!(extract_token(&body).as_deref(), Some("nested"));
    }

    #[test]
    fn token_falls_back_to_top_level() {
        let body = json!({ "token": "flat" });
        assert_eq!(extract_token(&body).as_deref(), Some("flat"));
        let body = json!({ "accessToken": "legacy" });
        assert_eq!(extract_token(&body).as_deref(), Some("legacy"));
    }

    #[test]
    fn blank_tokens_are_skipped() {
        let body = json!({ "data": { "token": "  " }, "accessToken": "real" });
        assert_eq!(extract_token(&body).as_deref(), Some("real"));
        assert_eq!(extract_token(&json!({})), None);
    }

    #[test]
    fn health_url_strips_api_suffix() {
        assert_eq!(
            health_url("https://markpre.onrender.com/api"),
            "https://markpre.onrender.com/health"
        );
        assert_eq!(
            health_url("https://markpre.onrender.com/api/"),
            "https://markpre.onrender.com/health"
        );
        assert_eq!(
            health_url("http://localhost:5000"),
            "http://localhost:5000/health"
        );
    }

    #[test]
    fn error_message_reads_json_body() {
        assert_eq!(
            error_message(404, r#"{"message": "Presentation not found"}"#),
            "Presentation not found"
        );
        assert_eq!(error_message(502, "<html>bad gateway</html>"), "HTTP 502");
        assert_eq!(error_message(500, r#"{"message": ""}"#), "HTTP 500");
    }

    #[test]
    fn presentation_decodes_backend_shape() {
        let row = json!({
            "_id": "66f1c0ffee11223344556677",
            "title": "Quarterly review",
            "slideCount": 12,
            "wordCount": 840,
            "updatedAt": "2024-06-01T10:30:00.000Z",
            "viewCount": 3
        });
        let p: Presentation = serde_json::from_value(row).unwrap();
        assert_eq!(p.id, "66f1c0ffee11223344556677");
        assert_eq!(p.slide_count, Some(12));
        assert_eq!(p.updated_at.as_deref(), Some("2024-06-01T10:30:00.000Z"));
    }
}
