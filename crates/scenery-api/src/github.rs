//! GitHub account lookup.
//!
//! Calls `GET /user` on the GitHub REST API with the configured token and
//! returns the JSON body unchanged. Upstream failures keep their status
//! and carry GitHub's `message` field.

use axum::http::StatusCode;

use crate::error::ApiError;

/// Public GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("scenery/", env!("CARGO_PKG_VERSION"));

/// Client for the authenticated-user endpoint.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client. A `None` or blank token disables the lookup.
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: GITHUB_API_URL.to_owned(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Point the client at a different API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Whether a token is configured.
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch the account the token belongs to.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Upstream`] with 401 if no token is configured.
    /// - [`ApiError::Upstream`] with GitHub's status and message if the API
    ///   rejects the request.
    /// - [`ApiError::Upstream`] with 502 if GitHub cannot be reached or a
    ///   successful response is not JSON.
    pub async fn account_info(&self) -> Result<serde_json::Value, ApiError> {
        let Some(token) = self.token.as_deref() else {
            return Err(ApiError::Upstream {
                status: StatusCode::UNAUTHORIZED,
                message: String::from("GITHUB_TOKEN is not configured"),
            });
        };

        let url = format!("{}/user", self.api_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| bad_gateway(format!("GitHub request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "GitHub rejected account lookup");
            // Error bodies are not always JSON (proxies answer with HTML).
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            return Err(ApiError::Upstream {
                status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                message: upstream_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| bad_gateway(format!("GitHub response parse failed: {e}")))
    }
}

fn bad_gateway(message: String) -> ApiError {
    ApiError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        message,
    }
}

/// GitHub's `message` field, or a generic fallback.
fn upstream_message(body: &serde_json::Value) -> String {
    body.get("message")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| String::from("GitHub API request failed"), ToOwned::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_missing() {
        assert!(!GithubClient::new(Some(String::from("  "))).has_token());
        assert!(!GithubClient::new(None).has_token());
        assert!(GithubClient::new(Some(String::from("ghp_x"))).has_token());
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_without_a_request() {
        let client = GithubClient::new(None).with_api_url("http://127.0.0.1:1");
        let err = client.account_info().await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unreachable_api_is_bad_gateway() {
        let client =
            GithubClient::new(Some(String::from("ghp_x"))).with_api_url("http://127.0.0.1:1");
        let err = client.account_info().await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn canned_upstream(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn html_error_keeps_upstream_status() {
        let url = canned_upstream(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Type: text/html\r\n\
             Content-Length: 17\r\n\
             Connection: close\r\n\r\n\
             <html>down</html>",
        )
        .await;
        let client = GithubClient::new(Some(String::from("ghp_x"))).with_api_url(url);

        let err = client.account_info().await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.client_message(), "GitHub API request failed");
    }

    #[tokio::test]
    async fn json_error_carries_github_message() {
        let url = canned_upstream(
            "HTTP/1.1 401 Unauthorized\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 29\r\n\
             Connection: close\r\n\r\n\
             {\"message\":\"Bad credentials\"}",
        )
        .await;
        let client = GithubClient::new(Some(String::from("ghp_x"))).with_api_url(url);

        let err = client.account_info().await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.client_message(), "Bad credentials");
    }

    #[test]
    fn upstream_message_prefers_github_text() {
        let body = serde_json::json!({ "message": "Bad credentials" });
        assert_eq!(upstream_message(&body), "Bad credentials");
        assert_eq!(
            upstream_message(&serde_json::json!({})),
            "GitHub API request failed"
        );
    }
}
