//! HTTP client for the auth service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::error::CliError;

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Expiry assumed when the server omits `expiresIn`.
const DEFAULT_CODE_EXPIRY_SECS: u64 = 300;

/// Server-side record correlating one CLI login attempt with its token.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationSession {
    /// Session ID.
    pub verification_session_id: String,
    /// Secret proving this CLI started the session.
    pub poll_secret: String,
    /// Page the user opens to confirm the login.
    pub verification_url: String,
}

impl std::fmt::Debug for VerificationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationSession")
            .field("verification_session_id", &self.verification_session_id)
            .field("poll_secret", &"<redacted>")
            .field("verification_url", &self.verification_url)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionBody {
    verification_session_id: Option<String>,
    poll_secret: Option<String>,
    verification_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PollSessionBody<'a> {
    verification_session_id: &'a str,
    poll_secret: &'a str,
}

#[derive(Deserialize)]
struct PollSessionResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EmailRequestBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EmailVerifyBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct CreateTokenBody {
    token: CreatedToken,
}

#[derive(Deserialize)]
struct CreatedToken {
    token: String,
}

/// Result of requesting an email one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailCodeRequest {
    /// Seconds until the code expires.
    pub expires_in_secs: u64,
}

/// Tokens issued after a successful email verification.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailSession {
    /// Short-lived access token.
    pub access_token: String,
}

impl std::fmt::Debug for EmailSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSession").finish_non_exhaustive()
    }
}

/// Auth service client.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Client for the auth service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the HTTP client cannot
    /// be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CliError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CliError::Config(format!(
                "invalid auth service URL: {base_url}, must start with http:// or https://"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .user_agent(concat!("af-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Base URL of the auth service.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start a CLI login session.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Auth`] if the service is unreachable, refuses the
    /// request or answers without a complete session.
    pub async fn start_cli_session(&self, name: &str) -> Result<VerificationSession, CliError> {
        let refused =
            |reason: String| CliError::Auth(format!("could not start a login session: {reason}"));

        let response = self
            .http
            .post(self.url("/auth/cli/start"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| refused(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(refused(format!("server responded with {status}")));
        }

        let body: StartSessionBody = response
            .json()
            .await
            .map_err(|e| refused(format!("unreadable response: {e}")))?;

        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        match (
            non_empty(body.verification_session_id),
            non_empty(body.poll_secret),
            non_empty(body.verification_url),
        ) {
            (Some(verification_session_id), Some(poll_secret), Some(verification_url)) => {
                debug!(session = %verification_session_id, "CLI login session started");
                Ok(VerificationSession {
                    verification_session_id,
                    poll_secret,
                    verification_url,
                })
            }
            _ => Err(refused("incomplete session in response".into())),
        }
    }

    /// Ask whether the session has produced a token yet.
    ///
    /// Pending (202), any other non-success status, transport failures and
    /// unreadable bodies all read as "not yet".
    pub async fn poll_cli_session(&self, session: &VerificationSession) -> Option<String> {
        let response = self
            .http
            .post(self.url("/auth/cli/poll"))
            .json(&PollSessionBody {
                verification_session_id: &session.verification_session_id,
                poll_secret: &session.poll_secret,
            })
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "session poll failed, retrying");
                return None;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::ACCEPTED || !status.is_success() {
            trace!(%status, "session pending");
            return None;
        }

        match response.json::<PollSessionResponse>().await {
            Ok(body) => body.token.filter(|t| !t.is_empty()),
            Err(e) => {
                debug!(error = %e, "unreadable poll response, retrying");
                None
            }
        }
    }

    /// Send a one-time login code to `email`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Http`] on transport failure and [`CliError::Auth`]
    /// if the service refuses.
    pub async fn request_email_code(&self, email: &str) -> Result<EmailCodeRequest, CliError> {
        let response = self
            .http
            .post(self.url("/auth/email/request"))
            .json(&json!({ "email": email }))
            .send()
            .await?;

        let ok = response.status().is_success();
        let body: EmailRequestBody = response.json().await.unwrap_or_default();

        if !ok || !body.success {
            return Err(CliError::Auth(
                body.error
                    .unwrap_or_else(|| "failed to send verification code".into()),
            ));
        }

        Ok(EmailCodeRequest {
            expires_in_secs: body.expires_in.unwrap_or(DEFAULT_CODE_EXPIRY_SECS),
        })
    }

    /// Exchange an emailed code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Http`] on transport failure and [`CliError::Auth`]
    /// if the code is rejected.
    pub async fn verify_email_code(&self, email: &str, code: &str) -> Result<EmailSession, CliError> {
        let response = self
            .http
            .post(self.url("/auth/email/verify"))
            .json(&json!({ "email": email, "code": code }))
            .send()
            .await?;

        let ok = response.status().is_success();
        let body: EmailVerifyBody = response.json().await.unwrap_or_default();

        if let Some(error) = body.error {
            return Err(CliError::Auth(error));
        }

        match body.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) if ok => Ok(EmailSession { access_token }),
            _ => Err(CliError::Auth("verification failed".into())),
        }
    }

    /// Create a personal access token using a short-lived access token.
    ///
    /// Returns `Ok(None)` when the endpoint answers with a non-success status
    /// (older deployments do not have it).
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Http`] on transport failure and [`CliError::Auth`]
    /// if a success response has no token.
    pub async fn create_personal_access_token(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Option<String>, CliError> {
        let response = self
            .http
            .post(self.url("/tokens"))
            .bearer_auth(access_token)
            .json(&json!({ "name": name }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "token endpoint unavailable");
            return Ok(None);
        }

        let body: CreateTokenBody = response
            .json()
            .await
            .map_err(|e| CliError::Auth(format!("unexpected token response: {e}")))?;
        Ok(Some(body.token.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn session() -> VerificationSession {
        VerificationSession {
            verification_session_id: "sess".into(),
            poll_secret: "secret".into(),
            verification_url: "https://app.example/login/sess".into(),
        }
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = AuthClient::new("ftp://auth").expect_err("invalid");
        assert!(err.to_string().contains("invalid auth service URL"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = AuthClient::new("https://auth.example/").expect("client");
        assert_eq!(client.base_url(), "https://auth.example");
    }

    #[tokio::test]
    async fn start_session_decodes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/cli/start")
                    .json_body(json!({ "name": "CLI Login" }));
                then.status(200).json_body(json!({
                    "verificationSessionId": "sess",
                    "pollSecret": "secret",
                    "verificationUrl": "https://app.example/login/sess"
                }));
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        let started = client.start_cli_session("CLI Login").await.expect("session");
        assert_eq!(started, session());
    }

    #[tokio::test]
    async fn start_session_incomplete_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/cli/start");
                then.status(200)
                    .json_body(json!({ "verificationSessionId": "sess", "pollSecret": "" }));
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        let err = client.start_cli_session("CLI Login").await.expect_err("incomplete");
        assert!(matches!(err, CliError::Auth(_)));
    }

    #[tokio::test]
    async fn poll_pending_reads_as_none() {
        let server = MockServer::start_async().await;
        let pending = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/cli/poll");
                then.status(202).json_body(json!({ "success": false }));
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        assert_eq!(client.poll_cli_session(&session()).await, None);
        pending.assert_async().await;
    }

    #[tokio::test]
    async fn poll_server_error_reads_as_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/cli/poll");
                then.status(500).body("oops");
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        assert_eq!(client.poll_cli_session(&session()).await, None);
    }

    #[tokio::test]
    async fn poll_returns_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/cli/poll")
                    .json_body(json!({ "verificationSessionId": "sess", "pollSecret": "secret" }));
                then.status(200).json_body(json!({ "success": true, "token": "pat_1" }));
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        assert_eq!(client.poll_cli_session(&session()).await.as_deref(), Some("pat_1"));
    }

    #[tokio::test]
    async fn poll_unreachable_reads_as_none() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let client = AuthClient::new("http://127.0.0.1:9").expect("client");
        assert_eq!(client.poll_cli_session(&session()).await, None);
    }

    #[tokio::test]
    async fn token_endpoint_missing_is_not_an_error() {
        let server = MockServer::start_async().await;
        let tokens = server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens").header("authorization", "Bearer AT");
                then.status(404);
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        let created = client
            .create_personal_access_token("AT", "CLI Token - 2026-01-01")
            .await
            .expect("fallback");
        assert_eq!(created, None);
        tokens.assert_async().await;
    }

    #[tokio::test]
    async fn email_request_failure_uses_server_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/email/request");
                then.status(429)
                    .json_body(json!({ "success": false, "error": "Too many requests" }));
            })
            .await;

        let client = AuthClient::new(server.base_url()).expect("client");
        let err = client.request_email_code("user@example.com").await.expect_err("refused");
        assert_eq!(err.to_string(), "authentication failed: Too many requests");
    }
}
