//! HTTP client for the CareMind backend.
//!
//! The client owns the bearer token explicitly: there is no ambient auth
//! state, and every authenticated call attaches `Authorization: Bearer` from
//! the token it was constructed (or later updated) with. Token absence is not
//! an error; the login endpoint is unauthenticated.

use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, StatusCode, header};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, CLIENT_UNAUTHORIZED,
};
use crate::types::LoginOutcome;

/// Base URL used when neither the caller nor the environment provides one.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";

/// Default timeout for login and the ack-style endpoints.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for requesting the opening greeting.
const START_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a full chat turn. Generation is slower than the greeting, so
/// turns get a larger budget.
const TURN_TIMEOUT: Duration = Duration::from_secs(45);

/// Operations the chat session controller needs from the backend.
///
/// The HTTP client implements this; tests substitute a scripted mock.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Request the opening assistant greeting for a fresh session.
    async fn start_session(&self) -> Result<String>;

    /// Send one user turn and return the assistant's reply text.
    async fn send_turn(&self, text: &str) -> Result<String>;

    /// Ask the backend to discard its server-side conversation state.
    async fn reset_session(&self) -> Result<()>;

    /// Tell the backend a new login occurred so it resets per-user state.
    async fn notify_login(&self) -> Result<()>;

    /// Tell the backend the user logged out.
    async fn logout(&self) -> Result<()>;

    /// Drop any credential held in memory. Subsequent calls go out
    /// unauthenticated until a new token is installed.
    fn clear_auth(&mut self);
}

/// Client for the CareMind backend.
#[derive(Debug, Clone)]
pub struct CareMind {
    client: ReqwestClient,
    base_url: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<String>,
}

impl CareMind {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the
    /// CAREMIND_API_URL environment variable; otherwise a local development
    /// backend is assumed.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var("CAREMIND_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url(&base_url)?;

        let client = ReqwestClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Create a new client that authenticates with the given token.
    pub fn with_token(base_url: Option<String>, token: Option<String>) -> Result<Self> {
        let mut client = Self::new(base_url)?;
        client.token = token;
        Ok(client)
    }

    /// Replace the bearer token, or clear it with `None`.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Returns the current bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::http_client("bearer token is not a valid header", None))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Classify a transport-level reqwest error.
    fn classify_transport(e: reqwest::Error, timeout: Duration) -> Error {
        if e.is_timeout() {
            Error::unavailable(
                format!("request timed out after {}s", timeout.as_secs()),
                Some(Box::new(e)),
            )
        } else if e.is_connect() {
            Error::unavailable(format!("connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Map a non-2xx response to our error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_detail(&body).unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.clone()
            }
        });

        if status == StatusCode::UNAUTHORIZED {
            CLIENT_UNAUTHORIZED.click();
            return Error::unauthorized(message);
        }
        if status.is_server_error() {
            return Error::unavailable(message, None);
        }
        Error::api(status.as_u16(), message)
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::classify_transport(e, timeout));
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// The login endpoint is unauthenticated and form-encoded. Any non-2xx
    /// status is treated as a credential failure; form-level messaging is the
    /// caller's concern.
    pub async fn login(&self, email: &str, secret: &str) -> Result<LoginOutcome> {
        let url = self.endpoint("login")?;
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .timeout(DEFAULT_TIMEOUT)
            .form(&[("username", email), ("password", secret)])
            .send()
            .await
            .map_err(|e| Self::classify_transport(e, DEFAULT_TIMEOUT));
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_detail(&body).unwrap_or_else(|| "invalid credentials".to_string());
            return Err(Error::authentication(message));
        }

        let parsed: LoginResponse = response.json().await.map_err(|e| {
            Error::serialization(format!("failed to parse login response: {}", e), Some(Box::new(e)))
        })?;
        let token = parsed
            .access_token
            .ok_or_else(|| Error::invalid_response("login response lacked access_token"))?;
        Ok(LoginOutcome {
            token,
            display_name: parsed.name,
        })
    }

    async fn chat(&self, body: serde_json::Value, timeout: Duration) -> Result<String> {
        let response = self.post_json("chat", &body, timeout).await?;
        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Error::serialization(format!("failed to parse chat response: {}", e), Some(Box::new(e)))
        })?;
        parsed
            .message
            .ok_or_else(|| Error::invalid_response("chat response lacked a message field"))
    }
}

#[async_trait::async_trait]
impl Backend for CareMind {
    async fn start_session(&self) -> Result<String> {
        // An empty body asks the backend for its opening greeting.
        self.chat(serde_json::json!({}), START_TIMEOUT).await
    }

    async fn send_turn(&self, text: &str) -> Result<String> {
        self.chat(serde_json::json!({ "message": text }), TURN_TIMEOUT)
            .await
    }

    async fn reset_session(&self) -> Result<()> {
        self.post_json("reset-chat", &serde_json::json!({}), DEFAULT_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn notify_login(&self) -> Result<()> {
        self.post_json("reset-on-login", &serde_json::json!({}), DEFAULT_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.post_json("logout", &serde_json::json!({}), DEFAULT_TIMEOUT)
            .await?;
        Ok(())
    }

    fn clear_auth(&mut self) {
        self.token = None;
    }
}

fn parse_base_url(s: &str) -> Result<Url> {
    // A trailing slash keeps Url::join from eating the last path segment.
    let normalized = if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{}/", s)
    };
    Ok(Url::parse(&normalized)?)
}

/// Pull a human-readable message out of an error body, if it has one.
///
/// The backend reports errors as `{"detail": "..."}`.
fn extract_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| e.detail)
}
