use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::error::ApiError;

/// Default endpoint for API methods.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// HTTP response from an API call: status code plus raw body text.
///
/// The body is handed back untouched; interpreting it is the caller's
/// business (the session manager decodes handshake replies, everything else
/// is passthrough).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin client for the service's HTTP API.
///
/// Every call POSTs form-encoded parameters (plus the credential) to
/// `{base}/{method}`. The base URL is configurable so tests can point it at
/// a local server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    user_agent: String,
}

impl ApiClient {
    /// Build a client. `proxy` is an HTTP proxy URL applied to every
    /// request when given.
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        proxy: Option<&str>,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let http = builder.build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            token: token.into(),
            base_url,
            user_agent: default_user_agent(),
        })
    }

    /// Append a `name/version` segment to the User-Agent header sent with
    /// every request. Spaces and slashes in the inputs are replaced so the
    /// header stays a valid product-token list.
    pub fn append_user_agent(&mut self, name: &str, version: &str) {
        let name = name.replace(['/', ' '], "-");
        let version = version.replace(['/', ' '], "-");
        self.user_agent.push(' ');
        self.user_agent.push_str(&name);
        self.user_agent.push('/');
        self.user_agent.push_str(&version);
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one API call, honoring an optional per-call deadline, and
    /// return the raw response.
    pub async fn invoke(
        &self,
        method: &str,
        params: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/{}", self.base_url, method);
        let mut form: HashMap<&str, &str> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        form.insert("token", &self.token);

        let mut request = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&form);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(method, status, "api call completed");
        Ok(ApiResponse { status, body })
    }
}

fn default_user_agent() -> String {
    format!(
        "rtm-client/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Form, Router, http::HeaderMap, routing::post};

    /// Spawn a minimal API server that echoes the received form and headers
    /// as JSON. Returns its base URL and a shutdown handle.
    async fn spawn_echo_api() -> (String, tokio::sync::oneshot::Sender<()>) {
        async fn echo(
            headers: HeaderMap,
            Form(form): Form<HashMap<String, String>>,
        ) -> axum::Json<serde_json::Value> {
            let ua = headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            axum::Json(serde_json::json!({ "form": form, "user_agent": ua }))
        }

        let app = Router::new().route("/{method}", post(echo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });
        (base, tx)
    }

    #[tokio::test]
    async fn invoke_posts_form_with_token() {
        let (base, _shutdown) = spawn_echo_api().await;
        let api = ApiClient::new("xoxb-secret", &base, None).unwrap();

        let mut params = HashMap::new();
        params.insert("channel".to_string(), "C1".to_string());
        let reply = api.invoke("chat.postMessage", &params, None).await.unwrap();

        assert!(reply.is_success());
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(body["form"]["token"], "xoxb-secret");
        assert_eq!(body["form"]["channel"], "C1");
    }

    #[tokio::test]
    async fn appended_user_agent_segments_reach_the_wire() {
        let (base, _shutdown) = spawn_echo_api().await;
        let mut api = ApiClient::new("t", &base, None).unwrap();
        api.append_user_agent("my bot", "1.0/beta");

        let reply = api.invoke("auth.test", &HashMap::new(), None).await.unwrap();
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        let ua = body["user_agent"].as_str().unwrap();
        assert!(ua.starts_with("rtm-client/"), "got: {ua}");
        // Spaces and slashes in custom segments are normalized.
        assert!(ua.ends_with("my-bot/1.0-beta"), "got: {ua}");
    }

    #[tokio::test]
    async fn connect_failure_is_classified() {
        // Port 1 is reserved and nothing listens on it.
        let api = ApiClient::new("t", "http://127.0.0.1:1", None).unwrap();
        let err = api.invoke("auth.test", &HashMap::new(), None).await.unwrap_err();
        assert!(err.is_connect(), "expected a connect error, got: {err}");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = ApiClient::new("t", "http://example.com/api/", None).unwrap();
        assert_eq!(api.base_url(), "http://example.com/api");
    }
}
