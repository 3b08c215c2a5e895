//! Client for OpenAI-compatible Chat Completions endpoints.
//!
//! Any server that accepts `POST {base}/chat/completions` with
//! `{ "model", "messages": [{ "role", "content" }] }` works here, which
//! covers OpenAI itself as well as most self-hosted gateways.

use {
    async_trait::async_trait,
    relay_config::Turn,
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
    tracing::{debug, trace, warn},
};

use crate::CompletionProvider;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> From<&'a Turn> for RequestMessage<'a> {
    fn from(turn: &'a Turn) -> Self {
        Self {
            role: turn.role.as_str(),
            content: &turn.content,
        }
    }
}

pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<Secret<String>>,
    provider_name: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<Secret<String>>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("relay-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
            provider_name: "openai".into(),
            client,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, model: &str, messages: &[Turn]) -> anyhow::Result<String> {
        let body = ChatCompletionRequest {
            model,
            messages: messages.iter().map(RequestMessage::from).collect(),
        };

        debug!(
            model,
            provider = %self.provider_name,
            messages_count = messages.len(),
            "chat completion request"
        );
        trace!(body = %serde_json::to_string(&body).unwrap_or_default(), "chat completion request body");

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        let http_resp = request.send().await?;

        let status = http_resp.status();
        if !status.is_success() {
            let body_text = http_resp.text().await.unwrap_or_default();
            warn!(
                status = %status,
                model,
                provider = %self.provider_name,
                body = %body_text,
                "chat completion API error"
            );
            anyhow::bail!("API error HTTP {status}: {body_text}");
        }

        let resp = http_resp.json::<serde_json::Value>().await?;
        trace!(response = %resp, "chat completion raw response");

        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("response contained no message content"))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use {
        axum::{Router, extract::Request, http::StatusCode, routing::post},
        relay_config::Role,
    };

    use super::*;

    #[derive(Default, Clone)]
    struct Captured {
        body: Option<serde_json::Value>,
        authorization: Option<String>,
    }

    /// Start a mock completion endpoint that records requests and answers
    /// with `status` and `payload`.
    async fn start_mock(
        status: StatusCode,
        payload: &'static str,
    ) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured: Arc<Mutex<Vec<Captured>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |req: Request| {
                let cap = captured_clone.clone();
                async move {
                    let authorization = req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    let body_bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
                        .await
                        .unwrap_or_default();
                    let body = serde_json::from_slice(&body_bytes).ok();
                    cap.lock().unwrap().push(Captured {
                        body,
                        authorization,
                    });
                    (status, [("content-type", "application/json")], payload)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1"), captured)
    }

    fn conversation() -> Vec<Turn> {
        vec![Turn::system("be brief"), Turn::user("hello")]
    }

    #[tokio::test]
    async fn sends_model_and_full_log() {
        let (base, captured) = start_mock(
            StatusCode::OK,
            r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#,
        )
        .await;
        let provider =
            OpenAiCompatProvider::new(format!("{base}/"), Some(Secret::new("k3y".into())))
                .unwrap();

        let reply = provider.complete("gpt-4o-mini", &conversation()).await.unwrap();
        assert_eq!(reply, "hi");

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let body = captured[0].body.clone().unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(
            body["messages"],
            serde_json::json!([
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "hello" },
            ])
        );
        assert_eq!(captured[0].authorization.as_deref(), Some("Bearer k3y"));
    }

    #[tokio::test]
    async fn omits_authorization_without_key() {
        let (base, captured) = start_mock(
            StatusCode::OK,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        )
        .await;
        let provider = OpenAiCompatProvider::new(base, None).unwrap();
        provider.complete("m", &conversation()).await.unwrap();
        assert!(captured.lock().unwrap()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn passes_unknown_roles_through() {
        let (base, captured) = start_mock(
            StatusCode::OK,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        )
        .await;
        let provider = OpenAiCompatProvider::new(base, None).unwrap();
        let log = vec![Turn::new(Role::Other("developer".into()), "x")];
        provider.complete("m", &log).await.unwrap();
        let body = captured.lock().unwrap()[0].body.clone().unwrap();
        assert_eq!(body["messages"][0]["role"], "developer");
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let (base, _) = start_mock(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"slow down"}"#).await;
        let provider = OpenAiCompatProvider::new(base, None).unwrap();
        let err = provider.complete("m", &conversation()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"), "{message}");
        assert!(message.contains("slow down"), "{message}");
    }

    #[tokio::test]
    async fn missing_content_is_an_error() {
        let (base, _) = start_mock(StatusCode::OK, r#"{"choices":[]}"#).await;
        let provider = OpenAiCompatProvider::new(base, None).unwrap();
        let err = provider.complete("m", &conversation()).await.unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = OpenAiCompatProvider::new("http://localhost:1/v1/", None)
            .unwrap()
            .with_name("local");
        assert_eq!(provider.base_url(), "http://localhost:1/v1");
        assert_eq!(provider.name(), "local");
    }
}
