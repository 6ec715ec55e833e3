use std::sync::{Mutex, RwLock};

use chrono::Utc;

use crate::prompt::render_prompt;
use crate::stream::{parse_chunk, ResponseStream};
use crate::types::{
    ChatTurn, GenerateOptions, GenerateRequest, HealthStatus, OllamaConfig, TagsResponse,
};
use crate::{OllamaError, Result};

// ─── OllamaClient ─────────────────────────────────────────────────────────

/// Async client for a single model on an Ollama server.
///
/// The HTTP connection pool only exists between [`start`](Self::start) and
/// [`close`](Self::close); calls outside that window fail with
/// [`OllamaError::NotStarted`]. Every request updates the cached
/// [`HealthStatus`] so [`health`](Self::health) stays cheap and synchronous.
pub struct OllamaClient {
    config: OllamaConfig,
    http: RwLock<Option<reqwest::Client>>,
    health: Mutex<HealthStatus>,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        let health = HealthStatus::unknown(&config.model);
        Self {
            config,
            http: RwLock::new(None),
            health: Mutex::new(health),
        }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Build the HTTP client and probe the server.
    ///
    /// An unreachable server or missing model does not fail `start`; it is
    /// recorded in [`health`](Self::health) for the caller to act on.
    pub async fn start(&self) -> Result<()> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()?;
        *self.http.write().unwrap_or_else(|e| e.into_inner()) = Some(client);

        let status = self.check_health().await;
        tracing::info!(
            base_url = %self.config.base_url,
            model = %self.config.model,
            healthy = status.is_healthy,
            "ollama client started"
        );
        Ok(())
    }

    /// Drop the HTTP client. Idempotent.
    pub async fn close(&self) {
        let was_open = self
            .http
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some();
        if was_open {
            self.record(Err("client closed".to_string()));
            tracing::info!(model = %self.config.model, "ollama client closed");
        }
    }

    /// Last known health. Never performs I/O.
    pub fn health(&self) -> HealthStatus {
        self.health.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Query `/api/tags` and refresh the cached health.
    pub async fn check_health(&self) -> HealthStatus {
        let outcome = match self.fetch_tags().await {
            Ok(tags) if tags.has_model(&self.config.model) => Ok(()),
            Ok(_) => Err(format!(
                "model '{}' is not installed on {}",
                self.config.model, self.config.base_url
            )),
            Err(e) => Err(e.to_string()),
        };
        if let Err(msg) = &outcome {
            tracing::warn!(error = %msg, "ollama health check failed");
        }
        self.record(outcome);
        self.health()
    }

    /// Generate a complete response.
    pub async fn generate(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        system: Option<&str>,
    ) -> Result<String> {
        let client = self.client()?;
        let body = self.request(prompt, history, system, false);

        let result = async {
            let response = client
                .post(self.config.endpoint("/api/generate"))
                .json(&body)
                .send()
                .await?;
            let text = checked(response).await?.text().await?;
            let chunk = parse_chunk(text.trim())?;
            Ok::<_, OllamaError>(chunk.response)
        }
        .await;

        self.record(result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        result
    }

    /// Start a streaming generation and return its fragments.
    pub async fn stream(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        system: Option<&str>,
    ) -> Result<ResponseStream> {
        let client = self.client()?;
        let body = self.request(prompt, history, system, true);

        let result = async {
            let response = client
                .post(self.config.endpoint("/api/generate"))
                .json(&body)
                .send()
                .await?;
            checked(response).await
        }
        .await;

        self.record(result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        Ok(ResponseStream::spawn(result?))
    }

    // ─── Internal ─────────────────────────────────────────────────────────

    fn client(&self) -> Result<reqwest::Client> {
        self.http
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(OllamaError::NotStarted)
    }

    async fn fetch_tags(&self) -> Result<TagsResponse> {
        let client = self.client()?;
        let response = client.get(self.config.endpoint("/api/tags")).send().await?;
        Ok(checked(response).await?.json::<TagsResponse>().await?)
    }

    pub(crate) fn request(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        system: Option<&str>,
        stream: bool,
    ) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model.clone(),
            prompt: render_prompt(prompt, history, self.config.max_context_turns),
            system: system.map(str::to_string),
            stream,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        }
    }

    fn record(&self, outcome: std::result::Result<(), String>) {
        let mut health = self.health.lock().unwrap_or_else(|e| e.into_inner());
        health.last_check = Some(Utc::now());
        match outcome {
            Ok(()) => {
                health.is_healthy = true;
                health.last_error = None;
            }
            Err(msg) => {
                health.is_healthy = false;
                health.last_error = Some(msg);
            }
        }
    }
}

/// Turn a non-2xx response into [`OllamaError::Status`] with its body.
async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OllamaError::Status {
        status: status.as_u16(),
        body,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mockito::Matcher;
    use serde_json::json;

    fn config(url: &str) -> OllamaConfig {
        OllamaConfig {
            base_url: url.to_string(),
            model: "llama3.2:3b".into(),
            ..Default::default()
        }
    }

    const TAGS: &str = r#"{"models":[{"name":"llama3.2:3b"},{"name":"mistral:latest"}]}"#;

    async fn started(server: &mockito::ServerGuard) -> OllamaClient {
        let client = OllamaClient::new(config(&server.url()));
        client.start().await.unwrap();
        client
    }

    #[tokio::test]
    async fn start_marks_healthy_when_model_installed() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(TAGS)
            .create_async()
            .await;

        let client = started(&server).await;
        let health = client.health();
        assert!(health.is_healthy);
        assert_eq!(health.model_name, "llama3.2:3b");
        assert!(health.last_check.is_some());
    }

    #[tokio::test]
    async fn start_marks_unhealthy_when_model_missing() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(r#"{"models":[{"name":"phi3:mini"}]}"#)
            .create_async()
            .await;

        let client = started(&server).await;
        let health = client.health();
        assert!(!health.is_healthy);
        assert!(health.last_error.unwrap().contains("not installed"));
    }

    #[tokio::test]
    async fn start_marks_unhealthy_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = started(&server).await;
        assert!(!client.health().is_healthy);
    }

    #[tokio::test]
    async fn generate_before_start_is_not_started() {
        let client = OllamaClient::new(OllamaConfig::default());
        let err = client.generate("hi", &[], None).await.unwrap_err();
        assert!(matches!(err, OllamaError::NotStarted));
    }

    #[tokio::test]
    async fn generate_sends_system_prompt_and_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(TAGS)
            .create_async()
            .await;
        let gen = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3.2:3b",
                "system": "be brief",
                "stream": false
            })))
            .with_body(r#"{"model":"llama3.2:3b","response":"Hello!","done":true}"#)
            .create_async()
            .await;

        let client = started(&server).await;
        let text = client.generate("hi", &[], Some("be brief")).await.unwrap();
        assert_eq!(text, "Hello!");
        gen.assert_async().await;
    }

    #[tokio::test]
    async fn generate_http_error_marks_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(TAGS)
            .create_async()
            .await;
        let _gen = server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model not found"}"#)
            .create_async()
            .await;

        let client = started(&server).await;
        let err = client.generate("hi", &[], None).await.unwrap_err();
        assert!(matches!(err, OllamaError::Status { status: 404, .. }));
        assert!(!client.health().is_healthy);
    }

    #[tokio::test]
    async fn stream_yields_fragments_until_done() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(TAGS)
            .create_async()
            .await;
        let body = [
            r#"{"response":"Hel","done":false}"#,
            r#"{"response":"lo","done":false}"#,
            r#"{"response":"","done":true,"done_reason":"stop"}"#,
            r#"{"response":"ignored","done":false}"#,
        ]
        .join("\n");
        let _gen = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({"stream": true})))
            .with_body(body)
            .create_async()
            .await;

        let client = started(&server).await;
        let stream = client.stream("hi", &[], None).await.unwrap();
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn stream_surfaces_in_band_error() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(TAGS)
            .create_async()
            .await;
        let body = "{\"response\":\"par\",\"done\":false}\n{\"error\":\"out of memory\"}\n";
        let _gen = server
            .mock("POST", "/api/generate")
            .with_body(body)
            .create_async()
            .await;

        let client = started(&server).await;
        let items: Vec<_> = client.stream("hi", &[], None).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "par");
        assert!(matches!(items[1], Err(OllamaError::Server(_))));
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_further_calls() {
        let mut server = mockito::Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_body(TAGS)
            .create_async()
            .await;

        let client = started(&server).await;
        client.close().await;
        client.close().await;
        assert!(!client.health().is_healthy);
        let err = client.stream("hi", &[], None).await.err().unwrap();
        assert!(matches!(err, OllamaError::NotStarted));
    }

    #[test]
    fn request_renders_history_and_options() {
        let client = OllamaClient::new(OllamaConfig {
            temperature: 0.1,
            max_tokens: 64,
            ..Default::default()
        });
        let history = vec![ChatTurn {
            user: "who are you".into(),
            assistant: "the brain".into(),
        }];
        let req = client.request("and now?", &history, None, true);
        assert!(req.prompt.contains("User: who are you"));
        assert!(req.system.is_none());
        assert!(req.stream);
        assert_eq!(req.options.num_predict, 64);
    }

    #[test]
    fn tags_match_latest_alias() {
        let tags: TagsResponse = serde_json::from_str(TAGS).unwrap();
        assert!(tags.has_model("mistral"));
        assert!(tags.has_model("llama3.2:3b"));
        assert!(!tags.has_model("llama3.2"));
    }
}
