//! Ollama-compatible text-generation backend.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GenerateError;
use crate::storage::ModelConfig;

/// Something that turns a prompt into free-form text.
pub trait TextGenerator: Send + Sync {
    /// Run one completion.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerateError>> + Send;

    /// Cheap reachability check. Never fails, only answers.
    fn probe(&self) -> impl Future<Output = bool> + Send;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// HTTP client for `POST /api/generate` and `GET /api/tags`.
pub struct OllamaClient {
    client: Client,
    base_url: Url,
    model: String,
    temperature: f32,
    timeout: Duration,
    probe_timeout: Duration,
}

impl OllamaClient {
    /// Build a client from the `[model]` config section.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(config: &ModelConfig) -> Result<Self, GenerateError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            model: config.model_name(),
            temperature: config.temperature,
            timeout,
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> Result<Url, GenerateError> {
        Ok(self.base_url.join(path)?)
    }
}

impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = self.endpoint("api/generate")?;
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let resp = self.client.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GenerateError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = resp.json().await?;
        Ok(parsed.response)
    }

    async fn probe(&self) -> bool {
        let Ok(url) = self.endpoint("api/tags") else {
            return false;
        };
        match self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "model backend probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(url: &str) -> ModelConfig {
        ModelConfig {
            base_url: url.to_string(),
            model: "llama3.2".into(),
            timeout_secs: 5,
            probe_timeout_secs: 1,
            ..ModelConfig::default()
        }
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_returns_response_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "llama3.2",
                "prompt": "hello",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3.2","response":"{\"title\":\"Hi\"}","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server.url())).unwrap();
        let text = client.generate("hello").await.unwrap();

        assert_eq!(text, r#"{"title":"Hi"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(500)
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server.url())).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerateError::Status(500)));
    }

    #[tokio::test]
    async fn probe_reports_reachability() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server.url())).unwrap();
        assert!(client.probe().await);

        // Nothing listens on port 9 locally.
        let offline = OllamaClient::new(&config_for("http://127.0.0.1:9")).unwrap();
        assert!(!offline.probe().await);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            OllamaClient::new(&config_for("not a url")),
            Err(GenerateError::Url(_))
        ));
    }
}
