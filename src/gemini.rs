//! Minimal client for the Gemini proxy backend.
//!
//! The proxy accepts `{prompt, systemPrompt, temperature, maxTokens}` and
//! answers `{response}` on success or `{error, message}` on failure. We treat
//! any non-2xx status or transport error the same way: one failed attempt.
//! Calls are instrumented and log latencies and response sizes (not contents).

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

const DEFAULT_ENDPOINT: &str = "http://localhost:8787/gemini";
const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Clone)]
pub struct GeminiProxy {
  client: reqwest::Client,
  pub endpoint: String,
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
  prompt: &'a str,
  #[serde(rename = "systemPrompt")]
  system_prompt: &'a str,
  temperature: f32,
  #[serde(rename = "maxTokens")]
  max_tokens: u32,
}

#[derive(Deserialize)]
struct ProxyResponse {
  response: String,
  #[serde(default)]
  usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Usage {
  #[serde(default, rename = "promptTokens")]
  prompt_tokens: Option<f64>,
  #[serde(default, rename = "completionTokens")]
  completion_tokens: Option<f64>,
  #[serde(default, rename = "totalTokens")]
  total_tokens: Option<f64>,
}

impl GeminiProxy {
  /// Build a client against GEMINI_PROXY_URL (or the localhost default).
  pub fn from_env() -> Self {
    let endpoint =
      std::env::var("GEMINI_PROXY_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
    Self::new(endpoint)
  }

  pub fn new(endpoint: String) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .unwrap_or_default();
    Self { client, endpoint }
  }

  /// One generation round-trip through the proxy.
  #[instrument(level = "info", skip(self, prompt, system_prompt),
               fields(endpoint = %self.endpoint, prompt_len = prompt.len()))]
  pub async fn generate(
    &self,
    prompt: &str,
    system_prompt: &str,
    temperature: f32,
    max_tokens: u32,
  ) -> Result<String, String> {
    let req = ProxyRequest { prompt, system_prompt, temperature, max_tokens };

    let start = std::time::Instant::now();
    let res = self
      .client
      .post(&self.endpoint)
      .header(USER_AGENT, "coachlens-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_proxy_error(&body).unwrap_or(body);
      error!(target: "coachlens_backend", %status, ?elapsed, "Proxy call failed");
      return Err(format!("Proxy HTTP {}: {}", status, msg));
    }

    let body: ProxyResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(
        prompt_tokens = ?usage.prompt_tokens,
        completion_tokens = ?usage.completion_tokens,
        total_tokens = ?usage.total_tokens,
        "Proxy usage"
      );
    }
    info!(?elapsed, response_len = body.response.len(), "Proxy response received");
    Ok(body.response.trim().to_string())
  }
}

/// Try to extract a clean error message from the proxy error body.
fn extract_proxy_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    #[allow(dead_code)]
    error: String,
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn proxy_error_bodies_are_unwrapped() {
    let body = r#"{"error":"AI generation failed","message":"API quota exceeded"}"#;
    assert_eq!(extract_proxy_error(body), Some("API quota exceeded".to_string()));
    assert_eq!(extract_proxy_error("not json"), None);
  }
}
