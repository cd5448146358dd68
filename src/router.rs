//! AI response routing shared by HTTP and WebSocket handlers.
//!
//! A session probes on-device availability once, then serves every request
//! through an explicit fallback chain: Attempting(OnDevice) →
//! Attempting(Cloud) → Fallback. An on-device failure demotes the session to
//! cloud for its remaining lifetime. Quiz requests are the one asymmetry:
//! a cloud failure propagates to the caller, which holds a content-derived
//! heuristic quiz, instead of degrading to canned mock text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::QuizItem;
use crate::gemini::GeminiProxy;
use crate::ondevice::{Availability, OnDeviceModel};
use crate::util::{fill_template, truncate_chars};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// What the caller is asking the AI for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
  Summarize,
  Explain,
  Quiz,
  Chat,
  Compare,
}

/// Normalized response shape across all three backends.
#[derive(Clone, Debug, PartialEq)]
pub enum RouterResponse {
  Text(String),
  Quiz(Vec<QuizItem>),
}

/// Session-level backend selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiMode {
  OnDevice,
  Cloud,
}

/// One step of the per-call fallback chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
  OnDevice,
  Cloud,
  Fallback,
}

/// Per-UI-session routing state: the selected mode and the accumulating
/// chat context. Owned by one connection; never shared.
pub struct RouterSession {
  mode: AiMode,
  ondevice: Arc<dyn OnDeviceModel>,
  proxy: GeminiProxy,
  prompts: Prompts,
  chat_context: String,
}

impl RouterSession {
  /// Probe on-device availability once and pin the session mode.
  #[instrument(level = "info", skip_all)]
  pub async fn new(ondevice: Arc<dyn OnDeviceModel>, proxy: GeminiProxy, prompts: Prompts) -> Self {
    let availability = ondevice.availability().await;
    let mode = match availability {
      Availability::Readily => AiMode::OnDevice,
      Availability::AfterDownload | Availability::Unavailable => AiMode::Cloud,
    };
    info!(target: "coachlens_backend", availability = ?availability, mode = ?mode, "AI mode selected for session");
    Self { mode, ondevice, proxy, prompts, chat_context: String::new() }
  }

  pub fn mode(&self) -> AiMode {
    self.mode
  }

  pub fn chat_context(&self) -> &str {
    &self.chat_context
  }

  /// Append one exchange to the session's accumulating chat context.
  pub fn remember_exchange(&mut self, user: &str, reply: &str) {
    self.chat_context.push_str(&format!("\nUser: {}\nAI: {}", user, reply));
  }

  /// Serve one request through the fallback chain.
  #[instrument(level = "info", skip(self, content, context), fields(content_len = content.len()))]
  pub async fn respond(
    &mut self,
    kind: TaskKind,
    content: &str,
    context: &str,
  ) -> Result<RouterResponse, String> {
    let mut attempt = match self.mode {
      AiMode::OnDevice => Attempt::OnDevice,
      AiMode::Cloud => Attempt::Cloud,
    };

    loop {
      match attempt {
        Attempt::OnDevice => match self.try_on_device(kind, content, context).await {
          Ok(r) => return Ok(r),
          Err(e) => {
            warn!(target: "coachlens_backend", error = %e, "On-device attempt failed; demoting session to cloud");
            self.mode = AiMode::Cloud;
            attempt = Attempt::Cloud;
          }
        },
        Attempt::Cloud => match self.try_cloud(kind, content, context).await {
          Ok(r) => return Ok(r),
          Err(e) => {
            if kind == TaskKind::Quiz {
              // The quiz caller holds a better fallback than canned text:
              // the content-derived heuristic quiz.
              error!(target: "quiz", error = %e, "Cloud quiz generation failed; propagating to heuristic path");
              return Err(e);
            }
            warn!(target: "coachlens_backend", error = %e, "Cloud attempt failed; serving mock response");
            attempt = Attempt::Fallback;
          }
        },
        Attempt::Fallback => {
          return Ok(RouterResponse::Text(self.mock_response(kind, content, context)));
        }
      }
    }
  }

  async fn try_on_device(
    &self,
    kind: TaskKind,
    content: &str,
    context: &str,
  ) -> Result<RouterResponse, String> {
    let mut session = self.ondevice.create_session().await?;
    let combined = format!(
      "{}\n\n{}",
      self.system_prompt(kind),
      self.build_prompt(kind, content, context)
    );
    let result = session.prompt(&combined).await;
    session.destroy();
    parse_response(kind, &result?)
  }

  async fn try_cloud(
    &self,
    kind: TaskKind,
    content: &str,
    context: &str,
  ) -> Result<RouterResponse, String> {
    let raw = self
      .proxy
      .generate(
        &self.build_prompt(kind, content, context),
        self.system_prompt(kind),
        TEMPERATURE,
        MAX_TOKENS,
      )
      .await?;
    parse_response(kind, &raw)
  }

  fn system_prompt(&self, kind: TaskKind) -> &str {
    match kind {
      TaskKind::Summarize => &self.prompts.summarize_system,
      TaskKind::Explain => &self.prompts.explain_system,
      TaskKind::Quiz => &self.prompts.quiz_system,
      TaskKind::Chat => &self.prompts.chat_system,
      TaskKind::Compare => &self.prompts.compare_system,
    }
  }

  fn build_prompt(&self, kind: TaskKind, content: &str, context: &str) -> String {
    let p = &self.prompts;
    match kind {
      TaskKind::Summarize => fill_template(&p.summarize_user_template, &[("content", content)]),
      TaskKind::Explain => fill_template(&p.explain_user_template, &[("content", content)]),
      TaskKind::Quiz => {
        let base = fill_template(&p.quiz_user_template, &[("content", content)]);
        if context.is_empty() { base } else { format!("{}\n\n{}", context, base) }
      }
      TaskKind::Chat => {
        fill_template(&p.chat_user_template, &[("content", content), ("context", context)])
      }
      TaskKind::Compare => {
        fill_template(&p.compare_user_template, &[("content", content), ("context", context)])
      }
    }
  }

  /// Static templated responses for when every AI backend is down.
  /// Each references the (truncated) input so the reply is never fully generic.
  fn mock_response(&self, kind: TaskKind, content: &str, context: &str) -> String {
    match kind {
      TaskKind::Summarize => format!(
        "## Summary\n\nThis content discusses {}\n\n### Key Points\n- Main concept explained\n- Important details highlighted\n- Practical applications mentioned",
        truncate_chars(content, 50)
      ),
      TaskKind::Explain => format!(
        "This concept can be understood as follows:\n\n**Simple Explanation:** {} is like a tool that helps us understand complex ideas.\n\n**Analogy:** Think of it as a bridge that connects what you already know to new information.",
        truncate_chars(content, 30)
      ),
      TaskKind::Chat => {
        if context.trim().is_empty() {
          format!(
            "I'd be happy to help you with \"{}\". However, I don't have access to the current page content. Could you provide more context about what you're reading?",
            truncate_chars(content, 50)
          )
        } else {
          format!(
            "Based on the material you are studying, I can help you understand the content. The context mentions {}. Your question \"{}\" relates to this. What specific aspect would you like me to explain further?",
            truncate_chars(context, 100),
            truncate_chars(content, 50)
          )
        }
      }
      TaskKind::Compare => format!(
        "Comparison of learning items about \"{}\":\n\n- The items cover closely related material\n- This topic appears to be important in your learning journey\n- Consider reviewing these items together for better understanding",
        context
      ),
      // Quiz never reaches the fallback step; cloud failures propagate.
      TaskKind::Quiz => "I understand your request. Let me help you with that.".to_string(),
    }
  }
}

fn parse_response(kind: TaskKind, raw: &str) -> Result<RouterResponse, String> {
  if kind == TaskKind::Quiz {
    let clean = strip_code_fences(raw);
    let items: Vec<QuizItem> =
      serde_json::from_str(clean).map_err(|e| format!("quiz JSON parse error: {}", e))?;
    return Ok(RouterResponse::Quiz(items));
  }
  Ok(RouterResponse::Text(raw.to_string()))
}

/// Models wrap JSON in markdown fences more often than not.
fn strip_code_fences(response: &str) -> &str {
  response
    .trim()
    .trim_start_matches("```json")
    .trim_start_matches("```")
    .trim_end_matches("```")
    .trim()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ondevice::{NoOnDevice, OnDeviceSession};
  use async_trait::async_trait;

  // A proxy endpoint nothing listens on: every cloud attempt fails fast.
  fn dead_proxy() -> GeminiProxy {
    GeminiProxy::new("http://127.0.0.1:1/gemini".to_string())
  }

  struct CannedSession {
    reply: Result<String, String>,
  }

  #[async_trait]
  impl OnDeviceSession for CannedSession {
    async fn prompt(&mut self, _text: &str) -> Result<String, String> {
      self.reply.clone()
    }
  }

  struct CannedModel {
    availability: Availability,
    reply: Result<String, String>,
  }

  #[async_trait]
  impl OnDeviceModel for CannedModel {
    async fn availability(&self) -> Availability {
      self.availability
    }

    async fn create_session(&self) -> Result<Box<dyn OnDeviceSession>, String> {
      Ok(Box::new(CannedSession { reply: self.reply.clone() }))
    }
  }

  fn canned(reply: Result<String, String>) -> Arc<dyn OnDeviceModel> {
    Arc::new(CannedModel { availability: Availability::Readily, reply })
  }

  #[tokio::test]
  async fn unavailable_probe_pins_cloud_mode() {
    let session =
      RouterSession::new(Arc::new(NoOnDevice), dead_proxy(), Prompts::default()).await;
    assert_eq!(session.mode(), AiMode::Cloud);
  }

  #[tokio::test]
  async fn quiz_cloud_failure_propagates() {
    let mut session =
      RouterSession::new(Arc::new(NoOnDevice), dead_proxy(), Prompts::default()).await;
    let result = session.respond(TaskKind::Quiz, "some page body", "").await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn summarize_cloud_failure_returns_mock_with_preview() {
    let mut session =
      RouterSession::new(Arc::new(NoOnDevice), dead_proxy(), Prompts::default()).await;
    let content = "The mitochondria is the powerhouse of the cell and produces ATP.";
    let result = session.respond(TaskKind::Summarize, content, "").await.unwrap();
    let RouterResponse::Text(text) = result else {
      panic!("summarize must yield text");
    };
    assert!(!text.is_empty());
    assert!(text.contains(&truncate_chars(content, 50)));
  }

  #[tokio::test]
  async fn readily_probe_serves_on_device() {
    let model = canned(Ok("A short canned summary.".to_string()));
    let mut session = RouterSession::new(model, dead_proxy(), Prompts::default()).await;
    assert_eq!(session.mode(), AiMode::OnDevice);

    let result = session.respond(TaskKind::Summarize, "body", "").await.unwrap();
    assert_eq!(result, RouterResponse::Text("A short canned summary.".to_string()));
  }

  #[tokio::test]
  async fn on_device_failure_demotes_session() {
    let model = canned(Err("model crashed".to_string()));
    let mut session = RouterSession::new(model, dead_proxy(), Prompts::default()).await;
    assert_eq!(session.mode(), AiMode::OnDevice);

    // Chain: on-device fails -> cloud fails -> mock. Mode stays demoted.
    let result = session.respond(TaskKind::Explain, "recursion", "").await.unwrap();
    assert!(matches!(result, RouterResponse::Text(_)));
    assert_eq!(session.mode(), AiMode::Cloud);
  }

  #[tokio::test]
  async fn fenced_quiz_json_parses_into_items() {
    let reply = r#"```json
[
  {"question": "What is k?", "options": ["5", "1", "2", "3"], "correctAnswer": "5"},
  {"question": "What metric was reported?", "answer": "92% accuracy"},
  {"question": "How are points classified?", "answer": "majority vote"}
]
```"#;
    let model = canned(Ok(reply.to_string()));
    let mut session = RouterSession::new(model, dead_proxy(), Prompts::default()).await;

    let result = session.respond(TaskKind::Quiz, "body", "").await.unwrap();
    let RouterResponse::Quiz(items) = result else {
      panic!("quiz must parse into items");
    };
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], QuizItem::MultipleChoice { .. }));
  }

  #[tokio::test]
  async fn malformed_quiz_demotes_then_propagates() {
    let model = canned(Ok("here are three questions, no JSON though".to_string()));
    let mut session = RouterSession::new(model, dead_proxy(), Prompts::default()).await;

    let result = session.respond(TaskKind::Quiz, "body", "").await;
    assert!(result.is_err());
    assert_eq!(session.mode(), AiMode::Cloud);
  }

  #[tokio::test]
  async fn chat_context_accumulates_per_session() {
    let mut session =
      RouterSession::new(Arc::new(NoOnDevice), dead_proxy(), Prompts::default()).await;
    session.remember_exchange("what is knn?", "a neighbor-based classifier");
    session.remember_exchange("and k?", "the neighbor count");
    assert!(session.chat_context().contains("what is knn?"));
    assert!(session.chat_context().contains("the neighbor count"));
  }
}
