//! Loading prompt configuration from TOML.
//!
//! See `CoachConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CoachConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Per-task prompts sent to the AI backends. Defaults match the extension's
/// built-in study-coach behavior; override them in TOML to tune tone/structure.
/// Templates accept `{content}` and `{context}` placeholders.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub summarize_system: String,
  pub summarize_user_template: String,
  pub explain_system: String,
  pub explain_user_template: String,
  pub quiz_system: String,
  pub quiz_user_template: String,
  pub chat_system: String,
  pub chat_user_template: String,
  pub compare_system: String,
  pub compare_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      summarize_system: "You are an AI study assistant. Organize content into clear sections with headers.".into(),
      summarize_user_template: "Please summarize this content in an organized way:\n\n{content}".into(),
      explain_system: "You are a teacher. Explain concepts using simple analogies and examples.".into(),
      explain_user_template: "Please explain this concept in simple terms with analogies:\n\n{content}".into(),
      quiz_system: "You are an examiner creating quiz questions based on the specific page content provided. Create 3 quiz questions in JSON format that test understanding of the actual content. Mix multiple choice and text answer questions:\n\nFormat: [\n    {\"question\": \"...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correctAnswer\": \"A\"},\n    {\"question\": \"...\", \"answer\": \"text answer\"}\n]\n\nMake questions educational and test understanding of the specific content, not generic knowledge. Questions should be directly related to the page content provided.".into(),
      quiz_user_template: "Create 3 quiz questions from this content:\n\n{content}".into(),
      chat_system: "You are an AI learning assistant that helps users understand the content they are currently reading. Always reference the specific page content provided in the context. Give detailed, helpful answers based on the actual content of the page the user is viewing. If asked about the page, provide specific information from the content rather than generic responses.".into(),
      chat_user_template: "{context}\n\nUSER QUESTION: {content}\n\nPlease provide a helpful, specific answer based on the page content above. Reference specific information from the current page when relevant.".into(),
      compare_system: "You are an educational analyst. Compare learning materials and identify patterns, connections, and learning progression opportunities.".into(),
      compare_user_template: "Compare and analyze these learning items about \"{context}\":\n\n{content}\n\nProvide insights about patterns, differences, and learning progression.".into(),
    }
  }
}

/// Attempt to load `CoachConfig` from COACH_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<CoachConfig> {
  let path = std::env::var("COACH_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<CoachConfig>(&s) {
      Ok(cfg) => {
        info!(target: "coachlens_backend", %path, "Loaded coach config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "coachlens_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "coachlens_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
