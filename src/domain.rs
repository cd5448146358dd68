//! Domain models used by the backend: page content, quiz items, and library entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text captured from one page by the extension's extraction script.
/// Immutable once captured; the source of truth for one analysis cycle.
/// Body arrives already stripped of script/style/nav boilerplate and capped
/// at a few thousand characters by the extractor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
  #[serde(default)] pub title: String,
  #[serde(default)] pub url: String,
  #[serde(default)] pub body: String,
  #[serde(default)] pub word_count: usize,
}

/// One quiz question. The wire format matches the extension: multiple-choice
/// items carry `options` + `correctAnswer`, free-text items carry `answer`.
/// Internally this is a proper sum type, never a duck-typed optional field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QuizItem {
  MultipleChoice {
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: String,
  },
  FreeText {
    question: String,
    #[serde(rename = "answer")]
    reference_answer: String,
  },
}

impl QuizItem {
  pub fn question(&self) -> &str {
    match self {
      QuizItem::MultipleChoice { question, .. } => question,
      QuizItem::FreeText { question, .. } => question,
    }
  }

  /// Question, options, and answer joined into one lower-cased string.
  /// The relevance validator matches page tokens against this.
  pub fn combined_text(&self) -> String {
    match self {
      QuizItem::MultipleChoice { question, options, correct_answer } => {
        format!("{} {} {}", question, options.join(" "), correct_answer).to_lowercase()
      }
      QuizItem::FreeText { question, reference_answer } => {
        format!("{} {}", question, reference_answer).to_lowercase()
      }
    }
  }
}

/// What kind of study aid a library entry holds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LibraryKind {
  Summary,
  Explanation,
  Quiz,
  Chat,
}

/// Payload of a library entry: prose for summaries/explanations/chat,
/// a question list for saved quizzes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LibraryContent {
  Quiz(Vec<QuizItem>),
  Text(String),
}

impl LibraryContent {
  /// Short plain-text preview used for topic extraction and similarity.
  pub fn preview(&self) -> String {
    match self {
      LibraryContent::Text(t) => t.clone(),
      LibraryContent::Quiz(items) => items
        .iter()
        .map(|q| q.question().to_string())
        .collect::<Vec<_>>()
        .join(" "),
    }
  }
}

/// One saved study aid in the learning library (timeline).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LibraryItem {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: LibraryKind,
  pub title: String,
  pub content: LibraryContent,
  #[serde(default)]
  pub url: String,
  pub timestamp: DateTime<Utc>,
}

/// One completed quiz attempt, aggregated to a score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizRecord {
  pub score: u32,
  pub total: u32,
  pub percentage: u32,
  pub title: String,
  pub timestamp: DateTime<Utc>,
}
