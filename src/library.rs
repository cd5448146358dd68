//! The learning library (timeline): saved study aids, quiz history, and the
//! related-items matching that links them.
//!
//! Similarity is a coarse additive score over shared source domain, shared
//! detected topics, title word overlap, and matching item kind. It is a
//! browsing aid, not a semantic measure.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{LibraryContent, LibraryItem, LibraryKind, QuizRecord};
use crate::storage::Storage;

const LIBRARY_KEY: &str = "coachLensLibrary";
const QUIZ_HISTORY_KEY: &str = "quizHistory";
const LIBRARY_CAP: usize = 20;
const HISTORY_CAP: usize = 20;
const SIMILAR_MIN_SCORE: u32 = 2;
const SIMILAR_CAP: usize = 5;
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Topics we recognize when grouping and relating library items.
const COMMON_TOPICS: &[&str] = &[
  "machine learning", "artificial intelligence", "neural networks", "deep learning",
  "programming", "javascript", "python", "react", "node.js",
  "mathematics", "statistics", "calculus", "algebra",
  "science", "physics", "chemistry", "biology",
  "business", "marketing", "finance", "economics",
  "technology", "software", "development", "coding",
];

#[derive(Clone, Debug, Serialize)]
pub struct SimilarItem {
  #[serde(flatten)]
  pub item: LibraryItem,
  #[serde(rename = "similarityScore")]
  pub similarity_score: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicGroup {
  pub topic: String,
  pub items: Vec<LibraryItem>,
}

#[derive(Clone)]
pub struct LibraryStore {
  storage: Arc<dyn Storage>,
}

impl LibraryStore {
  pub fn new(storage: Arc<dyn Storage>) -> Self {
    Self { storage }
  }

  /// Save a new item at the head of the library, trimming to the cap.
  #[instrument(level = "info", skip(self, content), fields(%title))]
  pub async fn save(
    &self,
    kind: LibraryKind,
    title: String,
    content: LibraryContent,
    url: String,
  ) -> LibraryItem {
    let item = LibraryItem {
      id: Uuid::new_v4().to_string(),
      kind,
      title,
      content,
      url,
      timestamp: Utc::now(),
    };

    let mut items = self.list().await;
    items.insert(0, item.clone());
    items.truncate(LIBRARY_CAP);
    self.write_list(LIBRARY_KEY, &items).await;

    info!(target: "coachlens_backend", id = %item.id, total = items.len(), "Library item saved");
    item
  }

  pub async fn list(&self) -> Vec<LibraryItem> {
    self
      .storage
      .get(LIBRARY_KEY)
      .await
      .and_then(|v| serde_json::from_value(v).ok())
      .unwrap_or_default()
  }

  pub async fn get(&self, id: &str) -> Option<LibraryItem> {
    self.list().await.into_iter().find(|i| i.id == id)
  }

  /// Related items for one entry: score everything else, keep scores >= 2,
  /// top 5 by score.
  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn similar(&self, id: &str) -> Vec<SimilarItem> {
    let items = self.list().await;
    let Some(current) = items.iter().find(|i| i.id == id) else {
      return Vec::new();
    };

    let mut similar: Vec<SimilarItem> = items
      .iter()
      .filter(|other| other.id != current.id)
      .map(|other| SimilarItem {
        item: other.clone(),
        similarity_score: similarity_score(current, other),
      })
      .filter(|s| s.similarity_score >= SIMILAR_MIN_SCORE)
      .collect();

    similar.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
    similar.truncate(SIMILAR_CAP);
    similar
  }

  /// Group items by their first detected topic; only groups with more than
  /// one member are worth showing.
  pub async fn grouped(&self) -> Vec<TopicGroup> {
    let mut groups: HashMap<String, Vec<LibraryItem>> = HashMap::new();
    for item in self.list().await {
      let topic = extract_topics(&item_text(&item))
        .into_iter()
        .next()
        .unwrap_or_else(|| "General".to_string());
      groups.entry(topic).or_default().push(item);
    }

    let mut out: Vec<TopicGroup> = groups
      .into_iter()
      .filter(|(_, items)| items.len() > 1)
      .map(|(topic, items)| TopicGroup { topic, items })
      .collect();
    out.sort_by(|a, b| a.topic.cmp(&b.topic));
    out
  }

  /// Record one finished quiz attempt, newest first, capped.
  #[instrument(level = "info", skip(self))]
  pub async fn record_quiz_result(&self, score: u32, total: u32, title: String) -> QuizRecord {
    let percentage = if total == 0 {
      0
    } else {
      ((score as f64 / total as f64) * 100.0).round() as u32
    };
    let record = QuizRecord { score, total, percentage, title, timestamp: Utc::now() };

    let mut history = self.quiz_history().await;
    history.insert(0, record.clone());
    history.truncate(HISTORY_CAP);
    self.write_list(QUIZ_HISTORY_KEY, &history).await;
    record
  }

  pub async fn quiz_history(&self) -> Vec<QuizRecord> {
    self
      .storage
      .get(QUIZ_HISTORY_KEY)
      .await
      .and_then(|v| serde_json::from_value(v).ok())
      .unwrap_or_default()
  }

  async fn write_list<T: Serialize>(&self, key: &str, items: &[T]) {
    if let Ok(value) = serde_json::to_value(items) {
      self.storage.set(key, value).await;
    }
  }
}

fn item_text(item: &LibraryItem) -> String {
  format!("{} {}", item.title, item.content.preview())
}

/// Known topics found in the text, or `General` when nothing matches.
pub fn extract_topics(text: &str) -> Vec<String> {
  let lower = text.to_lowercase();
  let found: Vec<String> = COMMON_TOPICS
    .iter()
    .filter(|t| lower.contains(*t))
    .map(|t| t.to_string())
    .collect();
  if found.is_empty() { vec!["General".to_string()] } else { found }
}

/// Word-overlap ratio between two strings: |common| / max(len).
pub fn text_similarity(a: &str, b: &str) -> f64 {
  let a_lower = a.to_lowercase();
  let b_lower = b.to_lowercase();
  let words_a: Vec<&str> = a_lower.split_whitespace().collect();
  let words_b: Vec<&str> = b_lower.split_whitespace().collect();
  let longest = words_a.len().max(words_b.len());
  if longest == 0 {
    return 0.0;
  }
  let common = words_a.iter().filter(|w| words_b.contains(w)).count();
  common as f64 / longest as f64
}

fn similarity_score(current: &LibraryItem, other: &LibraryItem) -> u32 {
  let mut score = 0;

  if !current.url.is_empty()
    && !other.url.is_empty()
    && domain_from_url(&current.url) == domain_from_url(&other.url)
  {
    score += 3;
  }

  let current_topics = extract_topics(&item_text(current));
  let other_topics = extract_topics(&item_text(other));
  let common = current_topics.iter().filter(|t| other_topics.contains(t)).count();
  score += 2 * common as u32;

  if text_similarity(&current.title, &other.title) > TITLE_SIMILARITY_THRESHOLD {
    score += 2;
  }

  if current.kind == other.kind {
    score += 1;
  }

  score
}

/// Hostname without the `www.` prefix, or `Unknown` for unparsable input.
pub fn domain_from_url(raw: &str) -> String {
  url::Url::parse(raw)
    .ok()
    .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
    .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStore;

  fn store() -> LibraryStore {
    LibraryStore::new(Arc::new(MemoryStore::default()))
  }

  #[test]
  fn topics_fall_back_to_general() {
    assert_eq!(extract_topics("nothing recognizable here"), vec!["General"]);
    let found = extract_topics("Intro to machine learning and statistics");
    assert!(found.contains(&"machine learning".to_string()));
    assert!(found.contains(&"statistics".to_string()));
  }

  #[test]
  fn similarity_ratio_is_bounded() {
    assert_eq!(text_similarity("", ""), 0.0);
    assert!(text_similarity("knn neighbors", "knn neighbors") > 0.99);
    assert!(text_similarity("knn classifier notes", "sourdough hydration chart") < 0.01);
  }

  #[test]
  fn domains_strip_www() {
    assert_eq!(domain_from_url("https://www.example.org/page"), "example.org");
    assert_eq!(domain_from_url("not a url"), "Unknown");
    assert_eq!(domain_from_url(""), "Unknown");
  }

  #[tokio::test]
  async fn save_caps_the_library() {
    let lib = store();
    for i in 0..25 {
      lib
        .save(
          LibraryKind::Summary,
          format!("Item {}", i),
          LibraryContent::Text("body".to_string()),
          String::new(),
        )
        .await;
    }
    let items = lib.list().await;
    assert_eq!(items.len(), LIBRARY_CAP);
    assert_eq!(items[0].title, "Item 24");
  }

  #[tokio::test]
  async fn similar_finds_items_on_the_same_topic() {
    let lib = store();
    let a = lib
      .save(
        LibraryKind::Summary,
        "Notes on machine learning basics".to_string(),
        LibraryContent::Text("machine learning and neural networks overview".to_string()),
        "https://example.org/ml".to_string(),
      )
      .await;
    lib
      .save(
        LibraryKind::Quiz,
        "Quiz: machine learning".to_string(),
        LibraryContent::Text("machine learning questions".to_string()),
        "https://example.org/ml-quiz".to_string(),
      )
      .await;

    let similar = lib.similar(&a.id).await;
    assert_eq!(similar.len(), 1);
    // Same domain (3) + shared topic (2) + title overlap (2).
    assert!(similar[0].similarity_score >= 5);
  }

  #[tokio::test]
  async fn grouped_keeps_only_multi_item_topics() {
    let lib = store();
    lib
      .save(
        LibraryKind::Summary,
        "python tips".to_string(),
        LibraryContent::Text("python iterators".to_string()),
        String::new(),
      )
      .await;
    lib
      .save(
        LibraryKind::Explanation,
        "python decorators".to_string(),
        LibraryContent::Text("python functions".to_string()),
        String::new(),
      )
      .await;
    lib
      .save(
        LibraryKind::Summary,
        "sourdough starter".to_string(),
        LibraryContent::Text("feeding schedule".to_string()),
        String::new(),
      )
      .await;

    let groups = lib.grouped().await;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].topic, "python");
    assert_eq!(groups[0].items.len(), 2);
  }

  #[tokio::test]
  async fn quiz_history_records_percentage() {
    let lib = store();
    let record = lib.record_quiz_result(2, 3, "Quiz: KNN".to_string()).await;
    assert_eq!(record.percentage, 67);
    assert_eq!(lib.quiz_history().await.len(), 1);
    let zero = lib.record_quiz_result(0, 0, "empty".to_string()).await;
    assert_eq!(zero.percentage, 0);
  }
}
