//! Deep content analysis over captured page text.
//!
//! Flow:
//! 1) Classify the page into a coarse content type and subject domain by
//!    keyword membership over the lower-cased title+body.
//! 2) Run the extraction tables: key concepts (repeated phrases), key terms
//!    (repeated words), numeric data, entity-like capitalized runs, and the
//!    pattern-based extractors (processes, relationships, definitions,
//!    examples, main points).
//! 3) Return everything as a `ContentAnalysis` for the question synthesizer.
//!
//! Every field is a best-effort extraction: absence of a signal yields an
//! empty sequence, never an error. Output is recomputed per call and never
//! cached.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse genre of the page text.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
  TechnicalAlgorithm,
  RecipeGuide,
  HistoricalContent,
  TutorialGuide,
  ResearchAcademic,
  NewsArticle,
  #[default]
  GeneralInformational,
}

impl ContentType {
  /// Human-readable label, used as the answer of the classification
  /// fallback question.
  pub fn label(&self) -> &'static str {
    match self {
      ContentType::TechnicalAlgorithm => "Technical/algorithmic content",
      ContentType::RecipeGuide => "Recipe or cooking guide",
      ContentType::HistoricalContent => "Historical content",
      ContentType::TutorialGuide => "Tutorial or guide",
      ContentType::ResearchAcademic => "Research or academic material",
      ContentType::NewsArticle => "News article",
      ContentType::GeneralInformational => "Informational content",
    }
  }
}

/// Coarse subject-matter classification.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
  ArtificialIntelligence,
  ComputerScience,
  LifeSciences,
  PhysicalSciences,
  Business,
  Culinary,
  #[default]
  General,
}

/// One extracted term/definition pair.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Definition {
  pub term: String,
  pub definition: String,
}

/// Result of one analysis pass. Ephemeral: consumed by the synthesizer and
/// discarded, never persisted or mutated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
  pub content_type: ContentType,
  pub domain: Domain,
  pub key_concepts: Vec<String>,
  pub key_terms: Vec<String>,
  pub processes: Vec<String>,
  pub relationships: Vec<String>,
  pub definitions: Vec<Definition>,
  pub numerical_data: Vec<String>,
  pub entities: Vec<String>,
  pub examples: Vec<String>,
  pub main_points: Vec<String>,
  pub word_count: usize,
}

// ---------------------------------------------------------------------------
// Classification tables. First matching category wins, checked in this order.
// ---------------------------------------------------------------------------

const CONTENT_TYPE_RULES: &[(ContentType, &[&str])] = &[
  (ContentType::TechnicalAlgorithm, &["algorithm", "machine learning"]),
  (ContentType::RecipeGuide, &["recipe", "ingredients", "cooking"]),
  (ContentType::HistoricalContent, &["history", "historical", "century"]),
  (ContentType::TutorialGuide, &["tutorial", "how to", "step"]),
  (ContentType::ResearchAcademic, &["research", "study", "analysis"]),
  (ContentType::NewsArticle, &["news", "reported", "breaking"]),
];

const DOMAIN_RULES: &[(Domain, &[&str])] = &[
  (Domain::ArtificialIntelligence, &["machine learning", "ai", "neural"]),
  (Domain::ComputerScience, &["programming", "code", "software"]),
  (Domain::LifeSciences, &["biology", "medical", "health"]),
  (Domain::PhysicalSciences, &["physics", "chemistry", "mathematics"]),
  (Domain::Business, &["business", "marketing", "finance"]),
  (Domain::Culinary, &["cooking", "food", "recipe"]),
];

// ---------------------------------------------------------------------------
// Stop lists.
// ---------------------------------------------------------------------------

const STOP_WORDS: &[&str] = &[
  "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
  "this", "that", "these", "those", "is", "are", "was", "were", "be", "been",
  "have", "has", "had", "do", "does", "did", "will", "would", "could", "should",
  "can", "may", "might", "must", "shall", "from", "into", "onto", "upon",
  "about", "above", "below", "between", "through", "during", "before", "after",
  "while", "when", "where", "why", "how", "what", "which", "who", "whom",
  "very", "more", "most", "some", "any", "all", "each", "every", "other",
  "such", "only", "own", "same", "so", "than", "too", "also", "just",
];

const STOP_PHRASES: &[&str] = &[
  "in the", "of the", "to the", "for the", "on the", "at the", "by the",
  "this is", "that is", "it is", "there are", "there is", "you can",
  "we can", "they are", "will be", "can be", "may be", "should be",
];

const EMPHASIS_WORDS: &[&str] = &[
  "important", "key", "main", "primary", "essential", "crucial", "significant",
];

fn is_stop_word(word: &str) -> bool {
  STOP_WORDS.contains(&word.to_lowercase().as_str())
}

fn is_stop_phrase(phrase: &str) -> bool {
  STOP_PHRASES.contains(&phrase.to_lowercase().as_str())
}

// ---------------------------------------------------------------------------
// Extraction pattern tables: (pattern, per-pattern cap) per category, so the
// sets stay independently testable and swappable.
// ---------------------------------------------------------------------------

static PROCESS_RULES: LazyLock<Vec<(Regex, usize)>> = LazyLock::new(|| {
  compile(&[
    (r"(?i)(?:step|stage|phase)\s+\d+[:.]?\s*[^.!?]+", 3),
    (r"(?i)(?:first|second|third|then|next|finally)[,\s]+[^.!?]+", 3),
    (r"(?i)(?:algorithm|process|method)\s+(?:works|involves|includes)[:\s]*[^.!?]+", 3),
  ])
});

static RELATIONSHIP_RULES: LazyLock<Vec<(Regex, usize)>> = LazyLock::new(|| {
  compile(&[
    (r"(?i)[^.!?]+\s(?:causes?|leads? to|results? in)\s[^.!?]+", 2),
    (r"(?i)[^.!?]+\s(?:compared to|versus|vs\.?|unlike)\s[^.!?]+", 2),
    (r"(?i)[^.!?]+\s(?:depends on|relies on|is based on)\s[^.!?]+", 2),
  ])
});

static DEFINITION_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  vec![
    Regex::new(r"([A-Z][A-Za-z\s]+?)\s+(?:is|are|refers to|means|defined as)\s+([^.!?]+)").unwrap(),
    Regex::new(r"([A-Z][A-Za-z\s]+?):\s*([^.!?]+)").unwrap(),
  ]
});

static EXAMPLE_RULES: LazyLock<Vec<(Regex, usize)>> = LazyLock::new(|| {
  compile(&[
    (r"(?i)(?:for example|such as|including)[:,\s]+[^.!?]+", 3),
    (r"(?i)(?:applications?|uses?|examples?)[:\s]+[^.!?]+", 3),
  ])
});

static NUMERIC_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  vec![
    Regex::new(r"(?i)\b(?:accuracy|precision|recall|f1-score|error rate)[:\s]+\d+(?:\.\d+)?%?").unwrap(),
    Regex::new(r"(?i)\b[knp]\s*=\s*\d+").unwrap(),
    Regex::new(r"\b\d+(?:\.\d+)?(?:\s*%|\s*°[CF]|\s*(?:kg|g|ml|minutes?|hours?|years?|seconds?)\b)?").unwrap(),
  ]
});

static ENTITY_RULE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").unwrap());

fn compile(rules: &[(&str, usize)]) -> Vec<(Regex, usize)> {
  rules
    .iter()
    .map(|(pat, cap)| (Regex::new(pat).unwrap(), *cap))
    .collect()
}

const KEY_CONCEPT_CAP: usize = 8;
const KEY_TERM_CAP: usize = 5;
const PROCESS_CAP: usize = 5;
const RELATIONSHIP_CAP: usize = 4;
const DEFINITION_CAP: usize = 5;
const NUMERIC_CAP: usize = 6;
const ENTITY_CAP: usize = 3;
const EXAMPLE_CAP: usize = 4;
const MAIN_POINT_CAP: usize = 5;

// ---------------------------------------------------------------------------
// Entry point.
// ---------------------------------------------------------------------------

/// Analyze page text. Never fails: degenerate input yields empty sequences
/// and the default classifications.
pub fn analyze(text: &str, title: &str) -> ContentAnalysis {
  let combined = format!("{} {}", title, text).to_lowercase();
  let sentences = split_sentences(text);

  ContentAnalysis {
    content_type: classify_content_type(&combined),
    domain: classify_domain(&combined),
    key_concepts: extract_key_concepts(text),
    key_terms: extract_key_terms(text),
    processes: extract_with_rules(text, &PROCESS_RULES, PROCESS_CAP),
    relationships: extract_with_rules(text, &RELATIONSHIP_RULES, RELATIONSHIP_CAP),
    definitions: extract_definitions(text),
    numerical_data: extract_numerical_data(text),
    entities: extract_entities(text),
    examples: extract_with_rules(text, &EXAMPLE_RULES, EXAMPLE_CAP),
    main_points: extract_main_points(&sentences),
    word_count: text.split_whitespace().count(),
  }
}

fn classify_content_type(combined_lower: &str) -> ContentType {
  for (content_type, keywords) in CONTENT_TYPE_RULES {
    if keywords.iter().any(|k| combined_lower.contains(k)) {
      return *content_type;
    }
  }
  ContentType::GeneralInformational
}

fn classify_domain(combined_lower: &str) -> Domain {
  for (domain, keywords) in DOMAIN_RULES {
    if keywords.iter().any(|k| combined_lower.contains(k)) {
      return *domain;
    }
  }
  Domain::General
}

/// 2- and 3-word sliding windows that repeat across the text, normalized and
/// ranked by frequency (ties keep first-seen order).
fn extract_key_concepts(text: &str) -> Vec<String> {
  let words: Vec<&str> = text.split_whitespace().collect();

  let mut counts: HashMap<String, usize> = HashMap::new();
  let mut order: Vec<String> = Vec::new();
  let mut record = |raw: String| {
    let clean = normalize_phrase(&raw);
    if clean.is_empty() {
      return;
    }
    let n = counts.entry(clean.clone()).or_insert(0);
    if *n == 0 {
      order.push(clean);
    }
    *n += 1;
  };

  for i in 0..words.len() {
    if i + 1 < words.len() {
      let two = format!("{} {}", words[i], words[i + 1]);
      if two.chars().count() > 6 && !is_stop_phrase(&two) {
        record(two);
      }
    }
    if i + 2 < words.len() {
      let three = format!("{} {} {}", words[i], words[i + 1], words[i + 2]);
      if three.chars().count() > 10 && !is_stop_phrase(&three) {
        record(three);
      }
    }
  }

  order.retain(|p| counts[p] > 1);
  order.sort_by(|a, b| counts[b].cmp(&counts[a]));
  order.truncate(KEY_CONCEPT_CAP);
  order
}

/// Single words that repeat: > 3 chars, not stop-listed, frequency > 1,
/// ranked by frequency with ties in first-seen order.
fn extract_key_terms(text: &str) -> Vec<String> {
  let mut counts: HashMap<String, usize> = HashMap::new();
  let mut order: Vec<String> = Vec::new();

  for raw in text.to_lowercase().split_whitespace() {
    let word: String = raw
      .chars()
      .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
      .collect();
    if word.chars().count() <= 3 || is_stop_word(&word) {
      continue;
    }
    let n = counts.entry(word.clone()).or_insert(0);
    if *n == 0 {
      order.push(word);
    }
    *n += 1;
  }

  order.retain(|w| counts[w] > 1);
  order.sort_by(|a, b| counts[b].cmp(&counts[a]));
  order.truncate(KEY_TERM_CAP);
  order
}

/// Run a (pattern, per-pattern cap) table, collect trimmed full matches in
/// table order, cap the overall result.
fn extract_with_rules(text: &str, rules: &[(Regex, usize)], cap: usize) -> Vec<String> {
  let mut out = Vec::new();
  for (re, per_cap) in rules {
    for m in re.find_iter(text).take(*per_cap) {
      out.push(m.as_str().trim().to_string());
    }
  }
  out.truncate(cap);
  out
}

fn extract_definitions(text: &str) -> Vec<Definition> {
  let mut out = Vec::new();
  for re in DEFINITION_RULES.iter() {
    for caps in re.captures_iter(text) {
      let term = caps[1].trim().to_string();
      let definition = caps[2].trim().to_string();
      if !term.is_empty() && term.chars().count() < 50 && !definition.is_empty() {
        out.push(Definition { term, definition });
      }
    }
  }
  out.truncate(DEFINITION_CAP);
  out
}

/// Union of the numeric patterns, merged back into document order.
/// Overlapping matches from different patterns are allowed to duplicate.
fn extract_numerical_data(text: &str) -> Vec<String> {
  let mut found: Vec<(usize, String)> = Vec::new();
  for re in NUMERIC_RULES.iter() {
    for m in re.find_iter(text) {
      found.push((m.start(), m.as_str().trim().to_string()));
    }
  }
  found.sort_by_key(|(start, _)| *start);
  found
    .into_iter()
    .map(|(_, s)| s)
    .take(NUMERIC_CAP)
    .collect()
}

/// Runs of Title-Case tokens, minus stop-listed entries.
fn extract_entities(text: &str) -> Vec<String> {
  ENTITY_RULE
    .find_iter(text)
    .map(|m| m.as_str().trim().to_string())
    .filter(|e| e.chars().count() > 2 && !is_stop_word(e))
    .take(ENTITY_CAP)
    .collect()
}

/// Sentences carrying an emphasis keyword, or long-but-not-rambling ones.
fn extract_main_points(sentences: &[String]) -> Vec<String> {
  sentences
    .iter()
    .filter(|s| {
      let lower = s.to_lowercase();
      let len = s.chars().count();
      EMPHASIS_WORDS.iter().any(|k| lower.contains(k)) || (len > 100 && len < 300)
    })
    .take(MAIN_POINT_CAP)
    .cloned()
    .collect()
}

fn split_sentences(text: &str) -> Vec<String> {
  text
    .split(|c| c == '.' || c == '!' || c == '?')
    .map(|s| s.trim().to_string())
    .filter(|s| s.chars().count() > 20)
    .collect()
}

fn normalize_phrase(raw: &str) -> String {
  raw
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
    .collect::<String>()
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_input_yields_defaults() {
    let a = analyze("", "");
    assert_eq!(a.content_type, ContentType::GeneralInformational);
    assert_eq!(a.domain, Domain::General);
    assert!(a.key_concepts.is_empty());
    assert!(a.key_terms.is_empty());
    assert!(a.processes.is_empty());
    assert!(a.numerical_data.is_empty());
    assert!(a.main_points.is_empty());
  }

  #[test]
  fn unmatched_text_never_classifies_as_specific() {
    let a = analyze("plain words without category markers here", "untitled page");
    assert_eq!(a.content_type, ContentType::GeneralInformational);
    assert_eq!(a.domain, Domain::General);
  }

  #[test]
  fn algorithm_page_classifies_and_extracts_numbers() {
    let body = "The algorithm works by finding k=5 nearest points and \
                classifying by majority vote. Accuracy was 92%.";
    let a = analyze(body, "K-Nearest Neighbors Algorithm");
    assert_eq!(a.content_type, ContentType::TechnicalAlgorithm);
    assert!(a.numerical_data.iter().any(|n| n.contains("k=5")));
    assert!(a.numerical_data.iter().any(|n| n.contains("92%")));
    assert!(a.processes.iter().any(|p| p.contains("algorithm works")));
  }

  #[test]
  fn classification_priority_prefers_algorithm_over_news() {
    let body = "Breaking news reported today: a new sorting algorithm was published.";
    let a = analyze(body, "");
    assert_eq!(a.content_type, ContentType::TechnicalAlgorithm);
  }

  #[test]
  fn key_terms_require_repetition_and_skip_stop_words() {
    let body = "Gradient descent updates weights. Gradient steps shrink. \
                The the the should never appear.";
    let a = analyze(body, "");
    assert!(a.key_terms.contains(&"gradient".to_string()));
    assert!(!a.key_terms.iter().any(|t| t == "the"));
    assert!(a.key_terms.len() <= 5);
  }

  #[test]
  fn key_concepts_find_repeated_phrases() {
    let body = "Neural networks learn features. Neural networks generalize well. \
                Deep neural networks stack layers.";
    let a = analyze(body, "");
    assert!(a.key_concepts.iter().any(|c| c.contains("neural networks")));
    assert!(a.key_concepts.len() <= 8);
  }

  #[test]
  fn definitions_capture_term_and_body() {
    let body = "Photosynthesis is the process plants use to convert light into energy. \
                It powers nearly every food chain on Earth today.";
    let a = analyze(body, "");
    assert!(!a.definitions.is_empty());
    assert!(a.definitions[0].term.contains("Photosynthesis"));
    assert!(a.definitions[0].definition.contains("process"));
  }

  #[test]
  fn main_points_prefer_emphasis_sentences() {
    let body = "The key finding here is that caching wins by a wide margin. \
                Short filler. Another short one.";
    let a = analyze(body, "");
    assert_eq!(a.main_points.len(), 1);
    assert!(a.main_points[0].contains("key finding"));
  }

  #[test]
  fn numeric_extraction_respects_document_order_and_cap() {
    let body = "Use 2 cups, bake at 350°F for 25 minutes, rest 10 minutes, \
                serves 4 people, 1 tray, 3 racks, 9 extras.";
    let a = analyze(body, "");
    assert!(a.numerical_data.len() <= 6);
    assert!(a.numerical_data[0].contains('2'));
    assert!(a.numerical_data.iter().any(|n| n.contains("350")));
  }

  #[test]
  fn entities_skip_stop_listed_words() {
    let body = "The Turing Award went to Geoffrey Hinton in Toronto.";
    let a = analyze(body, "");
    assert!(a.entities.iter().any(|e| e.contains("Turing")));
    assert!(a.entities.len() <= 3);
    assert!(!a.entities.iter().any(|e| e == "The"));
  }
}
