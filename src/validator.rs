//! Relevance validation for quizzes against their source page.
//!
//! A quiz is rejected and regenerated from a fresh analysis when it has the
//! wrong shape, contains known generic filler phrases, or never references a
//! token from the page title or the opening of the page body. This is a
//! best-effort heuristic, not a semantic check: false positives and false
//! negatives are expected and acceptable.

use tracing::{debug, info, instrument};

use crate::analysis;
use crate::domain::{PageContent, QuizItem};
use crate::quizgen::{self, QUIZ_LEN};

/// Phrases that mark a quiz as generic boilerplate rather than page-derived.
const GENERIC_PHRASES: &[&str] = &[
  "subscribe",
  "information management",
  "general information processing",
  "data analysis methods",
];

const TITLE_TOKEN_MIN_CHARS: usize = 3;
const BODY_TOKEN_MIN_CHARS: usize = 4;
const BODY_TOKEN_WINDOW: usize = 50;

/// Return the quiz unchanged when it passes the relevance heuristic,
/// otherwise a fresh heuristic quiz built from the page itself. Regeneration
/// happens at most once per call, so there is no regeneration cycle.
#[instrument(level = "debug", skip(quiz, page), fields(title = %page.title, items = quiz.len()))]
pub fn validate(quiz: Vec<QuizItem>, page: &PageContent) -> Vec<QuizItem> {
  if is_relevant(&quiz, page) {
    debug!(target: "quiz", "Quiz accepted as page-relevant");
    return quiz;
  }
  info!(target: "quiz", title = %page.title, "Quiz rejected as generic/off-page; regenerating from content");
  regenerate(page)
}

/// Build the content-derived quiz directly from the page.
pub fn regenerate(page: &PageContent) -> Vec<QuizItem> {
  let analysis = analysis::analyze(&page.body, &page.title);
  quizgen::synthesize(&analysis, &page.body, &page.title)
}

/// The relevance heuristic itself, exposed so callers can check a quiz
/// without triggering regeneration.
pub fn is_relevant(quiz: &[QuizItem], page: &PageContent) -> bool {
  if quiz.len() != QUIZ_LEN {
    return false;
  }
  if quiz.iter().any(|q| q.question().trim().is_empty()) {
    return false;
  }

  // Generic filler is detected on question/options text only; answers may
  // legitimately quote page text that happens to contain a listed phrase.
  let has_generic = quiz.iter().any(|q| {
    let text = question_and_options_text(q);
    GENERIC_PHRASES.iter().any(|phrase| text.contains(phrase))
  });
  if has_generic {
    return false;
  }

  // The page-reference check only applies when there is a page to reference.
  if page.title.is_empty() || page.body.is_empty() {
    return true;
  }

  let title_lower = page.title.to_lowercase();
  let title_tokens: Vec<&str> = title_lower
    .split_whitespace()
    .filter(|w| w.chars().count() > TITLE_TOKEN_MIN_CHARS)
    .collect();
  let body_lower = page.body.to_lowercase();
  let body_tokens: Vec<&str> = body_lower
    .split_whitespace()
    .take(BODY_TOKEN_WINDOW)
    .filter(|w| w.chars().count() > BODY_TOKEN_MIN_CHARS)
    .collect();

  quiz.iter().any(|q| {
    let text = q.combined_text();
    title_tokens.iter().any(|w| text.contains(*w))
      || body_tokens.iter().any(|w| text.contains(*w))
  })
}

fn question_and_options_text(item: &QuizItem) -> String {
  match item {
    QuizItem::MultipleChoice { question, options, .. } => {
      format!("{} {}", question, options.join(" ")).to_lowercase()
    }
    QuizItem::FreeText { question, .. } => question.to_lowercase(),
  }
}
