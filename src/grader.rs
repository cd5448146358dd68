//! Free-text answer grading by token-overlap fuzzy matching.

/// Grade a free-text answer against the reference answer.
///
/// Exact match after normalization passes. Otherwise each reference token
/// longer than two characters counts as matched when it contains, or is
/// contained in, any user token; the answer passes when matched tokens
/// exceed 60% of all reference tokens. An empty reference always fails
/// (there is nothing to match against).
pub fn grade(user_answer: &str, reference_answer: &str) -> bool {
  let user = user_answer.trim().to_lowercase();
  let reference = reference_answer.trim().to_lowercase();

  let reference_tokens: Vec<&str> = reference.split_whitespace().collect();
  if reference_tokens.is_empty() {
    return false;
  }

  if user == reference {
    return true;
  }

  let user_tokens: Vec<&str> = user.split_whitespace().collect();
  let matches = reference_tokens
    .iter()
    .filter(|word| {
      word.chars().count() > 2
        && user_tokens
          .iter()
          .any(|u| u.contains(*word) || word.contains(u))
    })
    .count();

  matches as f64 / reference_tokens.len() as f64 > 0.6
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identical_answers_pass() {
    assert!(grade("majority vote", "majority vote"));
  }

  #[test]
  fn case_and_whitespace_variations_pass() {
    assert!(grade("  Majority VOTE ", "majority vote"));
  }

  #[test]
  fn empty_reference_always_fails() {
    assert!(!grade("anything", ""));
    assert!(!grade("", ""));
    assert!(!grade("anything", "   "));
  }

  #[test]
  fn strong_token_overlap_passes() {
    assert!(grade(
      "classifying nearby points by majority vote",
      "classifying by majority vote"
    ));
  }

  #[test]
  fn unrelated_answer_fails() {
    assert!(!grade("bake the bread at low heat", "classifying by majority vote"));
  }

  #[test]
  fn partial_substring_tokens_count() {
    // "classify" is a substring of the reference token "classifying".
    assert!(grade("classify with majority vote", "classifying majority vote"));
  }
}
