//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Truncate to at most `max` characters, appending `...` when anything was cut.
/// Counts chars, not bytes, so multi-byte input never panics.
pub fn truncate_chars(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    return s.to_string();
  }
  let cut: String = s.chars().take(max).collect();
  format!("{}...", cut)
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
#[allow(dead_code)]
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_leaves_short_strings_alone() {
    assert_eq!(truncate_chars("short", 50), "short");
  }

  #[test]
  fn truncate_cuts_on_char_boundary() {
    assert_eq!(truncate_chars("température élevée", 7), "tempéra...");
  }

  #[test]
  fn fill_template_replaces_all_keys() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "1"), ("b", "2")]);
    assert_eq!(out, "1 and 2 and 1");
  }
}
