use heck::ToKebabCase;
use once_cell::sync::Lazy;
use regex::Regex;

// `\p{L}` keeps non-ASCII letters in, emoji and punctuation out
static HASHTAG_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"#[\p{L}\w]+").expect("hashtag pattern must compile"));

/// Extracts `#`-prefixed tokens from free text, deduplicated and in
/// order of first appearance.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
  let mut tags: Vec<String> = Vec::new();
  for matched in HASHTAG_REGEX.find_iter(text) {
    let tag = matched.as_str();
    if !tags.iter().any(|existing| existing == tag) {
      tags.push(tag.to_owned());
    }
  }
  tags
}

/// Derives a lowercase, URL-safe slug from display text. Routing and
/// display only, never a uniqueness key.
#[must_use]
pub fn slugify(text: &str) -> String {
  text.to_kebab_case()
}
