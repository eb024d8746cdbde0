use url::Url;

#[must_use]
pub fn validate_url(url: &str) -> bool {
  Url::parse(url).is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_absolute_urls() {
    assert!(validate_url("https://cdn.example.com/media/clip.mp4"));
    assert!(validate_url("mongodb://localhost:27017"));
  }

  #[test]
  fn rejects_relative_or_garbage_input() {
    assert!(!validate_url("/media/clip.mp4"));
    assert!(!validate_url("not a url"));
  }
}
