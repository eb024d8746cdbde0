use serde::{Deserialize, Serialize};

use crate::types::{Page, PageRequest};

pub mod boards;
pub mod comments;
pub mod events;
pub mod notifications;
pub mod users;

/// Standard envelope for paginated listings.
#[derive(Debug, Deserialize, Serialize)]
pub struct Paginated<T> {
  pub items: Vec<T>,
  pub current_page: u32,
  pub total_pages: u64,
  pub total_count: u64,
}

impl<T> Paginated<T> {
  #[must_use]
  pub fn new(page: Page<T>, request: PageRequest) -> Self {
    Self {
      current_page: request.page(),
      total_pages: page.total_pages(request.page_size()),
      total_count: page.total_count,
      items: page.items,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn envelope_carries_window_metadata() {
    let page = Page {
      items: vec!["a", "b", "c"],
      total_count: 10,
    };
    let request = PageRequest::new(2, 3);
    let envelope = Paginated::new(page, request);

    assert_eq!(2, envelope.current_page);
    assert_eq!(4, envelope.total_pages);
    assert_eq!(10, envelope.total_count);
    assert_eq!(3, envelope.items.len());
  }
}
