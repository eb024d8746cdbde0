pub const DEFAULT_PAGE_SIZE: u32 = 9;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based pagination window with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page: u32,
  page_size: u32,
}

impl PageRequest {
  #[must_use]
  pub fn new(page: u32, page_size: u32) -> Self {
    Self {
      page: page.max(1),
      page_size: page_size.clamp(1, MAX_PAGE_SIZE),
    }
  }

  #[must_use]
  pub const fn page(self) -> u32 {
    self.page
  }

  #[must_use]
  pub const fn page_size(self) -> u32 {
    self.page_size
  }

  /// Documents to skip before this window starts.
  #[must_use]
  pub fn skip(self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.page_size)
  }

  #[must_use]
  pub fn limit(self) -> i64 {
    i64::from(self.page_size)
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self::new(1, DEFAULT_PAGE_SIZE)
  }
}

/// One page of results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total_count: u64,
}

impl<T> Page<T> {
  #[must_use]
  pub const fn empty() -> Self {
    Self {
      items: Vec::new(),
      total_count: 0,
    }
  }

  #[must_use]
  pub fn total_pages(&self, page_size: u32) -> u64 {
    self.total_count.div_ceil(u64::from(page_size.max(1)))
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items: self.items.into_iter().map(f).collect(),
      total_count: self.total_count,
    }
  }
}
