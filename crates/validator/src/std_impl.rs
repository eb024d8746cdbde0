use crate::HasLength;
use std::borrow::Cow;

// Strings measure in characters, not bytes, so length bounds behave
// the same for ASCII and non-ASCII input.
impl HasLength for str {
  fn length(&self) -> usize {
    self.chars().count()
  }
}

impl HasLength for String {
  fn length(&self) -> usize {
    self.as_str().length()
  }
}

impl HasLength for Cow<'_, str> {
  fn length(&self) -> usize {
    self.as_ref().length()
  }
}

impl<T> HasLength for [T] {
  fn length(&self) -> usize {
    self.len()
  }
}

impl<T> HasLength for Vec<T> {
  fn length(&self) -> usize {
    self.as_slice().length()
  }
}

impl<T: HasLength + ?Sized> HasLength for &T {
  fn length(&self) -> usize {
    (**self).length()
  }
}
