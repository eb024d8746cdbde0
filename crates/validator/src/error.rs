use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Serialized key that holds the messages of a field or value.
const MESSAGES_KEY: &str = "_errors";

/// Accumulated validation failures for a value.
///
/// The variants mirror the shape of the value they describe: a struct
/// maps field names to nested errors, a plain value carries a list of
/// human-readable messages, and a list carries one optional error per
/// element (in element order, `None` for elements that passed).
#[derive(Clone, PartialEq, Eq)]
pub enum ValidateError {
  Fields(IndexMap<Cow<'static, str>, ValidateError>),
  Messages(Vec<Cow<'static, str>>),
  Slice(Vec<Option<ValidateError>>),
}

impl ValidateError {
  #[must_use]
  pub fn field_builder() -> FieldBuilder {
    FieldBuilder::default()
  }

  #[must_use]
  pub fn msg_builder() -> MessageBuilder {
    MessageBuilder::default()
  }

  #[must_use]
  pub fn slice_builder() -> SliceBuilder {
    SliceBuilder::default()
  }

  /// Whether no failure was recorded at any depth.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Fields(fields) => fields.is_empty(),
      Self::Messages(messages) => messages.is_empty(),
      Self::Slice(slice) => slice.iter().all(Option::is_none),
    }
  }

  /// Turns an empty error into `Ok(())`, anything else into `Err(self)`.
  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(self)
    }
  }
}

/// Collects messages for a single field or value.
#[derive(Debug, Default)]
pub struct MessageBuilder {
  messages: Vec<Cow<'static, str>>,
}

impl MessageBuilder {
  pub fn insert(&mut self, message: impl Into<Cow<'static, str>>) {
    self.messages.push(message.into());
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Messages(self.messages)
  }
}

/// Collects per-element errors for a list value.
#[derive(Debug, Default)]
pub struct SliceBuilder {
  slice: Vec<Option<ValidateError>>,
}

impl SliceBuilder {
  pub fn insert(&mut self, entry: Option<ValidateError>) {
    // empty errors count as a pass so is_empty stays truthful
    match entry {
      Some(error) if error.is_empty() => self.slice.push(None),
      entry => self.slice.push(entry),
    }
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Slice(self.slice)
  }
}

/// Collects named field errors, skipping fields that passed.
#[derive(Debug, Default)]
pub struct FieldBuilder {
  fields: IndexMap<Cow<'static, str>, ValidateError>,
}

impl FieldBuilder {
  pub fn insert(&mut self, field: impl Into<Cow<'static, str>>, error: ValidateError) {
    if !error.is_empty() {
      self.fields.insert(field.into(), error);
    }
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Fields(self.fields)
  }
}

impl fmt::Debug for ValidateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Fields(fields) => {
        let mut map = f.debug_map();
        for (field, error) in fields {
          map.entry(field, error);
        }
        map.finish()
      }
      Self::Messages(messages) => f.debug_map().entry(&MESSAGES_KEY, messages).finish(),
      Self::Slice(slice) => f.debug_list().entries(slice).finish(),
    }
  }
}

impl fmt::Display for ValidateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Invalid data occurred")
  }
}

impl std::error::Error for ValidateError {}

impl Serialize for ValidateError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match self {
      Self::Fields(fields) => {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (field, error) in fields {
          map.serialize_entry(field, error)?;
        }
        map.end()
      }
      Self::Messages(messages) => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(MESSAGES_KEY, messages)?;
        map.end()
      }
      Self::Slice(slice) => {
        let mut seq = serializer.serialize_seq(Some(slice.len()))?;
        for entry in slice {
          seq.serialize_element(entry)?;
        }
        seq.end()
      }
    }
  }
}

impl<'de> Deserialize<'de> for ValidateError {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct ErrorVisitor;

    impl<'de> Visitor<'de> for ErrorVisitor {
      type Value = ValidateError;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation error data")
      }

      fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
      where
        A: de::MapAccess<'de>,
      {
        let mut fields = IndexMap::new();
        while let Some(key) = map.next_key::<String>()? {
          if key == MESSAGES_KEY && fields.is_empty() {
            let messages = map.next_value::<Vec<String>>()?;
            return Ok(ValidateError::Messages(
              messages.into_iter().map(Cow::Owned).collect(),
            ));
          }
          let error = map.next_value::<ValidateError>()?;
          fields.insert(Cow::Owned(key), error);
        }
        Ok(ValidateError::Fields(fields))
      }

      fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
      where
        A: de::SeqAccess<'de>,
      {
        let mut slice = Vec::new();
        while let Some(entry) = seq.next_element::<Option<ValidateError>>()? {
          slice.push(entry);
        }
        Ok(ValidateError::Slice(slice))
      }
    }

    deserializer.deserialize_any(ErrorVisitor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Validate;
  use serde_test::{assert_tokens, Token};

  struct Draft {
    title: String,
    tags: Vec<String>,
  }

  impl Validate for Draft {
    fn validate(&self) -> Result<(), ValidateError> {
      let mut fields = ValidateError::field_builder();
      fields.insert("title", {
        let mut msg = ValidateError::msg_builder();
        if self.title.trim().is_empty() {
          msg.insert("Title is required");
        }
        if self.title.len() > 60 {
          msg.insert("Title is too long");
        }
        msg.build()
      });
      fields.insert("tags", {
        let mut slice = ValidateError::slice_builder();
        for tag in &self.tags {
          if tag.starts_with('#') {
            slice.insert(None);
          } else {
            let mut msg = ValidateError::msg_builder();
            msg.insert("Tag must start with '#'");
            slice.insert(Some(msg.build()));
          }
        }
        slice.build()
      });
      fields.build().into_result()
    }
  }

  fn must_fail(value: &impl Validate) -> ValidateError {
    match value.validate() {
      Ok(()) => panic!("expected validation to fail"),
      Err(error) => error,
    }
  }

  #[test]
  fn passing_value_yields_ok() {
    let draft = Draft {
      title: "hello world".into(),
      tags: vec!["#rust".into()],
    };
    assert!(draft.validate().is_ok());
  }

  #[test]
  fn reports_every_failing_field() {
    let draft = Draft {
      title: String::new(),
      tags: vec!["#ok".into(), "broken".into()],
    };
    let error = must_fail(&draft);
    let ValidateError::Fields(fields) = &error else {
      panic!("expected field errors, got: {error:?}");
    };
    assert_eq!(fields.len(), 2);
    assert!(fields.contains_key("title"));
    assert!(fields.contains_key("tags"));
  }

  #[test]
  fn empty_builders_collapse_to_ok() {
    let mut fields = ValidateError::field_builder();
    fields.insert("anything", ValidateError::msg_builder().build());
    assert!(fields.build().into_result().is_ok());

    let mut slice = ValidateError::slice_builder();
    slice.insert(None);
    slice.insert(Some(ValidateError::msg_builder().build()));
    assert!(slice.build().into_result().is_ok());
  }

  #[test]
  fn debug_output_mirrors_the_shape() {
    let draft = Draft {
      title: String::new(),
      tags: vec!["#ok".into(), "broken".into()],
    };
    let error = must_fail(&draft);
    assert_eq!(
      format!("{error:?}"),
      "{\"title\": {\"_errors\": [\"Title is required\"]}, \
       \"tags\": [None, Some({\"_errors\": [\"Tag must start with '#'\"]})]}"
    );
  }

  #[test]
  fn serde_impl() {
    let draft = Draft {
      title: String::new(),
      tags: vec!["broken".into()],
    };
    let error = must_fail(&draft);
    assert_tokens(
      &error,
      &[
        Token::Map { len: Some(2) },
        Token::Str("title"),
        Token::Map { len: Some(1) },
        Token::Str("_errors"),
        Token::Seq { len: Some(1) },
        Token::Str("Title is required"),
        Token::SeqEnd,
        Token::MapEnd,
        Token::Str("tags"),
        Token::Seq { len: Some(1) },
        Token::Some,
        Token::Map { len: Some(1) },
        Token::Str("_errors"),
        Token::Seq { len: Some(1) },
        Token::Str("Tag must start with '#'"),
        Token::SeqEnd,
        Token::MapEnd,
        Token::SeqEnd,
        Token::MapEnd,
      ],
    );
  }
}
