use mongodb::bson::oid::ObjectId;
use mongodb::bson::Bson;
use once_cell::sync::Lazy;
use serde::de::{Error as DeError, Unexpected};
use std::{
  cmp::Ordering,
  fmt::{Debug, Display},
  hash::Hash,
  marker::PhantomData,
  str::FromStr,
};
use thiserror::Error;

use self::marker::Marker;

pub mod marker;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Id<T: Marker> {
  value: ObjectId,
  phantom: PhantomData<T>,
}

impl<T: Marker> Id<T> {
  /// Generates a fresh identifier.
  #[must_use]
  pub fn new() -> Self {
    Self::from_object_id(ObjectId::new())
  }

  #[must_use]
  pub const fn from_object_id(value: ObjectId) -> Self {
    Self {
      value,
      phantom: PhantomData,
    }
  }

  /// Parses a 24 character hex string into an ID.
  ///
  /// The input must survive a decode/encode round trip, so uppercase
  /// hex digits are rejected even though they decode fine.
  #[must_use]
  pub fn parse(input: &str) -> Option<Self> {
    let value = ObjectId::parse_str(input).ok()?;
    if value.to_hex() == input {
      Some(Self::from_object_id(value))
    } else {
      None
    }
  }

  #[must_use]
  pub const fn into_object_id(self) -> ObjectId {
    self.value
  }

  #[must_use]
  pub fn to_hex(&self) -> String {
    self.value.to_hex()
  }

  #[must_use]
  pub const fn cast<M: Marker>(self) -> Id<M> {
    Id {
      value: self.value,
      phantom: PhantomData,
    }
  }

  /// Creation time embedded in the identifier.
  #[must_use]
  pub fn timestamp(self) -> mongodb::bson::DateTime {
    self.value.timestamp()
  }
}

impl<T: Marker> Default for Id<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug, Error)]
#[error("invalid object id")]
pub struct ParseIdError;

impl<T: Marker> FromStr for Id<T> {
  type Err = ParseIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s).ok_or(ParseIdError)
  }
}

impl<T: Marker> Debug for Id<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use heck::ToSnakeCase;
    static MARKER_MODULE: Lazy<String> = Lazy::new(|| {
      format!(
        "{}::types::id::marker::",
        env!("CARGO_PKG_NAME").to_snake_case()
      )
    });

    // This is to assume that all ID markers are defined in `marker` module
    let type_name = std::any::type_name::<T>();
    let type_name = if type_name.starts_with(&*MARKER_MODULE) {
      type_name.split("::").last().unwrap_or(type_name)
    } else {
      type_name
    };
    write!(f, "Id::<{type_name}>({})", self.value.to_hex())
  }
}

impl<T: Marker> Display for Id<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.value.to_hex(), f)
  }
}

impl<T: Marker> Hash for Id<T> {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    state.write(&self.value.bytes());
  }
}

// Manual impls so markers do not need to be Ord themselves. The
// byte order of an object id starts with its timestamp, so this
// sorts oldest first.
impl<T: Marker + Eq> PartialOrd for Id<T> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<T: Marker + Eq> Ord for Id<T> {
  fn cmp(&self, other: &Self) -> Ordering {
    self.value.bytes().cmp(&other.value.bytes())
  }
}

impl<'de, T: Marker> serde::Deserialize<'de> for Id<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    struct Visitor<T: Marker>(PhantomData<T>);

    impl<'de, T: Marker> serde::de::Visitor<'de> for Visitor<T> {
      type Value = Id<T>;

      fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a 24 character hex object id")
      }

      fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
      where
        E: DeError,
      {
        Id::parse(v).ok_or_else(|| {
          DeError::invalid_value(Unexpected::Str(v), &"a 24 character hex object id")
        })
      }

      // the `{"$oid": "..."}` form emitted by the bson serializer
      fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
      where
        A: serde::de::MapAccess<'de>,
      {
        let Some((key, value)) = map.next_entry::<String, String>()? else {
          return Err(DeError::invalid_length(0, &"a single \"$oid\" entry"));
        };
        if key != "$oid" {
          return Err(DeError::unknown_field(&key, &["$oid"]));
        }
        self.visit_str(&value)
      }
    }

    deserializer.deserialize_any(Visitor(PhantomData))
  }
}

impl<T: Marker> serde::Serialize for Id<T> {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    // delegating keeps ids stored as real object ids in bson
    self.value.serialize(serializer)
  }
}

impl<T: Marker> From<Id<T>> for Bson {
  fn from(id: Id<T>) -> Self {
    Bson::ObjectId(id.into_object_id())
  }
}
