use crate::internal::Sealed;

macro_rules! markers {
  { $( $ident:ident, )* } => {$(
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct $ident;
    impl Sealed for $ident {}
    impl Marker for $ident {}
  )*};
}

markers! {
  AnyMarker,
  BoardMarker,
  CommentMarker,
  EventMarker,
  NotificationMarker,
  SessionMarker,
  UserMarker,
}

/// Restricts which types may brand an [Id] so identifiers of
/// different aggregates cannot be mixed up.
///
/// [Id]: super::Id
pub trait Marker: Sealed {}
