use serde::Deserialize;

/// Board-domain policy knobs.
#[derive(Debug, Default, Deserialize)]
pub struct Boards {
  /// Whether hard-deleting a board also hard-deletes its comments.
  /// Off by default; orphaned comments stay invisible either way
  /// since comment reads go through their board.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_BOARDS_CASCADE_COMMENTS_ON_DELETE`
  #[serde(default)]
  pub cascade_comments_on_delete: bool,
}
