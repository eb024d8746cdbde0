pub mod board;
pub mod comment;
pub mod event;
pub mod notification;
pub mod session;
pub mod user;

pub use board::{Board, BoardVideo, BoardView};
pub use comment::{Comment, CommentVote, VoteDirection};
pub use event::{Event, EventView};
pub use notification::{Notification, NotificationKind};
pub use session::Session;
pub use user::User;
