use thiserror::Error;

mod auth;
mod boards;
mod database;
mod server;

pub use auth::Auth;
pub use boards::Boards;
pub use database::Database;
pub use server::Server;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
