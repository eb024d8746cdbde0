#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod app;
pub mod config;
pub mod crypto;
pub mod database;
pub mod http;
pub mod notify;
pub mod schema;
pub mod services;
pub mod store;
pub mod types;
pub mod util;

pub use app::App;

pub(crate) mod internal;
