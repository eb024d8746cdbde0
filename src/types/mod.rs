pub mod error;
pub mod form;
pub mod id;
pub mod page;
pub mod validation;

pub use error::Error;
pub use id::Id;
pub use page::{Page, PageRequest};
