pub mod figment;
pub mod sensitive;
pub mod text;
pub mod validator;

pub use sensitive::Sensitive;
