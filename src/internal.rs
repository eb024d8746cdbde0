/// Restricts trait implementations to types declared in this crate.
pub trait Sealed {}
