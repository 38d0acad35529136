pub mod form;
pub mod vocab;

pub use form::{FieldError, RawForm, Submission};
pub use vocab::{Hour, Month, Neighborhood, UnknownChoice};
