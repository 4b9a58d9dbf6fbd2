//! Diagnostic types for internal error reporting.

mod error;

pub use error::CheckerError;
