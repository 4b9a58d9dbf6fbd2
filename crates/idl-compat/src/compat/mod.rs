//! Backward-compatibility passes.
//!
//! The comparators walk the old and new IR side by side and push every
//! finding into an [`ErrorCollection`]. Only inconsistencies in the inputs
//! themselves (an old-side type that does not resolve, a struct that
//! contains itself) abort with a [`CheckerError`](crate::CheckerError).

mod access;
mod command;
mod context;
pub mod error_id;
mod errors;
pub mod exceptions;
mod fields;
mod pair;
mod position;
mod resolve;
mod special;
mod structs;
mod types;

pub use command::check_command;
pub use context::CompatContext;
pub use error_id::ErrorId;
pub use errors::{CompatError, CompatErrorRecord, ErrorCollection};
pub use exceptions::Exceptions;
pub use pair::{check_array_type, ArrayCheck, FieldCompatibility, FieldCompatibilityPair};
pub use position::{InputPosition, Position};
pub use resolve::{
    get_all_struct_fields, resolve_chained_type, resolve_type_ref, ResolvedType, ResolvedVariant,
};
pub use special::{
    check_error_reply, check_generic_arguments, BASIC_TYPES_FILE, ERROR_REPLY_STRUCT,
    GENERIC_ARGS_LIST, GENERIC_ARGUMENT_FILE, GENERIC_REPLY_FIELDS_LIST,
};
