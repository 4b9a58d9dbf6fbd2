//! Checks for the two snapshot files every release ships at a fixed path.

use super::context::CompatContext;
use super::error_id::ErrorId;
use super::position::Position;
use super::structs::{check_struct, StructRef};
use crate::diagnostic::CheckerError;
use crate::ir::ParsedFile;

/// Relative path of the file declaring the shared error reply.
pub const BASIC_TYPES_FILE: &str = "mongo/idl/basic_types.idl";
/// Relative path of the generic arguments file.
pub const GENERIC_ARGUMENT_FILE: &str = "mongo/idl/generic_argument.idl";

pub const ERROR_REPLY_STRUCT: &str = "ErrorReply";
pub const GENERIC_ARGS_LIST: &str = "generic_args_api_v1";
pub const GENERIC_REPLY_FIELDS_LIST: &str = "generic_reply_fields_api_v1";

/// Command name recorded for diagnostics not tied to a command.
const NO_COMMAND: &str = "n/a";

/// Compares the `ErrorReply` struct as a reply.
pub fn check_error_reply(
    ctx: &mut CompatContext<'_>,
    old_file: &ParsedFile,
    new_file: &ParsedFile,
) -> Result<(), CheckerError> {
    let old_reply = old_file.symbols.get_struct(ERROR_REPLY_STRUCT);
    let new_reply = new_file.symbols.get_struct(ERROR_REPLY_STRUCT);

    match (old_reply, new_reply) {
        (Some(old), Some(new)) => check_struct(
            ctx,
            StructRef::new(old, old_file),
            StructRef::new(new, new_file),
            NO_COMMAND,
            Position::Reply,
        ),
        _ => {
            for (reply, file) in [(old_reply, old_file), (new_reply, new_file)] {
                if reply.is_none() {
                    ctx.add(
                        ErrorId::MissingErrorReplyStruct,
                        NO_COMMAND,
                        format!("'{}' is not defined in {}", ERROR_REPLY_STRUCT, BASIC_TYPES_FILE),
                        &file.path,
                    );
                }
            }
            Ok(())
        }
    }
}

/// Reports generic arguments and generic reply fields that the new
/// snapshot dropped. Each diagnostic is filed under the argument's name.
pub fn check_generic_arguments(
    ctx: &mut CompatContext<'_>,
    old_file: &ParsedFile,
    new_file: &ParsedFile,
) {
    let lists = [
        (
            old_file.generic_argument_list(GENERIC_ARGS_LIST),
            new_file.generic_argument_list(GENERIC_ARGS_LIST),
            ErrorId::GenericArgumentRemoved,
            "generic argument",
        ),
        (
            old_file.generic_reply_field_list(GENERIC_REPLY_FIELDS_LIST),
            new_file.generic_reply_field_list(GENERIC_REPLY_FIELDS_LIST),
            ErrorId::GenericArgumentRemovedReplyField,
            "generic reply field",
        ),
    ];

    for (old_list, new_list, error_id, label) in lists {
        let Some(old_list) = old_list else { continue };
        for name in &old_list.fields {
            let kept = new_list.is_some_and(|list| list.fields.contains(name));
            if !kept {
                ctx.add(
                    error_id,
                    name,
                    format!("{} '{}' was removed from '{}'", label, name, old_list.name),
                    &new_file.path,
                );
            }
        }
    }
}
