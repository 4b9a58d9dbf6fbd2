//! Stable diagnostic identifiers.
//!
//! Release gating pins rules to these codes, so a code is never reassigned
//! once published. New kinds get the next free number.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::diagnostic::CheckerError;

macro_rules! error_ids {
    ($($(#[$meta:meta])* $variant:ident => $code:literal,)+) => {
        /// Kind of a compatibility diagnostic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ErrorId {
            $($(#[$meta])* $variant,)+
        }

        impl ErrorId {
            /// Every known id, in declaration order.
            pub const ALL: &'static [ErrorId] = &[$(ErrorId::$variant,)+];

            /// The published `ID####` code.
            pub fn code(self) -> &'static str {
                match self {
                    $(ErrorId::$variant => $code,)+
                }
            }

            /// The variant name, used when reporting a collision.
            pub fn name(self) -> &'static str {
                match self {
                    $(ErrorId::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

error_ids! {
    // Command lifecycle
    InvalidApiVersion => "ID0001",
    DuplicateCommandName => "ID0002",
    RemovedCommand => "ID0003",

    // Reply fields
    NewReplyFieldUnstable => "ID0004",
    NewReplyFieldOptional => "ID0005",
    NewReplyFieldMissing => "ID0006",
    NewReplyFieldNotStruct => "ID0007",
    NewReplyFieldNotEnum => "ID0008",
    OldReplyFieldBsonSerializationTypeAny => "ID0009",
    NewReplyFieldBsonSerializationTypeAny => "ID0010",
    NewReplyFieldTypeEnumOrStruct => "ID0011",
    NewReplyFieldTypeInvalid => "ID0012",
    ReplyFieldNotSubset => "ID0013",

    NewNamespaceIncompatible => "ID0014",

    // Command type (typed namespace)
    CommandTypeNotSuperset => "ID0015",
    NewCommandTypeInvalid => "ID0016",
    OldCommandTypeBsonSerializationTypeAny => "ID0017",
    NewCommandTypeBsonSerializationTypeAny => "ID0018",
    NewCommandTypeFieldMissing => "ID0019",
    NewCommandTypeFieldRequired => "ID0020",
    NewCommandTypeFieldUnstable => "ID0021",
    NewCommandTypeNotStruct => "ID0022",
    NewCommandTypeNotEnum => "ID0023",
    NewCommandTypeEnumOrStruct => "ID0024",

    MissingErrorReplyStruct => "ID0025",

    NewReplyFieldVariantType => "ID0026",
    NewReplyFieldVariantTypeNotSubset => "ID0027",

    // Command parameters
    RemovedCommandParameter => "ID0028",
    AddedRequiredCommandParameter => "ID0029",
    CommandParameterUnstable => "ID0030",
    CommandParameterStableRequiredNoDefault => "ID0031",
    CommandParameterRequired => "ID0032",
    OldCommandParameterTypeBsonSerializationTypeAny => "ID0033",
    NewCommandParameterTypeBsonSerializationTypeAny => "ID0034",
    NewCommandParameterTypeNotStruct => "ID0035",
    NewCommandParameterTypeNotEnum => "ID0036",
    NewCommandParameterTypeEnumOrStruct => "ID0037",
    NewCommandParameterTypeInvalid => "ID0038",
    CommandParameterTypeNotSuperset => "ID0039",

    // Validators
    ReplyFieldContainsValidator => "ID0040",
    CommandParameterContainsValidator => "ID0041",
    CommandParameterValidatorsNotEqual => "ID0042",
    CommandTypeContainsValidator => "ID0043",
    CommandTypeValidatorsNotEqual => "ID0044",

    NewCommandTypeFieldStableRequiredNoDefault => "ID0045",
    NewCommandTypeFieldAddedRequired => "ID0046",

    // 'any' allow list
    ReplyFieldBsonSerializationTypeAnyNotAllowed => "ID0047",
    CommandParameterBsonSerializationTypeAnyNotAllowed => "ID0048",
    CommandTypeBsonSerializationTypeAnyNotAllowed => "ID0049",

    // cpp_type
    CommandCppTypeNotEqual => "ID0050",
    CommandParameterCppTypeNotEqual => "ID0051",
    ReplyFieldCppTypeNotEqual => "ID0052",

    // Variants (command input)
    NewCommandTypeNotVariant => "ID0053",
    NewCommandParameterTypeNotVariant => "ID0054",
    NewCommandVariantTypeNotSuperset => "ID0055",
    NewCommandParameterVariantTypeNotSuperset => "ID0056",

    ReplyFieldValidatorsNotEqual => "ID0057",

    // Access checks
    CheckNotEqual => "ID0058",
    ResourcePatternNotEqual => "ID0059",
    NewActionTypesNotSubset => "ID0060",

    TypeNotArray => "ID0061",

    AccessCheckTypeNotEqual => "ID0062",
    NewComplexChecksNotSubset => "ID0063",
    NewComplexPrivilegesNotSubset => "ID0064",
    NewAdditionalComplexAccessCheck => "ID0065",
    RemovedAccessCheckField => "ID0066",
    AddedAccessCheckField => "ID0067",

    CommandStrictTrueError => "ID0068",

    // Generic arguments
    GenericArgumentRemoved => "ID0069",
    GenericArgumentRemovedReplyField => "ID0070",

    // Serializers
    CommandSerializerNotEqual => "ID0071",
    CommandParameterSerializerNotEqual => "ID0072",
    ReplyFieldSerializerNotEqual => "ID0073",
    CommandDeserializerNotEqual => "ID0074",
    CommandParameterDeserializerNotEqual => "ID0075",
    ReplyFieldDeserializerNotEqual => "ID0076",

    // Stability declarations
    NewReplyFieldRequiresStability => "ID0077",
    NewParameterRequiresStability => "ID0078",
    NewCommandTypeFieldRequiresStability => "ID0079",

    // Chained types
    NewReplyChainedTypeNotSubset => "ID0080",
    NewCommandChainedTypeNotSuperset => "ID0081",
    NewCommandParameterChainedTypeNotSuperset => "ID0082",

    // Reviewed stability
    UnstableReplyFieldChangedToStable => "ID0083",
    UnstableCommandParamFieldChangedToStable => "ID0084",
    UnstableCommandTypeFieldChangedToStable => "ID0085",
    NewReplyFieldAddedAsStable => "ID0086",
    NewParamFieldAddedAsStable => "ID0087",
    NewCommandTypeFieldAddedAsStable => "ID0088",
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ErrorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Verifies that no two ids share a code.
///
/// Runs before every check so a bad edit to the table above fails loudly
/// instead of producing ambiguous reports.
pub fn verify_unique_codes() -> Result<(), CheckerError> {
    verify_codes(ErrorId::ALL.iter().map(|id| (id.name(), id.code())))
}

fn verify_codes<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), CheckerError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (name, code) in entries {
        if let Some(first) = seen.insert(code, name) {
            return Err(CheckerError::DuplicateErrorId {
                id: code.to_string(),
                first: first.to_string(),
                second: name.to_string(),
            });
        }
    }
    Ok(())
}
