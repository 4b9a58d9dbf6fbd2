//! Where a compared value sits, and the diagnostic ids that go with it.
//!
//! Every rule exists in up to three flavors (reply field, command parameter,
//! command type). The comparators are written once against [`Position`] and
//! pick the id at the point of reporting.

use super::error_id::ErrorId;

/// Context of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Inside a reply struct. New values must be a subset of old ones.
    Reply,
    /// Inside a command's parameters. New values must be a superset.
    CommandParameter,
    /// Inside the command type of a `namespace: type` command. Checked like
    /// a parameter.
    CommandType,
}

impl Position {
    pub fn is_command_input(self) -> bool {
        !matches!(self, Position::Reply)
    }

    /// Human label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Position::Reply => "reply field",
            Position::CommandParameter => "parameter",
            Position::CommandType => "command type",
        }
    }

    /// Exception-list key for a field at this position.
    pub fn key(self, command: &str, field: &str) -> String {
        match self {
            Position::Reply => format!("{}-reply-{}", command, field),
            Position::CommandParameter => format!("{}-param-{}", command, field),
            Position::CommandType => command.to_string(),
        }
    }

    fn pick(self, reply: ErrorId, parameter: ErrorId, command_type: ErrorId) -> ErrorId {
        match self {
            Position::Reply => reply,
            Position::CommandParameter => parameter,
            Position::CommandType => command_type,
        }
    }

    pub fn old_any(self) -> ErrorId {
        self.pick(
            ErrorId::OldReplyFieldBsonSerializationTypeAny,
            ErrorId::OldCommandParameterTypeBsonSerializationTypeAny,
            ErrorId::OldCommandTypeBsonSerializationTypeAny,
        )
    }

    pub fn new_any(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldBsonSerializationTypeAny,
            ErrorId::NewCommandParameterTypeBsonSerializationTypeAny,
            ErrorId::NewCommandTypeBsonSerializationTypeAny,
        )
    }

    pub fn any_not_allowed(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldBsonSerializationTypeAnyNotAllowed,
            ErrorId::CommandParameterBsonSerializationTypeAnyNotAllowed,
            ErrorId::CommandTypeBsonSerializationTypeAnyNotAllowed,
        )
    }

    pub fn cpp_type_not_equal(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldCppTypeNotEqual,
            ErrorId::CommandParameterCppTypeNotEqual,
            ErrorId::CommandCppTypeNotEqual,
        )
    }

    pub fn serializer_not_equal(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldSerializerNotEqual,
            ErrorId::CommandParameterSerializerNotEqual,
            ErrorId::CommandSerializerNotEqual,
        )
    }

    pub fn deserializer_not_equal(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldDeserializerNotEqual,
            ErrorId::CommandParameterDeserializerNotEqual,
            ErrorId::CommandDeserializerNotEqual,
        )
    }

    pub fn enum_or_struct(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldTypeEnumOrStruct,
            ErrorId::NewCommandParameterTypeEnumOrStruct,
            ErrorId::NewCommandTypeEnumOrStruct,
        )
    }

    pub fn not_struct(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldNotStruct,
            ErrorId::NewCommandParameterTypeNotStruct,
            ErrorId::NewCommandTypeNotStruct,
        )
    }

    pub fn not_enum(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldNotEnum,
            ErrorId::NewCommandParameterTypeNotEnum,
            ErrorId::NewCommandTypeNotEnum,
        )
    }

    pub fn invalid(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldTypeInvalid,
            ErrorId::NewCommandParameterTypeInvalid,
            ErrorId::NewCommandTypeInvalid,
        )
    }

    /// New side lost its variant shape.
    pub fn not_variant(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldVariantType,
            ErrorId::NewCommandParameterTypeNotVariant,
            ErrorId::NewCommandTypeNotVariant,
        )
    }

    /// Variant members moved in the forbidden direction.
    pub fn variant_incompatible(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldVariantTypeNotSubset,
            ErrorId::NewCommandParameterVariantTypeNotSuperset,
            ErrorId::NewCommandVariantTypeNotSuperset,
        )
    }

    /// Serialization tags or enum values moved in the forbidden direction.
    pub fn type_incompatible(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldNotSubset,
            ErrorId::CommandParameterTypeNotSuperset,
            ErrorId::CommandTypeNotSuperset,
        )
    }

    pub fn chained_type_incompatible(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyChainedTypeNotSubset,
            ErrorId::NewCommandParameterChainedTypeNotSuperset,
            ErrorId::NewCommandChainedTypeNotSuperset,
        )
    }

    pub fn contains_validator(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldContainsValidator,
            ErrorId::CommandParameterContainsValidator,
            ErrorId::CommandTypeContainsValidator,
        )
    }

    pub fn validators_not_equal(self) -> ErrorId {
        self.pick(
            ErrorId::ReplyFieldValidatorsNotEqual,
            ErrorId::CommandParameterValidatorsNotEqual,
            ErrorId::CommandTypeValidatorsNotEqual,
        )
    }

    pub fn field_unstable(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldUnstable,
            ErrorId::CommandParameterUnstable,
            ErrorId::NewCommandTypeFieldUnstable,
        )
    }

    pub fn field_missing(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldMissing,
            ErrorId::RemovedCommandParameter,
            ErrorId::NewCommandTypeFieldMissing,
        )
    }

    pub fn requires_stability(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldRequiresStability,
            ErrorId::NewParameterRequiresStability,
            ErrorId::NewCommandTypeFieldRequiresStability,
        )
    }

    pub fn changed_to_stable(self) -> ErrorId {
        self.pick(
            ErrorId::UnstableReplyFieldChangedToStable,
            ErrorId::UnstableCommandParamFieldChangedToStable,
            ErrorId::UnstableCommandTypeFieldChangedToStable,
        )
    }

    pub fn added_as_stable(self) -> ErrorId {
        self.pick(
            ErrorId::NewReplyFieldAddedAsStable,
            ErrorId::NewParamFieldAddedAsStable,
            ErrorId::NewCommandTypeFieldAddedAsStable,
        )
    }
}

/// The two command-input positions, for rules that have no reply flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPosition {
    Parameter,
    Type,
}

impl InputPosition {
    pub fn stable_required_no_default(self) -> ErrorId {
        match self {
            InputPosition::Parameter => ErrorId::CommandParameterStableRequiredNoDefault,
            InputPosition::Type => ErrorId::NewCommandTypeFieldStableRequiredNoDefault,
        }
    }

    pub fn required(self) -> ErrorId {
        match self {
            InputPosition::Parameter => ErrorId::CommandParameterRequired,
            InputPosition::Type => ErrorId::NewCommandTypeFieldRequired,
        }
    }

    pub fn added_required(self) -> ErrorId {
        match self {
            InputPosition::Parameter => ErrorId::AddedRequiredCommandParameter,
            InputPosition::Type => ErrorId::NewCommandTypeFieldAddedRequired,
        }
    }
}

impl From<InputPosition> for Position {
    fn from(position: InputPosition) -> Self {
        match position {
            InputPosition::Parameter => Position::CommandParameter,
            InputPosition::Type => Position::CommandType,
        }
    }
}

impl Position {
    /// The command-input flavor of this position, if it has one.
    pub fn as_input(self) -> Option<InputPosition> {
        match self {
            Position::Reply => None,
            Position::CommandParameter => Some(InputPosition::Parameter),
            Position::CommandType => Some(InputPosition::Type),
        }
    }
}
