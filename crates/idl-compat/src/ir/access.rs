//! Authorization declarations attached to commands.

/// A command's access-check declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCheck {
    /// One check and an optional privilege.
    Simple(SimpleAccessCheck),
    /// A list of checks and privileges, optionally grouped by aggregation stage.
    Complex(Vec<AccessCheckEntry>),
}

impl AccessCheck {
    pub fn kind(&self) -> &'static str {
        match self {
            AccessCheck::Simple(_) => "simple",
            AccessCheck::Complex(_) => "complex",
        }
    }
}

/// The `simple:` form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleAccessCheck {
    pub check: Option<String>,
    pub privilege: Option<Privilege>,
}

/// One entry of the `complex:` form: a bare check or a privilege, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCheckEntry {
    Check(String),
    Privilege(Privilege),
}

impl AccessCheckEntry {
    /// Aggregation stage the entry belongs to. Bare checks belong to none.
    pub fn agg_stage(&self) -> Option<&str> {
        match self {
            AccessCheckEntry::Check(_) => None,
            AccessCheckEntry::Privilege(p) => p.agg_stage.as_deref(),
        }
    }
}

/// A resource pattern and the actions allowed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    pub resource_pattern: String,
    pub action_types: Vec<String>,
    pub agg_stage: Option<String>,
}
