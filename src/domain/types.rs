//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (well-formed identifiers, dotted
//! field paths) so that once a value reaches the domain layer it can be
//! treated as trusted.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Provided uuid failed format validation.
    #[error("invalid uuid value")]
    InvalidUuid,
    /// Provided field path is not of the form `section.field`.
    #[error("invalid field path: {0}")]
    InvalidFieldPath(String),
}

/// Macro to generate lightweight newtypes for UUID-backed identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an existing UUID.
            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the raw UUID backing this identifier.
            pub const fn get(self) -> Uuid {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| TypeConstraintError::InvalidUuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(AgreementId, "Unique identifier for a lease agreement.");
id_newtype!(OutletId, "Unique identifier for an outlet.");
id_newtype!(WizardId, "Identifier of one upload wizard session.");

impl WizardId {
    /// Generates a fresh random session identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Reference to the entity whose activity log is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Agreement(AgreementId),
    Outlet(OutletId),
}

impl EntityRef {
    /// Plural collection segment used by the collaborator's URL scheme.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityRef::Agreement(_) => "agreements",
            EntityRef::Outlet(_) => "outlets",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            EntityRef::Agreement(id) => id.get(),
            EntityRef::Outlet(id) => id.get(),
        }
    }
}

/// Address of a single extracted field: `section.field`.
///
/// Neither segment may be empty or contain a dot, so the textual form
/// round-trips unambiguously.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    section: String,
    field: String,
}

fn validate_segment(segment: &str, raw: &str) -> Result<(), TypeConstraintError> {
    if segment.is_empty() || segment.contains('.') || segment.trim() != segment {
        return Err(TypeConstraintError::InvalidFieldPath(raw.to_string()));
    }
    Ok(())
}

impl FieldPath {
    /// Builds a path from its section and field keys.
    pub fn new<S, F>(section: S, field: F) -> Result<Self, TypeConstraintError>
    where
        S: Into<String>,
        F: Into<String>,
    {
        let section = section.into();
        let field = field.into();
        let raw = format!("{section}.{field}");
        validate_segment(&section, &raw)?;
        validate_segment(&field, &raw)?;
        Ok(Self { section, field })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.section, self.field)
    }
}

impl FromStr for FieldPath {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('.') {
            Some((section, field)) => Self::new(section, field),
            None => Err(TypeConstraintError::InvalidFieldPath(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for FieldPath {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}
