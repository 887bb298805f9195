//! Error types for contract validation.

use std::fmt;
use thiserror::Error;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a validated JSON document.
///
/// Renders as `$` for the document root, otherwise as dotted keys with
/// bracketed array indices, for example `card.members[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Returns the path of the document root.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path of a named child field.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Returns the path of an array element.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns whether this path denotes the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return formatter.write_str("$");
        }

        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if position == 0 => formatter.write_str(key)?,
                PathSegment::Key(key) => write!(formatter, ".{key}")?,
                PathSegment::Index(index) => write!(formatter, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Classification of a contract validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The value is not a well-formed Trello identifier.
    #[error("'{0}' is not a well-formed Trello identifier")]
    MalformedIdentifier(String),

    /// A required field was omitted.
    #[error("required field is missing")]
    MissingField,

    /// A field is not declared by the contract.
    #[error("field is not part of the contract")]
    UnknownField,

    /// The value has the wrong JSON type.
    #[error("expected {expected}")]
    InvalidType {
        /// Human-readable name of the expected type.
        expected: &'static str,
    },

    /// The string is not one of the declared enumeration literals.
    #[error("'{value}' is not one of [{}]", .allowed.join(", "))]
    InvalidEnumValue {
        /// Rejected value.
        value: String,
        /// Declared literals.
        allowed: Vec<String>,
    },

    /// The integer is below the declared minimum.
    #[error("{actual} is below the minimum of {minimum}")]
    BelowMinimum {
        /// Declared minimum.
        minimum: i64,
        /// Rejected value.
        actual: i64,
    },

    /// The string is empty or whitespace-only.
    #[error("value must not be empty")]
    EmptyString,

    /// The string is not an RFC 3339 date-time.
    #[error("'{0}' is not an ISO 8601 date-time")]
    InvalidDateTime(String),

    /// The same identifier appears in both halves of an add/remove pair.
    #[error("identifier {id} also appears in '{other}'")]
    ConflictingRelationChange {
        /// Name of the paired field holding the same identifier.
        other: String,
        /// Conflicting identifier.
        id: String,
    },

    /// A schema-valid document could not be decoded into its typed form.
    #[error("document could not be decoded: {0}")]
    Undecodable(String),
}

/// A contract validation failure with the failing field path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid value at '{path}': {kind}")]
pub struct ValidationError {
    path: FieldPath,
    kind: ValidationErrorKind,
}

impl ValidationError {
    /// Creates a validation error at the given path.
    #[must_use]
    pub const fn new(path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self { path, kind }
    }

    /// Creates a validation error located at the document root.
    #[must_use]
    pub const fn at_root(kind: ValidationErrorKind) -> Self {
        Self::new(FieldPath::root(), kind)
    }

    /// Returns the failing field path.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}

/// Error returned when parsing a Trello identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is not a well-formed Trello identifier")]
pub struct ParseTrelloIdError(pub String);

impl From<ParseTrelloIdError> for ValidationErrorKind {
    fn from(error: ParseTrelloIdError) -> Self {
        Self::MalformedIdentifier(error.0)
    }
}
