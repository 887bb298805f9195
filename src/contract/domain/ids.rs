//! Trello identifier type.

use super::ParseTrelloIdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of every identifier issued by Trello.
const TRELLO_ID_LENGTH: usize = 24;

/// Opaque identifier issued by Trello for boards, lists, cards, members,
/// labels, comments, and webhooks.
///
/// Identifiers are never minted by the contract layer. They are accepted
/// from remote responses or caller input and validated on construction,
/// including during deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrelloId(String);

impl TrelloId {
    /// Regular expression equivalent of the accepted shape, published in
    /// generated JSON Schemas.
    pub const PATTERN: &'static str = "^[0-9a-fA-F]{24}$";

    /// Creates a validated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ParseTrelloIdError`] unless the value is exactly 24 ASCII
    /// hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ParseTrelloIdError> {
        let candidate = value.into();
        if !Self::is_well_formed(&candidate) {
            return Err(ParseTrelloIdError(candidate));
        }
        Ok(Self(candidate))
    }

    /// Returns whether `value` has the canonical identifier shape.
    #[must_use]
    pub fn is_well_formed(value: &str) -> bool {
        value.len() == TRELLO_ID_LENGTH
            && value
                .chars()
                .all(|character| character.is_ascii_hexdigit())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrelloId {
    type Error = ParseTrelloIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrelloId> for String {
    fn from(id: TrelloId) -> Self {
        id.0
    }
}

impl FromStr for TrelloId {
    type Err = ParseTrelloIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl AsRef<str> for TrelloId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TrelloId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
