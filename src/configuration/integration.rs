//! Install-time configuration of the connector.

use super::Secret;
use crate::contract::domain::{
    FieldKind, FieldPath, FieldSchema, ObjectSchema, TrelloId, ValidationError,
    ValidationErrorKind,
};
use serde_json::{Map, Value};

/// Configuration key of the API key.
pub const API_KEY_FIELD: &str = "trelloApiKey";
/// Configuration key of the API token.
pub const API_TOKEN_FIELD: &str = "trelloApiToken";
/// Configuration key of the watched board.
pub const BOARD_ID_FIELD: &str = "trelloBoardId";

/// Environment variable supplying the API key.
pub const API_KEY_ENV: &str = "TRELLO_API_KEY";
/// Environment variable supplying the API token.
pub const API_TOKEN_ENV: &str = "TRELLO_API_TOKEN";
/// Environment variable supplying the watched board.
pub const BOARD_ID_ENV: &str = "TRELLO_BOARD_ID";

/// Credentials and the optional board to watch.
///
/// Validated once when the integration is installed. Without a board the
/// webhook is not registered and only on-demand actions are available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationConfiguration {
    api_key: Secret,
    api_token: Secret,
    board_id: Option<TrelloId>,
}

impl IntegrationConfiguration {
    /// Creates a configuration from already validated values.
    #[must_use]
    pub const fn new(api_key: Secret, api_token: Secret, board_id: Option<TrelloId>) -> Self {
        Self {
            api_key,
            api_token,
            board_id,
        }
    }

    /// Returns the declarative configuration contract.
    #[must_use]
    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .describe("Credentials and board selection for the Trello integration.")
            .with_field(
                FieldSchema::required(API_KEY_FIELD, FieldKind::non_empty_text())
                    .title("Trello API Key")
                    .describe("Key of the Trello Power-Up or application.")
                    .secret(),
            )
            .with_field(
                FieldSchema::required(API_TOKEN_FIELD, FieldKind::non_empty_text())
                    .title("Trello API Token")
                    .describe("Token authorising access to the member's boards.")
                    .secret(),
            )
            .with_field(
                FieldSchema::optional(BOARD_ID_FIELD, FieldKind::Identifier)
                    .title("Trello Board ID")
                    .describe("Board to watch for changes; leave empty to skip the webhook."),
            )
    }

    /// Validates and decodes a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the document does not match
    /// [`Self::schema`].
    pub fn from_value(document: &Value) -> Result<Self, ValidationError> {
        let normalized = Self::schema().validate(document)?;
        let board_id = normalized
            .get(BOARD_ID_FIELD)
            .and_then(Value::as_str)
            .map(TrelloId::new)
            .transpose()
            .map_err(|err| {
                ValidationError::new(FieldPath::root().child(BOARD_ID_FIELD), err.into())
            })?;
        Ok(Self {
            api_key: Secret::new(required_text(&normalized, API_KEY_FIELD)?),
            api_token: Secret::new(required_text(&normalized, API_TOKEN_FIELD)?),
            board_id,
        })
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] located at the configuration key of the
    /// first missing or malformed variable.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps an environment
    /// variable name to its value.
    ///
    /// Blank variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] located at the configuration key of the
    /// first missing or malformed variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let document: Map<String, Value> = [
            (API_KEY_FIELD, API_KEY_ENV),
            (API_TOKEN_FIELD, API_TOKEN_ENV),
            (BOARD_ID_FIELD, BOARD_ID_ENV),
        ]
        .into_iter()
        .filter_map(|(field, variable)| {
            lookup(variable)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map(|value| (field.to_owned(), Value::String(value)))
        })
        .collect();
        Self::from_value(&Value::Object(document))
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &Secret {
        &self.api_key
    }

    /// Returns the API token.
    #[must_use]
    pub const fn api_token(&self) -> &Secret {
        &self.api_token
    }

    /// Returns the board to register the webhook against, or `None` when
    /// registration is skipped.
    #[must_use]
    pub const fn webhook_target(&self) -> Option<&TrelloId> {
        self.board_id.as_ref()
    }
}

fn required_text(normalized: &Value, field: &str) -> Result<String, ValidationError> {
    normalized
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            ValidationError::new(FieldPath::root().child(field), ValidationErrorKind::MissingField)
        })
}
