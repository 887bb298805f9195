//! Persisted webhook registration state.

use crate::contract::domain::{
    FieldKind, FieldPath, FieldSchema, ObjectSchema, TrelloId, ValidationError,
};
use serde_json::{Value, json};
use std::fmt;

/// Name of the persisted slot holding the registration state.
pub const WEBHOOK_STATE_SLOT: &str = "webhookState";

const WEBHOOK_ID_FIELD: &str = "trelloWebhookId";

/// Registration state of the integration's single webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum WebhookRegistrationState {
    /// No webhook is registered.
    #[default]
    Unregistered,
    /// A webhook with the given remote identifier is registered.
    Registered(TrelloId),
}

impl WebhookRegistrationState {
    /// Returns the schema of the persisted slot document.
    #[must_use]
    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .describe("Identifier of the webhook registered for this integration.")
            .with_field(
                FieldSchema::defaulted(
                    WEBHOOK_ID_FIELD,
                    FieldKind::Identifier.nullable(),
                    Value::Null,
                )
                .title("Trello webhook ID"),
            )
    }

    /// Decodes the persisted slot document.
    ///
    /// An empty object decodes as [`Self::Unregistered`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the document does not match
    /// [`Self::schema`].
    pub fn from_document(document: &Value) -> Result<Self, ValidationError> {
        let normalized = Self::schema().validate(document)?;
        match normalized.get(WEBHOOK_ID_FIELD).and_then(Value::as_str) {
            None => Ok(Self::Unregistered),
            Some(raw) => TrelloId::new(raw).map(Self::Registered).map_err(|error| {
                ValidationError::new(FieldPath::root().child(WEBHOOK_ID_FIELD), error.into())
            }),
        }
    }

    /// Encodes the state as the persisted slot document.
    #[must_use]
    pub fn to_document(&self) -> Value {
        json!({ WEBHOOK_ID_FIELD: self.webhook_id().map(TrelloId::as_str) })
    }

    /// Returns the registered webhook identifier, if any.
    #[must_use]
    pub const fn webhook_id(&self) -> Option<&TrelloId> {
        match self {
            Self::Unregistered => None,
            Self::Registered(webhook_id) => Some(webhook_id),
        }
    }

    /// Returns whether a webhook is registered.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }

    /// Returns whether `webhook_id` is the registered webhook.
    #[must_use]
    pub fn is_registered_as(&self, webhook_id: &TrelloId) -> bool {
        self.webhook_id() == Some(webhook_id)
    }
}

impl From<Option<TrelloId>> for WebhookRegistrationState {
    fn from(webhook_id: Option<TrelloId>) -> Self {
        webhook_id.map_or(Self::Unregistered, Self::Registered)
    }
}

impl fmt::Display for WebhookRegistrationState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered => formatter.write_str("unregistered"),
            Self::Registered(webhook_id) => write!(formatter, "registered ({webhook_id})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::domain::ValidationErrorKind;
    use rstest::rstest;

    const WEBHOOK: &str = "5a4b3c2d1e0f5a4b3c2d1e0f";

    #[rstest]
    #[case(json!({}), WebhookRegistrationState::Unregistered)]
    #[case(json!({ "trelloWebhookId": null }), WebhookRegistrationState::Unregistered)]
    #[case(
        json!({ "trelloWebhookId": WEBHOOK }),
        WebhookRegistrationState::Registered(TrelloId::new(WEBHOOK).expect("valid id"))
    )]
    fn slot_documents_decode(#[case] document: Value, #[case] expected: WebhookRegistrationState) {
        assert_eq!(WebhookRegistrationState::from_document(&document), Ok(expected));
    }

    #[test]
    fn malformed_identifier_is_rejected_with_path() {
        let error = WebhookRegistrationState::from_document(&json!({ "trelloWebhookId": "W1" }))
            .expect_err("malformed id must fail");

        assert_eq!(error.path().to_string(), "trelloWebhookId");
        assert_eq!(
            error.kind(),
            &ValidationErrorKind::MalformedIdentifier("W1".to_owned())
        );
    }

    #[test]
    fn unknown_slot_fields_are_rejected() {
        let error = WebhookRegistrationState::from_document(&json!({ "boardId": WEBHOOK }))
            .expect_err("unknown field must fail");

        assert_eq!(error.kind(), &ValidationErrorKind::UnknownField);
    }

    #[test]
    fn unregistered_encodes_as_null() {
        assert_eq!(
            WebhookRegistrationState::Unregistered.to_document(),
            json!({ "trelloWebhookId": null })
        );
    }

    #[test]
    fn registered_state_reports_its_identifier() {
        let webhook_id = TrelloId::new(WEBHOOK).expect("valid id");
        let state = WebhookRegistrationState::from(Some(webhook_id.clone()));

        assert!(state.is_registered());
        assert!(state.is_registered_as(&webhook_id));
        assert_eq!(state.to_document(), json!({ "trelloWebhookId": WEBHOOK }));
    }
}
