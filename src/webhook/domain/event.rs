//! Inbound change events delivered to the registered webhook.

use crate::contract::domain::{FieldPath, TrelloId, ValidationError, ValidationErrorKind};
use serde_json::Value;

/// A change event pushed by the remote service.
///
/// Only the fields needed to authenticate and deduplicate the delivery are
/// decoded; the raw payload is kept for downstream handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundWebhookEvent {
    webhook_id: TrelloId,
    action_id: TrelloId,
    action_type: String,
    model_id: TrelloId,
    payload: Value,
}

impl InboundWebhookEvent {
    /// Decodes a delivery received on behalf of `webhook_id`.
    ///
    /// The payload must carry `action.id`, `action.type`, and `model.id`.
    /// Other fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first missing or malformed
    /// field.
    pub fn from_payload(webhook_id: TrelloId, payload: &Value) -> Result<Self, ValidationError> {
        let root = FieldPath::root();
        let action_path = root.child("action");
        let action = object_at(payload, &root, "action")?;
        let model = object_at(payload, &root, "model")?;

        let action_type = text_at(action, &action_path, "type")?;
        if action_type.trim().is_empty() {
            return Err(ValidationError::new(
                action_path.child("type"),
                ValidationErrorKind::EmptyString,
            ));
        }

        Ok(Self {
            webhook_id,
            action_id: identifier_at(action, &action_path, "id")?,
            action_type: action_type.to_owned(),
            model_id: identifier_at(model, &root.child("model"), "id")?,
            payload: payload.clone(),
        })
    }

    /// Returns the webhook the delivery was addressed to.
    #[must_use]
    pub const fn webhook_id(&self) -> &TrelloId {
        &self.webhook_id
    }

    /// Returns the identifier of the remote action that caused the event.
    #[must_use]
    pub const fn action_id(&self) -> &TrelloId {
        &self.action_id
    }

    /// Returns the remote action type, for example `updateCard`.
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Returns the identifier of the watched model.
    #[must_use]
    pub const fn model_id(&self) -> &TrelloId {
        &self.model_id
    }

    /// Returns the raw delivery payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }
}

fn field<'a>(
    parent: &'a Value,
    parent_path: &FieldPath,
    key: &str,
) -> Result<&'a Value, ValidationError> {
    parent.get(key).filter(|value| !value.is_null()).ok_or_else(|| {
        ValidationError::new(parent_path.child(key), ValidationErrorKind::MissingField)
    })
}

fn object_at<'a>(
    parent: &'a Value,
    parent_path: &FieldPath,
    key: &str,
) -> Result<&'a Value, ValidationError> {
    let value = field(parent, parent_path, key)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(invalid_type(parent_path, key, "object"))
    }
}

fn text_at<'a>(
    parent: &'a Value,
    parent_path: &FieldPath,
    key: &str,
) -> Result<&'a str, ValidationError> {
    field(parent, parent_path, key)?
        .as_str()
        .ok_or_else(|| invalid_type(parent_path, key, "string"))
}

fn identifier_at(
    parent: &Value,
    parent_path: &FieldPath,
    key: &str,
) -> Result<TrelloId, ValidationError> {
    let raw = text_at(parent, parent_path, key)?;
    TrelloId::new(raw).map_err(|error| ValidationError::new(parent_path.child(key), error.into()))
}

fn invalid_type(parent_path: &FieldPath, key: &str, expected: &'static str) -> ValidationError {
    ValidationError::new(
        parent_path.child(key),
        ValidationErrorKind::InvalidType { expected },
    )
}
