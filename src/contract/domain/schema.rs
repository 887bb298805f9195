//! Declarative object schemas used as action, configuration, and state
//! contracts.
//!
//! A schema is a pure description: it validates a JSON document, inserts
//! declared defaults, and renders itself as a JSON Schema document. It never
//! touches network state.

use super::{FieldPath, TrelloId, ValidationError, ValidationErrorKind};
use chrono::DateTime;
use serde_json::{Map, Value, json};

/// Shape accepted for a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A Trello identifier string.
    Identifier,
    /// A string, optionally required to contain non-whitespace text.
    Text {
        /// Whether empty or whitespace-only strings are rejected.
        non_empty: bool,
    },
    /// An RFC 3339 (ISO 8601) date-time string.
    DateTime,
    /// An integer, optionally bounded below.
    Integer {
        /// Inclusive lower bound.
        minimum: Option<i64>,
    },
    /// A JSON boolean.
    Boolean,
    /// A string restricted to a closed set of literals.
    Enumeration(&'static [&'static str]),
    /// An array whose elements share one kind.
    Array(Box<FieldKind>),
    /// A nested object.
    Object(Box<ObjectSchema>),
    /// A value of the inner kind, or `null`.
    Nullable(Box<FieldKind>),
}

impl FieldKind {
    /// Non-empty text.
    #[must_use]
    pub const fn non_empty_text() -> Self {
        Self::Text { non_empty: true }
    }

    /// Text that may be empty.
    #[must_use]
    pub const fn text() -> Self {
        Self::Text { non_empty: false }
    }

    /// An array of Trello identifiers.
    #[must_use]
    pub fn identifiers() -> Self {
        Self::Array(Box::new(Self::Identifier))
    }

    /// An array of nested objects.
    #[must_use]
    pub fn objects(schema: ObjectSchema) -> Self {
        Self::Array(Box::new(Self::Object(Box::new(schema))))
    }

    /// A nested object.
    #[must_use]
    pub fn object(schema: ObjectSchema) -> Self {
        Self::Object(Box::new(schema))
    }

    /// This kind, or `null`.
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    fn validate(&self, path: &FieldPath, value: &Value) -> Result<Value, ValidationError> {
        match self {
            Self::Identifier => {
                let raw = expect_str(path, value, "identifier string")?;
                TrelloId::new(raw)
                    .map_err(|error| ValidationError::new(path.clone(), error.into()))?;
                Ok(value.clone())
            }
            Self::Text { non_empty } => {
                let raw = expect_str(path, value, "string")?;
                if *non_empty && raw.trim().is_empty() {
                    return Err(ValidationError::new(
                        path.clone(),
                        ValidationErrorKind::EmptyString,
                    ));
                }
                Ok(value.clone())
            }
            Self::DateTime => {
                let raw = expect_str(path, value, "date-time string")?;
                DateTime::parse_from_rfc3339(raw).map_err(|_| {
                    ValidationError::new(
                        path.clone(),
                        ValidationErrorKind::InvalidDateTime(raw.to_owned()),
                    )
                })?;
                Ok(value.clone())
            }
            Self::Integer { minimum } => {
                let actual = value.as_i64().ok_or_else(|| invalid_type(path, "integer"))?;
                if let Some(floor) = *minimum
                    && actual < floor
                {
                    return Err(ValidationError::new(
                        path.clone(),
                        ValidationErrorKind::BelowMinimum {
                            minimum: floor,
                            actual,
                        },
                    ));
                }
                Ok(value.clone())
            }
            Self::Boolean => {
                value.as_bool().ok_or_else(|| invalid_type(path, "boolean"))?;
                Ok(value.clone())
            }
            Self::Enumeration(allowed) => {
                let raw = expect_str(path, value, "string")?;
                if !allowed.contains(&raw) {
                    return Err(ValidationError::new(
                        path.clone(),
                        ValidationErrorKind::InvalidEnumValue {
                            value: raw.to_owned(),
                            allowed: allowed.iter().map(|literal| (*literal).to_owned()).collect(),
                        },
                    ));
                }
                Ok(value.clone())
            }
            Self::Array(element) => {
                let items = value.as_array().ok_or_else(|| invalid_type(path, "array"))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| element.validate(&path.index(index), item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Self::Object(schema) => schema.validate_at(path, value),
            Self::Nullable(inner) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                inner.validate(path, value)
            }
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            Self::Identifier => json!({ "type": "string", "pattern": TrelloId::PATTERN }),
            Self::Text { non_empty: true } => json!({ "type": "string", "minLength": 1 }),
            Self::Text { non_empty: false } => json!({ "type": "string" }),
            Self::DateTime => json!({ "type": "string", "format": "date-time" }),
            Self::Integer { minimum: Some(minimum) } => {
                json!({ "type": "integer", "minimum": minimum })
            }
            Self::Integer { minimum: None } => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Enumeration(allowed) => json!({ "type": "string", "enum": allowed }),
            Self::Array(element) => json!({ "type": "array", "items": element.to_json_schema() }),
            Self::Object(schema) => schema.to_json_schema(),
            Self::Nullable(inner) => {
                json!({ "anyOf": [inner.to_json_schema(), { "type": "null" }] })
            }
        }
    }
}

/// Whether a field must, may, or need not be supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// The field must be present.
    Required,
    /// The field may be omitted; omission is preserved.
    Optional,
    /// The field may be omitted; the default is inserted on omission.
    Defaulted(Value),
}

/// Declaration of one named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    name: String,
    title: Option<String>,
    description: Option<String>,
    kind: FieldKind,
    presence: Presence,
    secret: bool,
}

impl FieldSchema {
    fn new(name: impl Into<String>, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            kind,
            presence,
            secret: false,
        }
    }

    /// Declares a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    /// Declares an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    /// Declares a field whose omission inserts `default`.
    #[must_use]
    pub fn defaulted(name: impl Into<String>, kind: FieldKind, default: Value) -> Self {
        Self::new(name, kind, Presence::Defaulted(default))
    }

    /// Sets the display title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field as holding a secret.
    #[must_use]
    pub const fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display title, if any.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the accepted value kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the presence rule.
    #[must_use]
    pub const fn presence(&self) -> &Presence {
        &self.presence
    }

    /// Returns whether the field holds a secret.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        self.secret
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = self.kind.to_json_schema();
        if let Value::Object(properties) = &mut schema {
            if let Some(title) = self.display_title() {
                properties.insert("title".to_owned(), Value::String(title.to_owned()));
            }
            if let Some(description) = self.description() {
                properties.insert("description".to_owned(), Value::String(description.to_owned()));
            }
            if let Presence::Defaulted(default) = &self.presence {
                properties.insert("default".to_owned(), default.clone());
            }
            if self.secret {
                properties.insert("x-secret".to_owned(), Value::Bool(true));
            }
        }
        schema
    }
}

/// Exact-shape object schema with optional cross-field constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    description: Option<String>,
    fields: Vec<FieldSchema>,
    disjoint_pairs: Vec<(String, String)>,
}

impl ObjectSchema {
    /// Creates an empty object schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any existing field with the same name.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        if let Some(existing) = self
            .fields
            .iter_mut()
            .find(|existing| existing.name == field.name)
        {
            *existing = field;
        } else {
            self.fields.push(field);
        }
        self
    }

    /// Merges every field and constraint of `other` into this schema.
    ///
    /// Fields of `other` replace same-named fields of `self`.
    #[must_use]
    pub fn extend(self, other: Self) -> Self {
        let Self {
            fields,
            disjoint_pairs,
            ..
        } = other;
        let mut merged = fields.into_iter().fold(self, Self::with_field);
        merged.disjoint_pairs.extend(disjoint_pairs);
        merged
    }

    /// Sets the schema description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares that two identifier-array fields must not share a value.
    #[must_use]
    pub fn disjoint(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.disjoint_pairs.push((first.into(), second.into()));
        self
    }

    /// Returns the schema description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Finds a declared field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validates a document and returns its normalised form.
    ///
    /// Normalisation inserts declared defaults for omitted fields; every
    /// other value is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, located by field
    /// path.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        self.validate_at(&FieldPath::root(), value)
    }

    fn validate_at(&self, path: &FieldPath, value: &Value) -> Result<Value, ValidationError> {
        let object = value.as_object().ok_or_else(|| invalid_type(path, "object"))?;

        if let Some(unknown) = object.keys().find(|key| self.field(key).is_none()) {
            return Err(ValidationError::new(
                path.child(unknown.as_str()),
                ValidationErrorKind::UnknownField,
            ));
        }

        let mut normalized = Map::new();
        for field in &self.fields {
            let field_path = path.child(field.name.as_str());
            match (object.get(&field.name), &field.presence) {
                (Some(supplied), _) => {
                    let checked = field.kind.validate(&field_path, supplied)?;
                    normalized.insert(field.name.clone(), checked);
                }
                (None, Presence::Required) => {
                    return Err(ValidationError::new(
                        field_path,
                        ValidationErrorKind::MissingField,
                    ));
                }
                (None, Presence::Optional) => {}
                (None, Presence::Defaulted(default)) => {
                    normalized.insert(field.name.clone(), default.clone());
                }
            }
        }

        self.check_disjoint_pairs(path, &normalized)?;
        Ok(Value::Object(normalized))
    }

    fn check_disjoint_pairs(
        &self,
        path: &FieldPath,
        normalized: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        for (first, second) in &self.disjoint_pairs {
            let second_values = string_items(normalized.get(second));
            let conflict = string_items(normalized.get(first))
                .into_iter()
                .enumerate()
                .find(|(_, candidate)| second_values.contains(candidate));

            if let Some((index, id)) = conflict {
                return Err(ValidationError::new(
                    path.child(first.as_str()).index(index),
                    ValidationErrorKind::ConflictingRelationChange {
                        other: second.clone(),
                        id: id.to_owned(),
                    },
                ));
            }
        }
        Ok(())
    }

    /// Renders the schema as a JSON Schema document.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| matches!(field.presence, Presence::Required))
            .map(|field| field.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        });
        if let Value::Object(document) = &mut schema {
            if let Some(description) = &self.description {
                document.insert("description".to_owned(), Value::String(description.clone()));
            }
            if !self.disjoint_pairs.is_empty() {
                let pairs: Vec<[&str; 2]> = self
                    .disjoint_pairs
                    .iter()
                    .map(|(first, second)| [first.as_str(), second.as_str()])
                    .collect();
                document.insert("x-disjoint".to_owned(), json!(pairs));
            }
        }
        schema
    }
}

fn string_items(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn expect_str<'a>(
    path: &FieldPath,
    value: &'a Value,
    expected: &'static str,
) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| invalid_type(path, expected))
}

fn invalid_type(path: &FieldPath, expected: &'static str) -> ValidationError {
    ValidationError::new(path.clone(), ValidationErrorKind::InvalidType { expected })
}
