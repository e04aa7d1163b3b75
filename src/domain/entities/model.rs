//! Model metadata: type identifiers, field declarations and admin URLs.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// URL prefix under which the admin site is mounted.
pub const ADMIN_ROOT: &str = "/admin";

/// Default primary key field name.
pub const DEFAULT_PK_FIELD: &str = "id";

/// Default discriminator field name.
pub const DEFAULT_DISCRIMINATOR_FIELD: &str = "polymorphic_ctype";

/// Identifier of a model type, written `app_label.model_name`.
///
/// Doubles as the discriminator value stored on every record: a record's
/// `ctype` is the `ModelKey` of its concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelKey {
    pub app_label: String,
    pub model_name: String,
}

impl ModelKey {
    /// Creates a key; the model name is lowercased.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into().to_lowercase(),
        }
    }

    /// `GET /admin/{app}/{model}`
    pub fn changelist_url(&self) -> String {
        format!("{}/{}/{}", ADMIN_ROOT, self.app_label, self.model_name)
    }

    /// `GET|POST /admin/{app}/{model}/add`
    pub fn add_url(&self) -> String {
        format!("{}/add", self.changelist_url())
    }

    /// `GET|POST /admin/{app}/{model}/{pk}/change`
    pub fn change_url(&self, pk: &str) -> String {
        format!("{}/{}/change", self.changelist_url(), pk)
    }

    /// `GET|POST /admin/{app}/{model}/{pk}/delete`
    pub fn delete_url(&self, pk: &str) -> String {
        format!("{}/{}/delete", self.changelist_url(), pk)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model_name)
    }
}

impl FromStr for ModelKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((app, model)) if !app.is_empty() && !model.is_empty() && !model.contains('.') => {
                Ok(Self::new(app, model))
            }
            _ => Err(AppError::bad_request(
                "Invalid model identifier",
                json!({"value": s, "expected": "app_label.model_name"}),
            )),
        }
    }
}

impl TryFrom<String> for ModelKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelKey> for String {
    fn from(key: ModelKey) -> Self {
        key.to_string()
    }
}

/// Storage kind of a field, used to parse submitted form values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Integer,
    Decimal,
    Boolean,
}

impl FieldKind {
    /// HTML `<input type>` used when rendering this kind.
    pub fn input_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer | Self::Decimal => "number",
            Self::Boolean => "checkbox",
        }
    }

    /// Parses a raw submitted value.
    ///
    /// Empty input parses to `Value::Null` for every kind except `Boolean`,
    /// where an absent checkbox means `false`.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        let raw = raw.trim();
        match self {
            Self::Boolean => Ok(Value::Bool(matches!(raw, "on" | "true" | "1" | "yes"))),
            _ if raw.is_empty() => Ok(Value::Null),
            Self::Text => Ok(Value::String(raw.to_string())),
            Self::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "Enter a whole number.".to_string()),
            Self::Decimal => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "Enter a number.".to_string()),
        }
    }
}

/// A single declared field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            required: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Human-readable label, derived from the name when none is declared.
    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        let spaced = self.name.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Metadata describing a model type.
///
/// For a concrete (child) type, `fields` holds the full field list in natural
/// order: inherited base fields first, then the type's own fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta {
    pub key: ModelKey,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub fields: Vec<FieldDef>,
    /// The base type this model specializes, if any.
    pub parent: Option<ModelKey>,
    /// Every base type above this model, nearest first.
    pub ancestors: Vec<ModelKey>,
    pub pk_field: String,
    pub discriminator_field: String,
}

impl ModelMeta {
    /// Creates a root model with only a primary key field.
    pub fn new(key: ModelKey, verbose_name: impl Into<String>) -> Self {
        let verbose_name = verbose_name.into();
        Self {
            key,
            verbose_name_plural: format!("{verbose_name}s"),
            verbose_name,
            fields: vec![FieldDef::integer(DEFAULT_PK_FIELD).with_label("ID")],
            parent: None,
            ancestors: Vec::new(),
            pk_field: DEFAULT_PK_FIELD.to_string(),
            discriminator_field: DEFAULT_DISCRIMINATOR_FIELD.to_string(),
        }
    }

    /// Creates a concrete type inheriting every field of `base`.
    pub fn child_of(
        base: &ModelMeta,
        model_name: impl Into<String>,
        verbose_name: impl Into<String>,
    ) -> Self {
        let verbose_name = verbose_name.into();
        Self {
            key: ModelKey::new(base.key.app_label.clone(), model_name),
            verbose_name_plural: format!("{verbose_name}s"),
            verbose_name,
            fields: base.fields.clone(),
            parent: Some(base.key.clone()),
            ancestors: std::iter::once(base.key.clone())
                .chain(base.ancestors.iter().cloned())
                .collect(),
            pk_field: base.pk_field.clone(),
            discriminator_field: base.discriminator_field.clone(),
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.verbose_name_plural = plural.into();
        self
    }

    /// True when `base` appears anywhere above this model.
    pub fn descends_from(&self, base: &ModelKey) -> bool {
        self.ancestors.contains(base)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All field names in natural order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// True for the primary key and discriminator fields, which are never
    /// editable through a form.
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.pk_field || name == self.discriminator_field
    }

    /// Editable fields in natural order.
    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !self.is_reserved(&f.name))
    }
}
