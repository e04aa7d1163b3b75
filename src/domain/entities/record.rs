//! Record entities stored under a polymorphic base type.

use super::model::{ModelKey, ModelMeta};
use serde_json::{Map, Value};

/// A stored record.
///
/// `ctype` is the discriminator: the concrete type the record was created
/// as. It is fixed at creation and no update path can change it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub pk: String,
    pub ctype: ModelKey,
    pub values: Map<String, Value>,
}

impl Record {
    pub fn new(pk: impl Into<String>, ctype: ModelKey, values: Map<String, Value>) -> Self {
        Self {
            pk: pk.into(),
            ctype,
            values,
        }
    }

    /// Display string for a single field; missing and null values render empty.
    pub fn display(&self, field: &str) -> String {
        match self.values.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(true)) => "yes".to_string(),
            Some(Value::Bool(false)) => "no".to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Short label used in breadcrumbs and confirmation pages.
    pub fn label(&self, meta: &ModelMeta) -> String {
        meta.editable_fields()
            .map(|f| self.display(&f.name))
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| format!("{} #{}", meta.verbose_name, self.pk))
    }
}

/// Input data for creating a record of a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Base type whose table the record lives in.
    pub base: ModelKey,
    /// Concrete type; becomes the immutable discriminator.
    pub ctype: ModelKey,
    pub values: Map<String, Value>,
}

/// Field values to overwrite on an existing record.
///
/// Keys absent from `values` are left unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPatch {
    pub values: Map<String, Value>,
}

/// Listing query against a base type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub base: ModelKey,
    /// Base type field names; with `polymorphic = false` only these are fetched.
    pub base_fields: Vec<String>,
    /// When true, every record is materialized with its concrete type's fields.
    pub polymorphic: bool,
    /// Restricts the listing to a single concrete type.
    pub ctype: Option<ModelKey>,
}

impl RecordQuery {
    /// A base-fields-only listing of every record under `base`.
    pub fn base_only(base: &ModelMeta) -> Self {
        Self {
            base: base.key.clone(),
            base_fields: base.field_names(),
            polymorphic: false,
            ctype: None,
        }
    }

    /// Projects a full value map onto the fields this query may return.
    pub fn project(&self, values: &Map<String, Value>) -> Map<String, Value> {
        if self.polymorphic {
            return values.clone();
        }
        values
            .iter()
            .filter(|(k, _)| self.base_fields.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
