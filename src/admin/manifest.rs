//! JSON site manifests.
//!
//! A manifest declares models, the admins registered for them, extra
//! template paths and optional seed records. [`SiteManifest::build`] goes
//! through the same registration API as hand-written setup code, so every
//! registration error applies.
//!
//! ```json
//! {
//!   "models": [
//!     { "app": "shop", "name": "vehicle", "fields": [{ "name": "name", "required": true }] },
//!     { "app": "shop", "name": "car", "parent": "shop.vehicle",
//!       "fields": [{ "name": "doors", "kind": "integer" }] }
//!   ],
//!   "admins": [
//!     { "model": "shop.vehicle", "children": [{ "model": "shop.car" }] }
//!   ]
//! }
//! ```

use crate::admin::child::ChildAdminConfig;
use crate::admin::parent::ParentAdminConfig;
use crate::admin::site::{AdminSite, ChildTypes};
use crate::admin::templates::{Layout, TemplateSet};
use crate::domain::entities::{FieldDef, Fieldset, FormSpec, ModelKey, ModelMeta, NewRecord};
use crate::error::AppError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// The vehicles demo site used when no manifest is configured.
pub const BUILTIN_MANIFEST: &str = include_str!("../../demos/vehicles.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteManifest {
    #[serde(default)]
    pub models: Vec<ModelDecl>,
    #[serde(default)]
    pub admins: Vec<ParentDecl>,
    /// Extra template paths and their layouts.
    #[serde(default)]
    pub templates: IndexMap<String, Layout>,
    /// Records loaded into an empty in-memory store.
    #[serde(default)]
    pub records: Vec<SeedRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDecl {
    pub app: String,
    pub name: String,
    pub verbose_name: Option<String>,
    pub verbose_name_plural: Option<String>,
    /// Base type; its fields are inherited ahead of `fields`.
    pub parent: Option<ModelKey>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParentDecl {
    pub model: ModelKey,
    /// Falls back to the site-wide default.
    pub polymorphic_list: Option<bool>,
    /// Falls back to the site-wide default.
    pub pk_pattern: Option<String>,
    #[serde(default)]
    pub list_filter: bool,
    #[serde(default)]
    pub children: Vec<ChildDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildDecl {
    pub model: ModelKey,
    pub base_form: Option<FormSpec>,
    #[serde(default)]
    pub base_fieldsets: Vec<Fieldset>,
    #[serde(default)]
    pub show_in_index: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRecord {
    pub ctype: ModelKey,
    #[serde(default)]
    pub values: Map<String, Value>,
}

/// A built site plus the seed records it declared.
pub struct LoadedSite {
    pub site: Arc<AdminSite>,
    pub seed: Vec<NewRecord>,
}

impl SiteManifest {
    pub fn builtin() -> Result<Self, AppError> {
        Self::parse(BUILTIN_MANIFEST)
    }

    pub fn parse(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Config(format!("invalid manifest: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read manifest {}: {e}", path.display()))
        })?;
        Self::parse(&json)
    }

    /// Resolves model declarations in order; a parent must be declared
    /// before its children.
    pub fn models(&self) -> Result<IndexMap<ModelKey, Arc<ModelMeta>>, AppError> {
        let mut models: IndexMap<ModelKey, Arc<ModelMeta>> = IndexMap::new();

        for decl in &self.models {
            let key = ModelKey::new(decl.app.as_str(), decl.name.as_str());
            let verbose_name = decl
                .verbose_name
                .clone()
                .unwrap_or_else(|| capitalize(&key.model_name));
            let mut meta = match &decl.parent {
                Some(parent) => {
                    let base = models.get(parent).ok_or_else(|| {
                        AppError::Config(format!("model {key} names undeclared parent {parent}"))
                    })?;
                    let mut child =
                        ModelMeta::child_of(base, key.model_name.as_str(), verbose_name);
                    child.key = key;
                    child
                }
                None => ModelMeta::new(key, verbose_name),
            };
            if let Some(plural) = &decl.verbose_name_plural {
                meta.verbose_name_plural = plural.clone();
            }
            for field in &decl.fields {
                if meta.field(&field.name).is_some() {
                    return Err(AppError::Config(format!(
                        "model {} declares field {} twice",
                        meta.key, field.name
                    )));
                }
                meta.fields.push(field.clone());
            }

            if models.contains_key(&meta.key) {
                return Err(AppError::Config(format!("model {} declared twice", meta.key)));
            }
            models.insert(meta.key.clone(), Arc::new(meta));
        }

        Ok(models)
    }

    /// Registers every declared admin and freezes the site.
    ///
    /// `defaults` supplies the parent options an entry leaves unset.
    pub fn build(&self, defaults: &ParentAdminConfig) -> Result<LoadedSite, AppError> {
        let models = self.models()?;
        let lookup = |key: &ModelKey| {
            models
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::Config(format!("admin refers to undeclared model {key}")))
        };

        let mut templates = TemplateSet::default();
        for (path, layout) in &self.templates {
            templates.insert(path.clone(), *layout);
        }

        let mut builder = AdminSite::builder()
            .with_defaults(defaults.clone())
            .with_templates(templates);

        for parent in &self.admins {
            let base = lookup(&parent.model)?;
            for child in &parent.children {
                let config = ChildAdminConfig {
                    base_form: child.base_form.clone(),
                    base_fieldsets: child.base_fieldsets.clone(),
                    show_in_index: child.show_in_index,
                };
                let concrete = lookup(&child.model)?;
                builder.register_child(concrete.as_ref().clone(), Some(base.clone()), config)?;
            }

            let config = ParentAdminConfig {
                polymorphic_list: parent.polymorphic_list.unwrap_or(defaults.polymorphic_list),
                pk_pattern: parent
                    .pk_pattern
                    .clone()
                    .unwrap_or_else(|| defaults.pk_pattern.clone()),
                list_filter: parent.list_filter,
            };
            let children: Vec<ModelKey> = parent.children.iter().map(|c| c.model.clone()).collect();
            builder.register_parent(base, ChildTypes::Listed(children), Some(config))?;
        }

        let seed = self
            .records
            .iter()
            .map(|record| {
                Ok(NewRecord {
                    base: owning_base(&models, &self.admins, &record.ctype)?,
                    ctype: record.ctype.clone(),
                    values: record.values.clone(),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(LoadedSite {
            site: builder.build()?,
            seed,
        })
    }
}

/// The base type whose admin owns records of `ctype`: the parent admin that
/// lists it, otherwise the nearest ancestor with a parent admin. Records of
/// a type without a registered admin still land under that ancestor so they
/// show up in its change list.
fn owning_base(
    models: &IndexMap<ModelKey, Arc<ModelMeta>>,
    admins: &[ParentDecl],
    ctype: &ModelKey,
) -> Result<ModelKey, AppError> {
    let meta = models
        .get(ctype)
        .ok_or_else(|| AppError::Config(format!("seed record of undeclared model {ctype}")))?;

    if let Some(parent) = admins
        .iter()
        .find(|p| p.children.iter().any(|c| &c.model == ctype))
    {
        return Ok(parent.model.clone());
    }

    meta.ancestors
        .iter()
        .find(|ancestor| admins.iter().any(|p| &p.model == *ancestor))
        .cloned()
        .ok_or_else(|| {
            AppError::Config(format!("seed record of {ctype} has no parent admin to list it"))
        })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
