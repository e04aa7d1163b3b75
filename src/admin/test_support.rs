//! Shared fixtures for admin unit tests.

use crate::admin::child::{ChildAdmin, ChildAdminConfig};
use crate::domain::entities::{FieldDef, ModelKey, ModelMeta};
use std::sync::Arc;

pub(crate) fn vehicle() -> ModelMeta {
    ModelMeta::new(ModelKey::new("shop", "vehicle"), "Vehicle")
        .with_field(FieldDef::text("name").required())
}

pub(crate) fn car() -> ModelMeta {
    ModelMeta::child_of(&vehicle(), "car", "Car").with_field(FieldDef::integer("doors"))
}

pub(crate) fn boat() -> ModelMeta {
    ModelMeta::child_of(&vehicle(), "boat", "Boat").with_field(FieldDef::decimal("hull_length"))
}

pub(crate) fn child_admin(model: ModelMeta) -> Arc<ChildAdmin> {
    let admin = ChildAdmin::new(model, Some(Arc::new(vehicle())), ChildAdminConfig::default());
    Arc::new(admin.unwrap())
}
