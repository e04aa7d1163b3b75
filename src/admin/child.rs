//! Admin handler for a single concrete child type.

use crate::admin::reconciler::{Reconciled, reconcile};
use crate::admin::templates::{CHANGE_FORM, DELETE_CONFIRMATION, candidate_templates};
use crate::admin::view::{
    AdminRequest, AdminResponse, ChangeFormPage, DeletePage, FieldRow, FieldsetView, Page,
};
use crate::domain::entities::{
    BreadcrumbTrail, FieldKind, Fieldset, FormSpec, ModelMeta, NewRecord, Record, RecordPatch,
};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Declarations a child admin is configured with.
///
/// Deriving one admin from another is a matter of cloning the config and
/// overriding fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildAdminConfig {
    /// Form whose field declarations take precedence over the model's.
    pub base_form: Option<FormSpec>,
    /// Layout written in terms of the base type's fields.
    pub base_fieldsets: Vec<Fieldset>,
    /// Whether the child's own entry is listed on the site index.
    pub show_in_index: bool,
}

impl ChildAdminConfig {
    pub fn with_form(mut self, form: FormSpec) -> Self {
        self.base_form = Some(form);
        self
    }

    pub fn with_fieldsets(mut self, fieldsets: Vec<Fieldset>) -> Self {
        self.base_fieldsets = fieldsets;
        self
    }

    pub fn shown_in_index(mut self, show: bool) -> Self {
        self.show_in_index = show;
        self
    }
}

/// Field-level validation errors keyed by field name.
pub type FieldErrors = HashMap<String, String>;

/// Handles add/change/delete for one concrete type while presenting itself
/// as part of the base type's admin.
#[derive(Debug)]
pub struct ChildAdmin {
    model: ModelMeta,
    base_model: Arc<ModelMeta>,
    config: ChildAdminConfig,
    reconciled: Reconciled,
}

impl ChildAdmin {
    /// Builds the handler and computes its effective form and fieldsets.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MissingBaseModel`] if `base_model` is `None`.
    pub fn new(
        model: ModelMeta,
        base_model: Option<Arc<ModelMeta>>,
        config: ChildAdminConfig,
    ) -> Result<Self, AppError> {
        let base_model = base_model.ok_or_else(|| AppError::MissingBaseModel {
            concrete: model.key.clone(),
        })?;

        let reconciled = reconcile(config.base_form.as_ref(), &config.base_fieldsets, &model);

        Ok(Self {
            model,
            base_model,
            config,
            reconciled,
        })
    }

    pub fn model(&self) -> &ModelMeta {
        &self.model
    }

    pub fn base_model(&self) -> &ModelMeta {
        &self.base_model
    }

    pub fn config(&self) -> &ChildAdminConfig {
        &self.config
    }

    pub fn show_in_index(&self) -> bool {
        self.config.show_in_index
    }

    pub fn form(&self) -> &FormSpec {
        &self.reconciled.form
    }

    pub fn fieldsets(&self) -> &[Fieldset] {
        &self.reconciled.fieldsets
    }

    /// Template paths for `action`, concrete type first, then base type.
    pub fn candidate_templates(&self, action: &str) -> Vec<String> {
        candidate_templates(action, &self.model.key, &self.base_model.key)
    }

    /// Rewrites the default trail so it leads back through the base type's
    /// list instead of this (unlisted) child's.
    pub fn breadcrumbs(&self, mut trail: BreadcrumbTrail) -> BreadcrumbTrail {
        trail.replace_model(&self.model, &self.base_model);
        trail
    }

    /// Parses submitted values against the effective form.
    ///
    /// Only fields in the form are read; anything else in the submission,
    /// including the discriminator, is ignored.
    pub fn clean(
        &self,
        submitted: &HashMap<String, String>,
    ) -> Result<Map<String, Value>, FieldErrors> {
        let mut values = Map::new();
        let mut errors = FieldErrors::new();

        for field in &self.reconciled.form.fields {
            let raw = submitted.get(&field.name).map(String::as_str).unwrap_or("");
            match field.kind.parse(raw) {
                Ok(Value::Null) if field.required => {
                    errors.insert(field.name.clone(), "This field is required.".to_string());
                }
                Ok(value) => {
                    values.insert(field.name.clone(), value);
                }
                Err(message) => {
                    errors.insert(field.name.clone(), message);
                }
            }
        }

        if errors.is_empty() { Ok(values) } else { Err(errors) }
    }

    /// `GET|POST add`: empty form, or create a record of this type.
    pub async fn add_view(
        &self,
        repository: &dyn RecordRepository,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let title = format!("Add {}", self.model.verbose_name.to_lowercase());

        if !request.is_post() {
            return Ok(self.form_page(
                title,
                self.model.key.add_url(),
                None,
                &Map::new(),
                &FieldErrors::new(),
            ));
        }

        match self.clean(&request.form) {
            Ok(values) => {
                let created = repository
                    .create(NewRecord {
                        base: self.base_model.key.clone(),
                        ctype: self.model.key.clone(),
                        values,
                    })
                    .await?;
                tracing::info!(model = %self.model.key, pk = %created.pk, "Record created");
                Ok(AdminResponse::Redirect(self.base_model.key.changelist_url()))
            }
            Err(errors) => {
                let raw = self.raw_values(&request.form);
                Ok(self.form_page(title, self.model.key.add_url(), None, &raw, &errors))
            }
        }
    }

    /// `GET|POST {pk}/change`: edit form, or save changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownRecord`] if `pk` does not name a record of
    /// this concrete type.
    pub async fn change_view(
        &self,
        repository: &dyn RecordRepository,
        pk: &str,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let record = self.get_object(repository, pk).await?;
        let title = format!("Change {}", self.model.verbose_name.to_lowercase());
        let action_url = self.model.key.change_url(pk);
        let delete_url = Some(self.model.key.delete_url(pk));

        if !request.is_post() {
            return Ok(self.form_page(
                title,
                action_url,
                delete_url,
                &record.values,
                &FieldErrors::new(),
            ));
        }

        match self.clean(&request.form) {
            Ok(values) => {
                repository
                    .update(&self.base_model.key, pk, RecordPatch { values })
                    .await?;
                tracing::info!(model = %self.model.key, pk, "Record updated");
                Ok(AdminResponse::Redirect(self.base_model.key.changelist_url()))
            }
            Err(errors) => {
                let raw = self.raw_values(&request.form);
                Ok(self.form_page(title, action_url, delete_url, &raw, &errors))
            }
        }
    }

    /// `GET|POST {pk}/delete`: confirmation page, or delete.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownRecord`] if `pk` does not name a record of
    /// this concrete type.
    pub async fn delete_view(
        &self,
        repository: &dyn RecordRepository,
        pk: &str,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let record = self.get_object(repository, pk).await?;

        if request.is_post() {
            repository.delete(&self.base_model.key, pk).await?;
            tracing::info!(model = %self.model.key, pk, "Record deleted");
            return Ok(AdminResponse::Redirect(self.base_model.key.changelist_url()));
        }

        let object_label = record.label(&self.model);
        let trail = BreadcrumbTrail::default_for(&self.model, format!("Delete {object_label}"));

        Ok(AdminResponse::Page(Page::DeleteConfirmation(DeletePage {
            title: "Are you sure?".to_string(),
            breadcrumbs: self.breadcrumbs(trail),
            templates: self.candidate_templates(DELETE_CONFIRMATION),
            object_label,
            type_label: self.model.verbose_name.clone(),
            action_url: self.model.key.delete_url(pk),
            cancel_url: self.model.key.change_url(pk),
        })))
    }

    async fn get_object(
        &self,
        repository: &dyn RecordRepository,
        pk: &str,
    ) -> Result<Record, AppError> {
        repository
            .get(&self.base_model.key, pk)
            .await?
            .filter(|record| record.ctype == self.model.key)
            .ok_or_else(|| AppError::UnknownRecord {
                base: self.base_model.key.clone(),
                pk: pk.to_string(),
            })
    }

    fn form_page(
        &self,
        title: String,
        action_url: String,
        delete_url: Option<String>,
        values: &Map<String, Value>,
        errors: &FieldErrors,
    ) -> AdminResponse {
        let record = Record::new("", self.model.key.clone(), values.clone());
        let only_group = self.reconciled.fieldsets.len() == 1;

        let fieldsets = self
            .reconciled
            .fieldsets
            .iter()
            .map(|group| FieldsetView {
                name: group.name.clone(),
                collapsible: group.collapsible && !only_group,
                rows: group
                    .fields
                    .iter()
                    .filter_map(|name| self.reconciled.form.field(name))
                    .map(|field| FieldRow {
                        name: field.name.clone(),
                        label: field.display_label(),
                        input_type: field.kind.input_type(),
                        value: record.display(&field.name),
                        checked: field.kind == FieldKind::Boolean
                            && values.get(&field.name) == Some(&Value::Bool(true)),
                        required: field.required,
                        error: errors.get(&field.name).cloned().unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        let trail = BreadcrumbTrail::default_for(&self.model, title.clone());

        AdminResponse::Page(Page::ChangeForm(ChangeFormPage {
            title,
            form_name: self.reconciled.form.name.clone(),
            breadcrumbs: self.breadcrumbs(trail),
            templates: self.candidate_templates(CHANGE_FORM),
            action_url,
            delete_url,
            fieldsets,
            has_errors: !errors.is_empty(),
        }))
    }

    /// Submitted values re-displayed on an invalid form. Checkboxes become
    /// booleans; everything else keeps the text the user typed.
    fn raw_values(&self, submitted: &HashMap<String, String>) -> Map<String, Value> {
        self.reconciled
            .form
            .fields
            .iter()
            .filter_map(|field| {
                let value = match (field.kind, submitted.get(&field.name)) {
                    (FieldKind::Boolean, raw) => FieldKind::Boolean
                        .parse(raw.map_or("", String::as_str))
                        .unwrap_or(Value::Bool(false)),
                    (_, Some(raw)) => Value::String(raw.clone()),
                    (_, None) => return None,
                };
                Some((field.name.clone(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::test_support::{car, vehicle};
    use crate::domain::entities::{FieldDef, ModelKey};
    use crate::domain::repositories::MockRecordRepository;
    use serde_json::json;

    fn car_admin() -> ChildAdmin {
        ChildAdmin::new(
            car(),
            Some(Arc::new(vehicle())),
            ChildAdminConfig::default().with_fieldsets(vec![Fieldset::new("Main", ["name"])]),
        )
        .unwrap()
    }

    fn car_record(pk: &str) -> Record {
        Record::new(
            pk,
            ModelKey::new("shop", "car"),
            json!({"name": "Beetle", "doors": 2}).as_object().cloned().unwrap(),
        )
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn change_form(response: AdminResponse) -> ChangeFormPage {
        match response {
            AdminResponse::Page(Page::ChangeForm(page)) => page,
            other => panic!("expected change form, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_base_model_fails_fast() {
        let result = ChildAdmin::new(car(), None, ChildAdminConfig::default());
        assert!(matches!(result, Err(AppError::MissingBaseModel { .. })));
    }

    #[test]
    fn test_config_derivation_by_override() {
        let base =
            ChildAdminConfig::default().with_fieldsets(vec![Fieldset::new("Main", ["name"])]);
        let derived = base.clone().shown_in_index(true);

        assert_eq!(derived.base_fieldsets, base.base_fieldsets);
        assert!(derived.show_in_index);
        assert!(!base.show_in_index);
    }

    #[test]
    fn test_breadcrumbs_name_parent() {
        let admin = car_admin();
        let trail = admin.breadcrumbs(BreadcrumbTrail::default_for(admin.model(), "Change car"));

        let segments = trail.segments();
        assert_eq!(segments[0].label, "Home");
        assert_eq!(segments[1].label, "Vehicles");
        assert_eq!(segments[1].link, "/admin/shop/vehicle");
        assert_eq!(segments[2].label, "Change car");
    }

    #[test]
    fn test_clean_validates_kinds_and_required() {
        let admin = ChildAdmin::new(
            ModelMeta::child_of(&vehicle(), "car", "Car")
                .with_field(FieldDef::integer("doors").required()),
            Some(Arc::new(vehicle())),
            ChildAdminConfig::default(),
        )
        .unwrap();

        let values = admin
            .clean(&form(&[("name", "Beetle"), ("doors", "2"), ("polymorphic_ctype", "shop.boat")]))
            .unwrap();
        assert_eq!(Value::Object(values), json!({"name": "Beetle", "doors": 2}));

        let errors = admin.clean(&form(&[("doors", "two")])).unwrap_err();
        assert_eq!(errors["name"], "This field is required.");
        assert_eq!(errors["doors"], "Enter a whole number.");
    }

    #[tokio::test]
    async fn test_change_view_renders_reconciled_fields() {
        let mut repo = MockRecordRepository::new();
        repo.expect_get()
            .withf(|base, pk| base.model_name == "vehicle" && pk == "1")
            .times(1)
            .returning(|_, pk| Ok(Some(car_record(pk))));

        let page = change_form(
            car_admin()
                .change_view(&repo, "1", &AdminRequest::get(HashMap::new()))
                .await
                .unwrap(),
        );

        let groups: Vec<(String, Vec<String>)> = page
            .fieldsets
            .iter()
            .map(|fs| (fs.name.clone(), fs.rows.iter().map(|r| r.name.clone()).collect()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("Main".to_string(), vec!["name".to_string()]),
                ("Car fields".to_string(), vec!["doors".to_string()]),
            ]
        );
        assert_eq!(page.fieldsets[0].rows[0].value, "Beetle");
        assert_eq!(page.templates[0], "admin/shop/car/change_form.html");
        assert_eq!(page.delete_url.as_deref(), Some("/admin/shop/car/1/delete"));
    }

    #[tokio::test]
    async fn test_change_view_rejects_record_of_other_type() {
        let mut repo = MockRecordRepository::new();
        repo.expect_get().times(1).returning(|_, pk| {
            Ok(Some(Record::new(pk, ModelKey::new("shop", "boat"), Map::new())))
        });

        let result = car_admin()
            .change_view(&repo, "2", &AdminRequest::get(HashMap::new()))
            .await;
        assert!(matches!(result, Err(AppError::UnknownRecord { .. })));
    }

    #[tokio::test]
    async fn test_add_view_post_creates_with_own_discriminator() {
        let mut repo = MockRecordRepository::new();
        repo.expect_create()
            .withf(|new| {
                new.ctype == ModelKey::new("shop", "car")
                    && new.base == ModelKey::new("shop", "vehicle")
                    && new.values.get("doors") == Some(&json!(4))
            })
            .times(1)
            .returning(|new| Ok(Record::new("10", new.ctype, new.values)));

        let request = AdminRequest::post(
            HashMap::new(),
            form(&[("name", "Golf"), ("doors", "4"), ("polymorphic_ctype", "shop.boat")]),
        );
        let response = car_admin().add_view(&repo, &request).await.unwrap();

        assert_eq!(response, AdminResponse::Redirect("/admin/shop/vehicle".to_string()));
    }

    #[tokio::test]
    async fn test_add_view_invalid_post_redisplays_form() {
        let repo = MockRecordRepository::new();
        let request = AdminRequest::post(HashMap::new(), form(&[("doors", "many")]));

        let page = change_form(car_admin().add_view(&repo, &request).await.unwrap());

        assert!(page.has_errors);
        let doors = &page.fieldsets[1].rows[0];
        assert_eq!(doors.value, "many");
        assert_eq!(doors.error, "Enter a whole number.");
    }

    #[tokio::test]
    async fn test_invalid_post_keeps_typed_text() {
        let repo = MockRecordRepository::new();
        let request =
            AdminRequest::post(HashMap::new(), form(&[("name", "on"), ("doors", "many")]));

        let page = change_form(car_admin().add_view(&repo, &request).await.unwrap());

        let name = page
            .fieldsets
            .iter()
            .flat_map(|fs| fs.rows.iter())
            .find(|row| row.name == "name")
            .unwrap();
        assert_eq!(name.value, "on");
        assert!(!name.checked);
    }

    #[tokio::test]
    async fn test_delete_view_post_deletes() {
        let mut repo = MockRecordRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_, pk| Ok(Some(car_record(pk))));
        repo.expect_delete()
            .withf(|_, pk| pk == "3")
            .times(1)
            .returning(|_, _| Ok(true));

        let request = AdminRequest::post(HashMap::new(), HashMap::new());
        let response = car_admin().delete_view(&repo, "3", &request).await.unwrap();
        assert_eq!(response, AdminResponse::Redirect("/admin/shop/vehicle".to_string()));
    }

    #[tokio::test]
    async fn test_delete_view_get_confirms() {
        let mut repo = MockRecordRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_, pk| Ok(Some(car_record(pk))));

        let response = car_admin()
            .delete_view(&repo, "3", &AdminRequest::get(HashMap::new()))
            .await
            .unwrap();

        match response {
            AdminResponse::Page(Page::DeleteConfirmation(page)) => {
                assert_eq!(page.object_label, "Beetle");
                assert_eq!(page.breadcrumbs.segments()[1].label, "Vehicles");
                assert_eq!(page.templates[1], "admin/shop/vehicle/delete_confirmation.html");
            }
            other => panic!("expected delete confirmation, got {other:?}"),
        }
    }
}
