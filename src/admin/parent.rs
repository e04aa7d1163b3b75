//! Admin handler for a polymorphic base type.

use crate::admin::child::ChildAdmin;
use crate::admin::dispatcher::{DEFAULT_PK_PATTERN, Dispatcher};
use crate::admin::filter::TypeFilter;
use crate::admin::registry::TypeRegistry;
use crate::admin::view::{
    AdminRequest, AdminResponse, ChangeListPage, ChangeListRow, Page, SelectTypePage, TypeChoice,
};
use crate::domain::entities::{BreadcrumbTrail, ModelKey, ModelMeta, Record, RecordQuery};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use serde_json::json;
use std::sync::Arc;

/// Form/query parameter naming the concrete type on the add flow.
pub const TYPE_CHOICE_PARAM: &str = "ct";

/// Options of a parent admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentAdminConfig {
    /// When true, the change list materializes every record as its concrete
    /// type so subtype fields can be shown. Costs a full fetch per record.
    pub polymorphic_list: bool,
    /// Regex a primary key in the URL must match in full.
    pub pk_pattern: String,
    /// Shows the type filter on the change list.
    pub list_filter: bool,
}

impl Default for ParentAdminConfig {
    fn default() -> Self {
        Self {
            polymorphic_list: false,
            pk_pattern: DEFAULT_PK_PATTERN.to_string(),
            list_filter: false,
        }
    }
}

/// Lists a base type's records and forwards per-record operations to the
/// child admin of each record's concrete type.
#[derive(Debug)]
pub struct ParentAdmin {
    model: Arc<ModelMeta>,
    config: ParentAdminConfig,
    registry: TypeRegistry,
    dispatcher: Dispatcher,
}

impl ParentAdmin {
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `config.pk_pattern` does not compile.
    pub fn new(model: Arc<ModelMeta>, config: ParentAdminConfig) -> Result<Self, AppError> {
        let dispatcher = Dispatcher::new(&config.pk_pattern)?;
        Ok(Self {
            registry: TypeRegistry::new(model.clone()),
            model,
            config,
            dispatcher,
        })
    }

    /// Adds a child type. Only callable while the site is being built.
    pub(crate) fn register_child(&mut self, child: Arc<ChildAdmin>) -> Result<(), AppError> {
        let show_in_index = child.show_in_index();
        self.registry.register(child, show_in_index)
    }

    pub fn model(&self) -> &ModelMeta {
        &self.model
    }

    pub fn config(&self) -> &ParentAdminConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn type_filter(&self) -> Option<TypeFilter> {
        self.config
            .list_filter
            .then(|| TypeFilter::from_registry(&self.registry))
    }

    /// Routes a sub-path of this model's change list.
    pub async fn dispatch(
        &self,
        repository: &dyn RecordRepository,
        path: &str,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        self.dispatcher.dispatch(self, repository, path, request).await
    }

    /// Records for the change list.
    ///
    /// Unless `polymorphic_list` is set, only base type fields are fetched,
    /// whatever the number of records or the mix of concrete types.
    pub async fn get_queryset(
        &self,
        repository: &dyn RecordRepository,
        ctype: Option<ModelKey>,
    ) -> Result<Vec<Record>, AppError> {
        let query = RecordQuery {
            polymorphic: self.config.polymorphic_list,
            ctype,
            ..RecordQuery::base_only(&self.model)
        };
        repository.query(&query).await
    }

    /// `GET ""`: the base type's change list.
    pub async fn changelist_view(
        &self,
        repository: &dyn RecordRepository,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let filter = self.type_filter();
        let selected = match &filter {
            Some(filter) => filter.selected(request)?,
            None => None,
        };

        let records = self.get_queryset(repository, selected.clone()).await?;

        let base_fields: Vec<_> = self.model.editable_fields().collect();
        let mut columns = vec!["ID".to_string(), "Type".to_string()];
        columns.extend(base_fields.iter().map(|f| f.display_label()));
        if self.config.polymorphic_list {
            columns.push("Details".to_string());
        }

        let rows = records
            .iter()
            .map(|record| {
                let mut cells: Vec<String> =
                    base_fields.iter().map(|f| record.display(&f.name)).collect();
                if self.config.polymorphic_list {
                    cells.push(self.details(record));
                }
                ChangeListRow {
                    pk: record.pk.clone(),
                    type_label: self.type_label(&record.ctype),
                    cells,
                    change_url: self.model.key.change_url(&record.pk),
                    delete_url: self.model.key.delete_url(&record.pk),
                }
            })
            .collect();

        Ok(AdminResponse::Page(Page::ChangeList(ChangeListPage {
            title: format!("Select {} to change", self.model.verbose_name.to_lowercase()),
            model: self.model.key.clone(),
            breadcrumbs: self.trail(self.model.verbose_name_plural.clone()),
            columns,
            rows,
            filter: filter
                .map(|f| f.options(selected.as_ref()))
                .unwrap_or_default(),
            add_url: self.model.key.add_url(),
        })))
    }

    /// `GET|POST add`: type selection, then a redirect to the chosen child's
    /// own add view.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the chosen type is not registered.
    pub async fn add_view(&self, request: &AdminRequest) -> Result<AdminResponse, AppError> {
        let Some(choice) = request.param(TYPE_CHOICE_PARAM) else {
            return Ok(AdminResponse::Page(Page::SelectType(self.select_type_page())));
        };

        let ctype: ModelKey = choice.parse()?;
        match self.registry.get(&ctype) {
            Some(descriptor) => {
                tracing::debug!(model = %self.model.key, child = %ctype, "Type selected");
                Ok(AdminResponse::Redirect(descriptor.model.add_url()))
            }
            None => Err(AppError::bad_request(
                "Invalid type choice",
                json!({TYPE_CHOICE_PARAM: choice, "model": self.model.key}),
            )),
        }
    }

    /// `GET|POST {pk}/change`, forwarded to the record's child admin.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownRecord`] or [`AppError::UnregisteredType`]
    /// when the record cannot be resolved.
    pub async fn change_view(
        &self,
        repository: &dyn RecordRepository,
        pk: &str,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let descriptor = self.registry.resolve(repository, pk).await?;
        descriptor.handler.change_view(repository, pk, request).await
    }

    /// `GET|POST {pk}/delete`, forwarded to the record's child admin.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownRecord`] or [`AppError::UnregisteredType`]
    /// when the record cannot be resolved.
    pub async fn delete_view(
        &self,
        repository: &dyn RecordRepository,
        pk: &str,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let descriptor = self.registry.resolve(repository, pk).await?;
        descriptor.handler.delete_view(repository, pk, request).await
    }

    fn select_type_page(&self) -> SelectTypePage {
        SelectTypePage {
            title: format!("Add {}", self.model.verbose_name.to_lowercase()),
            breadcrumbs: self.trail(format!("Add {}", self.model.verbose_name.to_lowercase())),
            action_url: self.model.key.add_url(),
            choices: self
                .registry
                .list_types()
                .map(|d| TypeChoice {
                    label: d.label().to_string(),
                    value: d.model.to_string(),
                    url: format!("{}?{}={}", self.model.key.add_url(), TYPE_CHOICE_PARAM, d.model),
                })
                .collect(),
        }
    }

    fn trail(&self, current: String) -> BreadcrumbTrail {
        BreadcrumbTrail::default_for(&self.model, current)
    }

    fn type_label(&self, ctype: &ModelKey) -> String {
        self.registry
            .get(ctype)
            .map(|d| d.label().to_string())
            .unwrap_or_else(|| ctype.to_string())
    }

    /// Concrete-type fields of a fully materialized record.
    fn details(&self, record: &Record) -> String {
        let Some(descriptor) = self.registry.get(&record.ctype) else {
            return String::new();
        };
        descriptor
            .meta()
            .editable_fields()
            .filter(|f| self.model.field(&f.name).is_none())
            .map(|f| format!("{}: {}", f.display_label(), record.display(&f.name)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
