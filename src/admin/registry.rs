//! Per-base-type registry of concrete child types.
//!
//! Subtype dispatch is an explicit lookup table keyed by the discriminator
//! value ([`ModelKey`]) rather than anything resembling inheritance. A
//! registry is filled while the site is being built and is read-only once
//! the [`crate::admin::AdminSite`] is frozen.

use crate::admin::child::ChildAdmin;
use crate::domain::entities::{ModelKey, ModelMeta};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use indexmap::IndexMap;
use std::sync::Arc;

/// One registered concrete type.
#[derive(Debug, Clone)]
pub struct ChildTypeDescriptor {
    pub model: ModelKey,
    pub handler: Arc<ChildAdmin>,
    /// Whether the child's own entry appears in the site index.
    pub show_in_index: bool,
}

impl ChildTypeDescriptor {
    pub fn meta(&self) -> &ModelMeta {
        self.handler.model()
    }

    pub fn label(&self) -> &str {
        &self.handler.model().verbose_name
    }
}

/// Ordered mapping from discriminator to child descriptor for one base type.
///
/// Iteration order is registration order, which is the order types are
/// offered on the type-selection page and in the type filter.
#[derive(Debug)]
pub struct TypeRegistry {
    base: Arc<ModelMeta>,
    types: IndexMap<ModelKey, ChildTypeDescriptor>,
}

impl TypeRegistry {
    pub fn new(base: Arc<ModelMeta>) -> Self {
        Self {
            base,
            types: IndexMap::new(),
        }
    }

    pub fn base(&self) -> &ModelMeta {
        &self.base
    }

    /// Adds a child type.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateRegistration`] if the concrete type is
    /// already registered here.
    /// Returns [`AppError::NotASubtype`] if the handler's model is not a
    /// specialization of this registry's base type.
    pub fn register(
        &mut self,
        handler: Arc<ChildAdmin>,
        show_in_index: bool,
    ) -> Result<(), AppError> {
        let concrete = handler.model().key.clone();

        if self.types.contains_key(&concrete) {
            return Err(AppError::DuplicateRegistration {
                base: self.base.key.clone(),
                concrete,
            });
        }

        if !self.is_specialization(&handler) {
            return Err(AppError::NotASubtype {
                base: self.base.key.clone(),
                concrete,
            });
        }

        tracing::debug!(base = %self.base.key, child = %concrete, "Registered child type");

        self.types.insert(
            concrete.clone(),
            ChildTypeDescriptor {
                model: concrete,
                handler,
                show_in_index,
            },
        );
        Ok(())
    }

    /// A child is a specialization when it names this base as its base
    /// model, descends from it, and carries every base field.
    fn is_specialization(&self, handler: &ChildAdmin) -> bool {
        let concrete = handler.model();
        handler.base_model().key == self.base.key
            && concrete.descends_from(&self.base.key)
            && self
                .base
                .fields
                .iter()
                .all(|f| concrete.field(&f.name).is_some())
    }

    pub fn get(&self, ctype: &ModelKey) -> Option<&ChildTypeDescriptor> {
        self.types.get(ctype)
    }

    pub fn contains(&self, ctype: &ModelKey) -> bool {
        self.types.contains_key(ctype)
    }

    /// Descriptors in registration order.
    pub fn list_types(&self) -> impl ExactSizeIterator<Item = &ChildTypeDescriptor> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolves the record `pk` to the descriptor of its concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownRecord`] if the record does not exist.
    /// Returns [`AppError::UnregisteredType`] if its discriminator names a
    /// type not registered here.
    pub async fn resolve(
        &self,
        repository: &dyn RecordRepository,
        pk: &str,
    ) -> Result<&ChildTypeDescriptor, AppError> {
        let base = &self.base.key;

        let Some(ctype) = repository.fetch_discriminator(base, pk).await? else {
            tracing::warn!(%base, pk, "Record not found");
            return Err(AppError::UnknownRecord {
                base: base.clone(),
                pk: pk.to_string(),
            });
        };

        match self.types.get(&ctype) {
            Some(descriptor) => {
                tracing::debug!(%base, pk, child = %ctype, "Resolved concrete type");
                Ok(descriptor)
            }
            None => {
                tracing::warn!(%base, pk, discriminator = %ctype, "Record has unregistered type");
                Err(AppError::UnregisteredType {
                    base: base.clone(),
                    pk: pk.to_string(),
                    ctype,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::child::ChildAdminConfig;
    use crate::admin::test_support::{boat, car, child_admin, vehicle};
    use crate::domain::entities::FieldDef;
    use crate::domain::repositories::MockRecordRepository;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new(Arc::new(vehicle()));
        registry.register(child_admin(car()), false).unwrap();
        registry.register(child_admin(boat()), true).unwrap();
        registry
    }

    #[test]
    fn test_list_types_in_registration_order() {
        let registry = registry();
        let labels: Vec<_> = registry.list_types().map(|d| d.label().to_string()).collect();
        assert_eq!(labels, vec!["Car", "Boat"]);

        let visible: Vec<_> = registry.list_types().map(|d| d.show_in_index).collect();
        assert_eq!(visible, vec![false, true]);
    }

    #[test]
    fn test_duplicate_registration_fails_in_any_order() {
        for order in [[car(), boat()], [boat(), car()]] {
            let mut registry = TypeRegistry::new(Arc::new(vehicle()));
            for meta in order.iter().cloned() {
                registry.register(child_admin(meta), false).unwrap();
            }
            for meta in order {
                let result = registry.register(child_admin(meta), false);
                assert!(matches!(result, Err(AppError::DuplicateRegistration { .. })));
            }
            assert_eq!(registry.len(), 2);
        }
    }

    #[test]
    fn test_register_rejects_non_subtype() {
        let mut registry = TypeRegistry::new(Arc::new(vehicle()));

        // Missing the inherited `name` field.
        let mut stray = car();
        stray.fields.retain(|f| f.name != "name");
        let handler = Arc::new(
            ChildAdmin::new(stray, Some(Arc::new(vehicle())), ChildAdminConfig::default()).unwrap(),
        );
        assert!(matches!(
            registry.register(handler, false),
            Err(AppError::NotASubtype { .. })
        ));

        // The base type itself.
        let handler = Arc::new(
            ChildAdmin::new(vehicle(), Some(Arc::new(vehicle())), ChildAdminConfig::default())
                .unwrap(),
        );
        assert!(matches!(
            registry.register(handler, false),
            Err(AppError::NotASubtype { .. })
        ));
    }

    #[test]
    fn test_register_rejects_other_hierarchy() {
        let mut registry = TypeRegistry::new(Arc::new(vehicle()));
        let animal = ModelMeta::new(ModelKey::new("zoo", "animal"), "Animal")
            .with_field(FieldDef::text("name").required());

        // Same field names as the base, different hierarchy.
        let dog = ModelMeta::child_of(&animal, "dog", "Dog");
        let handler = Arc::new(
            ChildAdmin::new(dog, Some(Arc::new(vehicle())), ChildAdminConfig::default()).unwrap(),
        );
        assert!(matches!(
            registry.register(handler, false),
            Err(AppError::NotASubtype { .. })
        ));

        // A `car` key that actually specializes the animal.
        let mut impostor = ModelMeta::child_of(&animal, "car", "Car");
        impostor.key = ModelKey::new("shop", "car");
        let handler = Arc::new(
            ChildAdmin::new(impostor, Some(Arc::new(vehicle())), ChildAdminConfig::default())
                .unwrap(),
        );
        assert!(matches!(
            registry.register(handler, false),
            Err(AppError::NotASubtype { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_accepts_grandchild() {
        let sports = ModelMeta::child_of(&car(), "sportscar", "Sports car")
            .with_field(FieldDef::integer("top_speed"));
        let mut registry = TypeRegistry::new(Arc::new(vehicle()));
        assert!(registry.register(child_admin(sports), false).is_ok());
    }

    #[tokio::test]
    async fn test_resolve_returns_matching_descriptor() {
        let registry = registry();

        for ctype in [car().key, boat().key] {
            let mut repo = MockRecordRepository::new();
            let returned = ctype.clone();
            repo.expect_fetch_discriminator()
                .withf(|base, pk| base.model_name == "vehicle" && pk == "5")
                .times(1)
                .returning(move |_, _| Ok(Some(returned.clone())));

            let descriptor = registry.resolve(&repo, "5").await.unwrap();
            assert_eq!(descriptor.model, ctype);
        }
    }

    #[tokio::test]
    async fn test_resolve_unknown_record() {
        let registry = registry();
        let mut repo = MockRecordRepository::new();
        repo.expect_fetch_discriminator()
            .times(1)
            .returning(|_, _| Ok(None));

        let result = registry.resolve(&repo, "404").await;
        assert!(matches!(result, Err(AppError::UnknownRecord { .. })));
    }

    #[tokio::test]
    async fn test_resolve_unregistered_type() {
        let registry = registry();
        let mut repo = MockRecordRepository::new();
        repo.expect_fetch_discriminator()
            .times(1)
            .returning(|_, _| Ok(Some(ModelKey::new("shop", "plane"))));

        match registry.resolve(&repo, "9").await {
            Err(AppError::UnregisteredType { ctype, pk, .. }) => {
                assert_eq!(ctype, ModelKey::new("shop", "plane"));
                assert_eq!(pk, "9");
            }
            other => panic!("expected UnregisteredType, got {other:?}"),
        }
    }
}
