//! Field reconciliation between a child admin's declarations and its model.
//!
//! A child admin usually declares its layout in terms of the base type's
//! fields. Reconciliation appends whatever the concrete type adds as a
//! synthesized group, so subtype fields never have to be listed by hand.

use crate::domain::entities::{FieldDef, Fieldset, FormSpec, ModelMeta};
use std::collections::HashSet;

/// Effective form and layout for one concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub form: FormSpec,
    pub fieldsets: Vec<Fieldset>,
}

/// Label of the synthesized group holding fields not placed by the base layout.
pub fn extra_fieldset_name(concrete: &ModelMeta) -> String {
    format!("{} fields", concrete.verbose_name)
}

/// Computes the effective form and fieldsets for `concrete`.
///
/// Pure: identical inputs always produce identical output.
///
/// - Names in `base_fieldsets` that `concrete` lacks, or that are the primary
///   key or discriminator, are dropped; groups left empty are dropped too.
/// - A name listed in more than one base group stays in the first one.
/// - Every remaining editable field of `concrete`, in natural order, goes
///   into one trailing collapsible group named by [`extra_fieldset_name`].
/// - The form covers exactly the fields placed in the fieldsets. Declarations
///   from `base_form` win over the model's own; fields `base_form` declares
///   that `concrete` lacks fall out of scope.
pub fn reconcile(
    base_form: Option<&FormSpec>,
    base_fieldsets: &[Fieldset],
    concrete: &ModelMeta,
) -> Reconciled {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut fieldsets = Vec::with_capacity(base_fieldsets.len() + 1);

    for group in base_fieldsets {
        let mut fields = Vec::with_capacity(group.fields.len());
        for name in &group.fields {
            if concrete.field(name).is_some()
                && !concrete.is_reserved(name)
                && placed.insert(name.as_str())
            {
                fields.push(name.clone());
            }
        }

        if !fields.is_empty() {
            fieldsets.push(Fieldset {
                name: group.name.clone(),
                fields,
                collapsible: group.collapsible,
            });
        }
    }

    let extra: Vec<String> = concrete
        .editable_fields()
        .filter(|f| !placed.contains(f.name.as_str()))
        .map(|f| f.name.clone())
        .collect();

    if !extra.is_empty() {
        fieldsets.push(Fieldset::new(extra_fieldset_name(concrete), extra).collapsible());
    }

    let form_fields: Vec<FieldDef> = fieldsets
        .iter()
        .flat_map(|group| group.fields.iter())
        .filter_map(|name| {
            base_form
                .and_then(|form| form.field(name))
                .or_else(|| concrete.field(name))
                .cloned()
        })
        .collect();

    let form_name = base_form
        .map(|form| form.name.clone())
        .unwrap_or_else(|| format!("{}Form", concrete.verbose_name.replace(' ', "")));

    Reconciled {
        form: FormSpec::new(form_name, form_fields),
        fieldsets,
    }
}
