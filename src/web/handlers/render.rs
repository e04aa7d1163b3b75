//! Turns admin pages into HTML responses.

use crate::admin::templates::{Layout, TemplateResolver};
use crate::admin::view::{ChangeFormPage, ChangeListPage, DeletePage, SelectTypePage};
use crate::admin::{AdminResponse, AdminSite, Page};
use crate::error::AppError;
use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};

#[derive(Template, WebTemplate)]
#[template(path = "admin/change_list.html")]
pub struct ChangeListTemplate {
    pub page: ChangeListPage,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/select_type.html")]
pub struct SelectTypeTemplate {
    pub page: SelectTypePage,
}

/// Fieldsets rendered as stacked label/input rows.
#[derive(Template, WebTemplate)]
#[template(path = "admin/change_form.html")]
pub struct ChangeFormTemplate {
    pub page: ChangeFormPage,
    pub template_path: String,
    pub delete_url: String,
}

/// Fieldsets rendered as table rows.
#[derive(Template, WebTemplate)]
#[template(path = "admin/change_form_tabular.html")]
pub struct ChangeFormTabularTemplate {
    pub page: ChangeFormPage,
    pub template_path: String,
    pub delete_url: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/delete_confirmation.html")]
pub struct DeleteConfirmationTemplate {
    pub page: DeletePage,
    pub template_path: String,
}

/// Renders an admin response.
///
/// Change form and delete pages go through the site's template set: the
/// first candidate path present decides the layout.
pub fn render(site: &AdminSite, response: AdminResponse) -> Result<Response, AppError> {
    let page = match response {
        AdminResponse::Redirect(location) => return Ok(Redirect::to(&location).into_response()),
        AdminResponse::Page(page) => page,
    };

    let response = match page {
        Page::ChangeList(page) => ChangeListTemplate { page }.into_response(),
        Page::SelectType(page) => SelectTypeTemplate { page }.into_response(),
        Page::ChangeForm(page) => {
            let (template_path, layout) = resolve(site, &page.templates)?;
            let delete_url = page.delete_url.clone().unwrap_or_default();
            match layout {
                Layout::Stacked => ChangeFormTemplate {
                    page,
                    template_path,
                    delete_url,
                }
                .into_response(),
                Layout::Tabular => ChangeFormTabularTemplate {
                    page,
                    template_path,
                    delete_url,
                }
                .into_response(),
            }
        }
        Page::DeleteConfirmation(page) => {
            let (template_path, _) = resolve(site, &page.templates)?;
            DeleteConfirmationTemplate {
                page,
                template_path,
            }
            .into_response()
        }
    };

    Ok(response)
}

fn resolve(site: &AdminSite, candidates: &[String]) -> Result<(String, Layout), AppError> {
    match site.templates().resolve(candidates) {
        Some(resolved) => {
            tracing::debug!(
                template = %resolved.path,
                layout = ?resolved.layout,
                "Template resolved"
            );
            Ok((resolved.path, resolved.layout))
        }
        None => Err(AppError::internal(
            "No template available",
            serde_json::json!({"candidates": candidates}),
        )),
    }
}
