//! HTML page rendering with Jinja2 templates.
//!
//! Templates live in `templates/` and are compiled into the binary, so the
//! server does not depend on its working directory. Names ending in `.html`
//! are auto-escaped by minijinja.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("toy_list.html", include_str!("../../templates/toy_list.html")),
    ("toy_detail.html", include_str!("../../templates/toy_detail.html")),
    ("toy_form.html", include_str!("../../templates/toy_form.html")),
    ("toy_delete.html", include_str!("../../templates/toy_delete.html")),
    (
        "category_list.html",
        include_str!("../../templates/category_list.html"),
    ),
    (
        "category_detail.html",
        include_str!("../../templates/category_detail.html"),
    ),
    (
        "category_form.html",
        include_str!("../../templates/category_form.html"),
    ),
    (
        "category_delete.html",
        include_str!("../../templates/category_delete.html"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template to a string.
pub fn render_page<S: Serialize>(template_name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Render a template as an HTML response body.
pub fn render<S: Serialize>(template_name: &str, ctx: S) -> Result<Html<String>, TemplateError> {
    render_page(template_name, ctx).map(Html)
}

/// Check if a template exists
#[cfg(test)]
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}
