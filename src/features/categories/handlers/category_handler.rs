use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Form,
};
use minijinja::context;

use crate::core::error::{AppError, Result};
use crate::core::extractor::EntityId;
use crate::core::state::AppState;
use crate::core::templates::render;
use crate::features::categories::dtos::{CategoryForm, CategoryView};
use crate::features::categories::models::Category;
use crate::features::toys::dtos::ToySummaryView;
use crate::shared::constants::CATEGORIES_URL;
use crate::shared::types::found;

const CREATE_ACTION: &str = "/catalog/categories/create";

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

fn duplicate_name(name: &str) -> String {
    format!("A category named '{}' already exists", name)
}

fn render_form(title: &str, action: &str, form: &CategoryForm, errors: &[String]) -> Result<Response> {
    Ok(render(
        "category_form.html",
        context! { title, action, category => form, errors },
    )?
    .into_response())
}

async fn load_with_toys(state: &AppState, id: i32) -> Result<(Category, Vec<ToySummaryView>)> {
    let (category, toys) = tokio::try_join!(
        state.store.get_category(id),
        state.store.toys_in_category(id)
    )?;
    let category = category.ok_or_else(|| not_found(id))?;
    let toys = toys.iter().map(ToySummaryView::from).collect();

    Ok((category, toys))
}

fn render_delete(category: &Category, toys: Vec<ToySummaryView>) -> Result<Response> {
    Ok(render(
        "category_delete.html",
        context! {
            title => "Delete Category",
            category => CategoryView::from(category),
            toys,
        },
    )?
    .into_response())
}

/// GET /catalog/categories
pub async fn category_list(State(state): State<AppState>) -> Result<Html<String>> {
    let categories: Vec<CategoryView> = state
        .store
        .list_categories()
        .await?
        .iter()
        .map(CategoryView::from)
        .collect();

    Ok(render(
        "category_list.html",
        context! { title => "All Categories", categories },
    )?)
}

/// GET /catalog/categories/{id}
pub async fn category_detail(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Html<String>> {
    let (category, toys) = load_with_toys(&state, id).await?;

    Ok(render(
        "category_detail.html",
        context! {
            title => "Category Details",
            category => CategoryView::from(&category),
            toys,
        },
    )?)
}

/// GET /catalog/categories/create
pub async fn category_create_get() -> Result<Response> {
    render_form(
        "Create Category",
        CREATE_ACTION,
        &CategoryForm::default(),
        &[],
    )
}

/// POST /catalog/categories/create
///
/// A name that already exists (ignoring case) redirects to the existing
/// category instead of creating a second one.
pub async fn category_create_post(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let form = form.normalize();
    let errors = form.errors();
    if !errors.is_empty() {
        return render_form("Create Category", CREATE_ACTION, &form, &errors);
    }

    if let Some(existing) = state.store.find_category_by_name(&form.name).await? {
        tracing::info!(
            "Category '{}' already exists as id={}, redirecting",
            form.name,
            existing.id
        );
        return Ok(found(&existing.url()));
    }

    match state
        .store
        .create_category(&form.name, &form.description)
        .await
    {
        Ok(category) => Ok(found(&category.url())),
        // Lost a race with a concurrent insert of the same name
        Err(AppError::Conflict(_)) => {
            let existing = state
                .store
                .find_category_by_name(&form.name)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("Conflicting category '{}' not found", form.name))
                })?;
            Ok(found(&existing.url()))
        }
        Err(e) => Err(e),
    }
}

/// GET /catalog/categories/{id}/update
pub async fn category_update_get(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    let category = state
        .store
        .get_category(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    render_form(
        "Update Category",
        &format!("{}/update", category.url()),
        &CategoryForm::from(&category),
        &[],
    )
}

/// POST /catalog/categories/{id}/update
pub async fn category_update_post(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    if state.store.get_category(id).await?.is_none() {
        return Err(not_found(id));
    }

    let action = format!("{}/update", Category::url_for(id));
    let form = form.normalize();
    let errors = form.errors();
    if !errors.is_empty() {
        return render_form("Update Category", &action, &form, &errors);
    }

    if let Some(other) = state.store.find_category_by_name(&form.name).await? {
        if other.id != id {
            return render_form(
                "Update Category",
                &action,
                &form,
                &[duplicate_name(&other.name)],
            );
        }
    }

    match state
        .store
        .update_category(id, &form.name, &form.description)
        .await
    {
        Ok(category) => Ok(found(&category.url())),
        Err(AppError::Conflict(_)) => render_form(
            "Update Category",
            &action,
            &form,
            &[duplicate_name(&form.name)],
        ),
        Err(e) => Err(e),
    }
}

/// GET /catalog/categories/{id}/delete
pub async fn category_delete_get(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    let (category, toys) = load_with_toys(&state, id).await?;
    render_delete(&category, toys)
}

/// POST /catalog/categories/{id}/delete
///
/// Refuses while any toy still belongs to the category and lists those toys.
pub async fn category_delete_post(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    let (category, toys) = load_with_toys(&state, id).await?;

    if !toys.is_empty() {
        tracing::info!(
            "Refusing to delete category id={}: {} toys still linked",
            id,
            toys.len()
        );
        return render_delete(&category, toys);
    }

    state.store.delete_category(id).await?;
    Ok(found(CATEGORIES_URL))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use crate::shared::test_helpers::{admin_auth, TestApp};

    #[tokio::test]
    async fn test_short_name_is_rejected_without_write() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/catalog/categories/create")
            .form(&[("name", " ab "), ("description", "Too short")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Category must have at least 3 letters"));
        assert_eq!(app.store.category_count(), 0);
    }

    #[tokio::test]
    async fn test_overlong_name_is_rejected_without_write() {
        let app = TestApp::new();
        let name = "W".repeat(101);

        let response = app
            .server
            .post("/catalog/categories/create")
            .form(&[("name", name.as_str()), ("description", "Too long a name")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Name must be at most 100 characters"));
        assert_eq!(app.store.category_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_redirects_to_existing() {
        let app = TestApp::new();

        let first = app
            .server
            .post("/catalog/categories/create")
            .form(&[("name", "Water"), ("description", "Wet toys")])
            .await;
        first.assert_status(StatusCode::FOUND);
        assert_eq!(first.header("location"), "/catalog/categories/1");

        let second = app
            .server
            .post("/catalog/categories/create")
            .form(&[("name", "water"), ("description", "Other wet toys")])
            .await;
        second.assert_status(StatusCode::FOUND);
        assert_eq!(second.header("location"), "/catalog/categories/1");
        assert_eq!(app.store.category_count(), 1);
    }

    #[tokio::test]
    async fn test_detail_lists_linked_toys() {
        let app = TestApp::seeded().await;

        let response = app.server.get("/catalog/categories/2").await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("Toys for playing in water"));
        assert!(body.contains("Water Gun"));
        assert!(!body.contains("Ball"));
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_id_is_not_found() {
        let app = TestApp::seeded().await;

        app.server
            .get("/catalog/categories/999")
            .await
            .assert_status_not_found();
        app.server
            .get("/catalog/categories/abc")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_update_requires_credentials() {
        let app = TestApp::seeded().await;

        let response = app.server.get("/catalog/categories/1/update").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.header("www-authenticate"), "Basic");

        let response = app
            .server
            .post("/catalog/categories/1/update")
            .form(&[("name", "Hacked"), ("description", "Nope")])
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_applies_changes() {
        let app = TestApp::seeded().await;

        let response = app
            .server
            .post("/catalog/categories/3/update")
            .add_header(header::AUTHORIZATION, admin_auth())
            .form(&[("name", "Garden"), ("description", "Toys for the garden")])
            .await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(response.header("location"), "/catalog/categories/3");

        let page = app.server.get("/catalog/categories/3").await.text();
        assert!(page.contains("Garden"));
        assert!(page.contains("Toys for the garden"));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_is_a_form_error() {
        let app = TestApp::seeded().await;

        let response = app
            .server
            .post("/catalog/categories/3/update")
            .add_header(header::AUTHORIZATION, admin_auth())
            .form(&[("name", "SPORTS"), ("description", "Still outdoors")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("already exists"));

        let page = app.server.get("/catalog/categories/3").await.text();
        assert!(page.contains("Outdoor"));
    }

    #[tokio::test]
    async fn test_delete_is_blocked_while_toys_remain() {
        let app = TestApp::seeded().await;

        let response = app
            .server
            .post("/catalog/categories/1/delete")
            .add_header(header::AUTHORIZATION, admin_auth())
            .await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("Delete the following toys"));
        assert!(body.contains("Ball"));
        assert!(!body.contains("Water Gun"));
        assert_eq!(app.store.category_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_empty_category() {
        let app = TestApp::seeded().await;
        app.server
            .post("/catalog/categories/create")
            .form(&[("name", "Empty"), ("description", "Nothing here")])
            .await
            .assert_status(StatusCode::FOUND);

        let confirm = app
            .server
            .get("/catalog/categories/4/delete")
            .add_header(header::AUTHORIZATION, admin_auth())
            .await;
        confirm.assert_status_ok();
        assert!(confirm.text().contains("Do you really want to delete this category?"));

        let response = app
            .server
            .post("/catalog/categories/4/delete")
            .add_header(header::AUTHORIZATION, admin_auth())
            .await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(response.header("location"), "/catalog/categories");
        assert_eq!(app.store.category_count(), 3);
    }
}
