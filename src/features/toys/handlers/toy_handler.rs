use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::core::extractor::EntityId;
use crate::core::state::AppState;
use crate::core::templates::render;
use crate::features::categories::models::Category;
use crate::features::toys::dtos::{category_options, image_errors, ToyForm, ToyView};
use crate::features::toys::extractor::ToySubmission;
use crate::features::toys::models::{NewToy, Toy};
use crate::modules::storage::ImageUpload;
use crate::shared::constants::TOYS_URL;
use crate::shared::types::found;

const CREATE_ACTION: &str = "/catalog/toys/create";

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Toy {} not found", id))
}

async fn load_toy(state: &AppState, id: i32) -> Result<Toy> {
    state.store.get_toy(id).await?.ok_or_else(|| not_found(id))
}

struct FormPage<'a> {
    title: &'a str,
    action: &'a str,
    current_image: Option<&'a str>,
}

fn render_form(
    page: &FormPage<'_>,
    form: &ToyForm,
    categories: &[Category],
    errors: &[String],
) -> Result<Response> {
    Ok(render(
        "toy_form.html",
        context! {
            title => page.title,
            action => page.action,
            toy => form,
            image => page.current_image,
            categories => category_options(categories, &form.category),
            errors,
        },
    )?
    .into_response())
}

/// Validate a submission against the known categories.
///
/// Returns the typed toy, or every message to show on the form.
fn check_submission(
    form: &ToyForm,
    image: Option<&ImageUpload>,
    categories: &[Category],
) -> std::result::Result<NewToy, Vec<String>> {
    let parsed = form.parse();
    let mut errors = match &parsed {
        Ok(_) => Vec::new(),
        Err(errors) => errors.clone(),
    };

    for name in &form.category {
        let lowered = name.to_lowercase();
        if !categories.iter().any(|c| c.name.to_lowercase() == lowered) {
            errors.push(format!("Unknown category '{}'", name));
        }
    }
    if let Some(image) = image {
        errors.extend(image_errors(image));
    }

    match parsed {
        Ok(toy) if errors.is_empty() => Ok(toy),
        _ => Err(errors),
    }
}

async fn upload_image(state: &AppState, image: Option<ImageUpload>) -> Result<Option<String>> {
    match image {
        Some(image) => Ok(Some(state.images.upload(image).await?)),
        None => Ok(None),
    }
}

/// Best-effort removal of a stored image
async fn discard_image(state: &AppState, url: Option<&str>) {
    if let Some(url) = url {
        if let Err(e) = state.images.delete_by_url(url).await {
            warn!("Failed to delete image {}: {}", url, e);
        }
    }
}

/// GET /catalog
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let (toy_count, category_count) =
        tokio::try_join!(state.store.count_toys(), state.store.count_categories())?;

    Ok(render(
        "index.html",
        context! {
            title => "Toy Inventory Home",
            toy_count,
            category_count,
        },
    )?)
}

/// GET /catalog/toys
pub async fn toy_list(State(state): State<AppState>) -> Result<Html<String>> {
    let toys: Vec<ToyView> = state
        .store
        .list_toys()
        .await?
        .iter()
        .map(ToyView::from)
        .collect();

    Ok(render("toy_list.html", context! { title => "All Toys", toys })?)
}

/// GET /catalog/toys/{id}
pub async fn toy_detail(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Html<String>> {
    let toy = load_toy(&state, id).await?;

    Ok(render(
        "toy_detail.html",
        context! { title => "Toy Details", toy => ToyView::from(&toy) },
    )?)
}

/// GET /catalog/toys/create
pub async fn toy_create_get(State(state): State<AppState>) -> Result<Response> {
    let categories = state.store.list_categories().await?;
    let page = FormPage {
        title: "Create Toy",
        action: CREATE_ACTION,
        current_image: None,
    };

    render_form(&page, &ToyForm::default(), &categories, &[])
}

/// POST /catalog/toys/create
pub async fn toy_create_post(
    State(state): State<AppState>,
    submission: ToySubmission,
) -> Result<Response> {
    let form = submission.form.normalize();
    let categories = state.store.list_categories().await?;

    let mut new_toy = match check_submission(&form, submission.image.as_ref(), &categories) {
        Ok(toy) => toy,
        Err(errors) => {
            let page = FormPage {
                title: "Create Toy",
                action: CREATE_ACTION,
                current_image: None,
            };
            return render_form(&page, &form, &categories, &errors);
        }
    };

    new_toy.image = upload_image(&state, submission.image).await?;
    let uploaded = new_toy.image.clone();

    match state.store.create_toy(new_toy).await {
        Ok(toy) => {
            info!("Toy created: id={}, name={}", toy.id, toy.name);
            Ok(found(&toy.url()))
        }
        Err(e) => {
            discard_image(&state, uploaded.as_deref()).await;
            Err(e)
        }
    }
}

/// GET /catalog/toys/{id}/update
pub async fn toy_update_get(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    let (toy, categories) = tokio::try_join!(load_toy(&state, id), state.store.list_categories())?;
    let action = format!("{}/update", toy.url());
    let page = FormPage {
        title: "Update Toy",
        action: &action,
        current_image: toy.image.as_deref(),
    };

    render_form(&page, &ToyForm::from(&toy), &categories, &[])
}

/// POST /catalog/toys/{id}/update
///
/// Categories are replaced by exactly the submitted set. Without a new
/// image the stored one is kept.
pub async fn toy_update_post(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    submission: ToySubmission,
) -> Result<Response> {
    let (existing, categories) =
        tokio::try_join!(load_toy(&state, id), state.store.list_categories())?;
    let form = submission.form.normalize();

    let mut new_toy = match check_submission(&form, submission.image.as_ref(), &categories) {
        Ok(toy) => toy,
        Err(errors) => {
            let action = format!("{}/update", existing.url());
            let page = FormPage {
                title: "Update Toy",
                action: &action,
                current_image: existing.image.as_deref(),
            };
            return render_form(&page, &form, &categories, &errors);
        }
    };

    new_toy.image = upload_image(&state, submission.image).await?;
    let uploaded = new_toy.image.clone();

    match state.store.update_toy(id, new_toy).await {
        Ok(toy) => {
            info!("Toy updated: id={}", toy.id);
            if uploaded.is_some() && existing.image != uploaded {
                discard_image(&state, existing.image.as_deref()).await;
            }
            Ok(found(&toy.url()))
        }
        Err(e) => {
            discard_image(&state, uploaded.as_deref()).await;
            Err(e)
        }
    }
}

/// GET /catalog/toys/{id}/delete
pub async fn toy_delete_get(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Html<String>> {
    let toy = load_toy(&state, id).await?;

    Ok(render(
        "toy_delete.html",
        context! { title => "Delete Toy", toy => ToyView::from(&toy) },
    )?)
}

/// POST /catalog/toys/{id}/delete
pub async fn toy_delete_post(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    let toy = load_toy(&state, id).await?;

    state.store.delete_toy(id).await?;
    info!("Toy deleted: id={}, name={}", toy.id, toy.name);

    discard_image(&state, toy.image.as_deref()).await;
    Ok(found(TOYS_URL))
}
