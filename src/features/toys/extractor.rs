use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use tracing::debug;

use crate::core::error::AppError;
use crate::features::toys::dtos::ToyForm;
use crate::modules::storage::ImageUpload;

/// A toy form submission, url-encoded or multipart.
///
/// Category checkboxes repeat the `category` field, so the body is read as
/// ordered name/value pairs rather than into a struct.
#[derive(Debug, Default)]
pub struct ToySubmission {
    pub form: ToyForm,
    pub image: Option<ImageUpload>,
}

impl ToySubmission {
    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.form.name = value,
            "description" => self.form.description = value,
            "price" => self.form.price = value,
            "quantity_in_stock" => self.form.quantity_in_stock = value,
            "category" | "category[]" => self.form.category.push(value),
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut submission = Self::default();
        for (name, value) in pairs {
            submission.set_field(&name, value);
        }
        submission
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == "image" {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field.file_name().unwrap_or("").to_string();

                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read image data: {}", e))
                })?;

                // Browsers send an empty part when no file was chosen
                if !data.is_empty() || !file_name.is_empty() {
                    submission.image = Some(ImageUpload {
                        data: data.to_vec(),
                        content_type,
                        file_name,
                    });
                }
                continue;
            }

            let value = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
            })?;
            submission.set_field(&field_name, value);
        }

        Ok(submission)
    }
}

impl<S> FromRequest<S> for ToySubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            // A sequence of pairs keeps repeated `category` keys
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self::from_pairs(pairs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urlencoded(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_urlencoded_repeated_categories() {
        let submission = ToySubmission::from_request(
            urlencoded(
                "name=Water+Gun&description=For%20squirting%20tourists&price=5.99\
                 &quantity_in_stock=12&category=Water&category%5B%5D=Sports&unknown=1",
            ),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(submission.form.name, "Water Gun");
        assert_eq!(submission.form.description, "For squirting tourists");
        assert_eq!(submission.form.price, "5.99");
        assert_eq!(submission.form.quantity_in_stock, "12");
        assert_eq!(submission.form.category, vec!["Water", "Sports"]);
        assert!(submission.image.is_none());
    }

    #[tokio::test]
    async fn test_urlencoded_missing_fields_stay_empty() {
        let submission = ToySubmission::from_request(urlencoded("name="), &())
            .await
            .unwrap();

        assert_eq!(submission.form.name, "");
        assert!(submission.form.category.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_content_type_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("name=Ball"))
            .unwrap();

        let result = ToySubmission::from_request(request, &()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
