use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// `302 Found` redirect to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
