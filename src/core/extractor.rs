use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::core::error::AppError;

/// Numeric entity id taken from the `{id}` path segment.
///
/// Anything that is not a valid id cannot resolve to an entity, so it is
/// rejected as not found rather than as a malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i32);

impl EntityId {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<i32>().ok().filter(|id| *id > 0).map(Self)
    }
}

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Page not found".to_string()))?;

        Self::parse(&raw).ok_or_else(|| AppError::NotFound(format!("No entity with id '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert_eq!(EntityId::parse("1"), Some(EntityId(1)));
        assert_eq!(EntityId::parse("999"), Some(EntityId(999)));
    }

    #[test]
    fn test_parse_invalid_ids() {
        assert_eq!(EntityId::parse("0"), None);
        assert_eq!(EntityId::parse("-3"), None);
        assert_eq!(EntityId::parse("abc"), None);
        assert_eq!(EntityId::parse("99999999999"), None);
        assert_eq!(EntityId::parse(""), None);
    }
}
