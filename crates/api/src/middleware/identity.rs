//! Caller identity for protected routes.
//!
//! Authentication happens upstream; the gateway forwards the user name and
//! roles in headers. This middleware turns them into a [`Principal`].

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bursar_core::hooks::Principal;
use serde_json::json;

/// Header carrying the user name.
pub const USER_HEADER: &str = "x-bursar-user";

/// Header carrying comma-separated role names.
pub const ROLES_HEADER: &str = "x-bursar-roles";

/// Reads the principal from request headers.
///
/// Returns `None` when the user header is missing or blank.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let user = headers
        .get(USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty())?;

    let roles = headers
        .get(ROLES_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Some(Principal::new(user, roles))
}

/// Identity middleware.
///
/// Stores the caller's [`Principal`] in request extensions, or rejects the
/// request with 401 when no user is given.
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let Some(principal) = principal_from_headers(request.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "UNAUTHORIZED",
                "message": format!("{USER_HEADER} header is required")
            })),
        )
            .into_response();
    };

    tracing::debug!(user = %principal.user, roles = ?principal.roles, "Caller identified");
    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Extractor for the identified caller.
///
/// ```ignore
/// async fn handler(Caller(principal): Caller) -> impl IntoResponse {
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "UNAUTHORIZED",
                        "message": "Caller identity required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_principal_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("bursar@school.test"));
        headers.insert(
            ROLES_HEADER,
            HeaderValue::from_static("Accounts User, System Manager,,"),
        );

        let principal = principal_from_headers(&headers).unwrap();
        assert_eq!(principal.user, "bursar@school.test");
        assert_eq!(principal.roles, vec!["Accounts User", "System Manager"]);
    }

    #[test]
    fn test_missing_or_blank_user() {
        let mut headers = HeaderMap::new();
        assert!(principal_from_headers(&headers).is_none());

        headers.insert(USER_HEADER, HeaderValue::from_static("   "));
        assert!(principal_from_headers(&headers).is_none());
    }

    #[test]
    fn test_roles_are_optional() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("guest"));
        let principal = principal_from_headers(&headers).unwrap();
        assert!(principal.roles.is_empty());
    }
}
