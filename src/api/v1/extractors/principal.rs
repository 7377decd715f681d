use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::gate::{AuthFailure, Principal};

/// The principal the access middleware stored in request extensions.
///
/// Reaching a handler without one means the route was not wrapped by the
/// middleware; that is answered like any other authentication failure.
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AppError::Unauthorized(AuthFailure::MissingHeader))
    }
}
