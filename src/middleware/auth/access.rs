//! Bearer-token gate for protected routes.
//!
//! On success the [`Principal`] is placed in request extensions, where the
//! `CurrentPrincipal` extractor picks it up. Every failure is a 401 with the
//! same body; the reason only goes to the log.
//!
//! ```ignore
//! let protected = Router::new().route("/auth/me", get(me));
//! let protected = middleware::auth::access::apply(protected, gate.clone(), TokenKind::Access);
//! ```

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::gate::{AuthGate, Principal};
use crate::services::auth::token_codec::TokenKind;

#[derive(Clone)]
struct AccessState {
    gate: Arc<AuthGate>,
    required: TokenKind,
}

/// Guards every route already on `router`. Uses `route_layer`, so unmatched
/// paths still answer 404 instead of 401.
pub fn apply<S>(router: Router<S>, gate: Arc<AuthGate>, required: TokenKind) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(
        AccessState { gate, required },
        access_middleware,
    ))
}

async fn access_middleware(
    State(state): State<AccessState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal: Principal = state
        .gate
        .authenticate(req.headers().get(header::AUTHORIZATION), state.required)
        .await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::CurrentPrincipal;
    use crate::services::auth::credentials::{CredentialStore, StoredSession};
    use crate::services::auth::token_codec::TokenCodec;
    use crate::testing::{MemoryCredentialStore, TEST_SECRET};
    use crate::types::{Role, UserId};

    async fn whoami(CurrentPrincipal(p): CurrentPrincipal) -> String {
        p.id.to_string()
    }

    async fn setup(required: TokenKind) -> (Router, TokenCodec, Arc<MemoryCredentialStore>, UserId) {
        let store = Arc::new(MemoryCredentialStore::default());
        let user = store.insert_user("alice@example.com", Role::User).await;
        let codec = TokenCodec::new(TEST_SECRET);
        let gate = Arc::new(AuthGate::new(codec.clone(), store.clone()));

        let router = apply(Router::new().route("/me", get(whoami)), gate, required);
        (router, codec, store, user)
    }

    fn get_with(auth: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri("/me");
        if let Some(v) = auth {
            req = req.header(header::AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        req.body(Body::empty()).unwrap()
    }

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn valid_access_token_reaches_the_handler() {
        let (router, codec, store, user) = setup(TokenKind::Access).await;
        let token = codec
            .issue(user, Role::User, TokenKind::Access, Duration::from_secs(60))
            .unwrap();
        let expires_at = Utc::now() + chrono::Duration::seconds(60);
        store
            .store_session(user, TokenKind::Access, StoredSession::for_token(&token, expires_at))
            .await
            .unwrap();

        let res = router
            .oneshot(get_with(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], user.to_string().as_bytes());
    }

    #[tokio::test]
    async fn failures_are_indistinguishable_to_the_client() {
        let (router, codec, _store, user) = setup(TokenKind::Access).await;
        // signed and well-formed, but never stored: revoked
        let unstored = codec
            .issue(user, Role::User, TokenKind::Access, Duration::from_secs(60))
            .unwrap();

        let missing = router.clone().oneshot(get_with(None)).await.unwrap();
        let malformed = router.clone().oneshot(get_with(Some("Basic abc"))).await.unwrap();
        let revoked = router
            .oneshot(get_with(Some(&format!("Bearer {unstored}"))))
            .await
            .unwrap();

        for res in [&missing, &malformed, &revoked] {
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
        let a = body_json(missing).await;
        let b = body_json(malformed).await;
        let c = body_json(revoked).await;
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a["message"], "Authentication failed");
        assert!(a["data"].is_null());
    }

    #[tokio::test]
    async fn refresh_route_rejects_access_tokens() {
        let (router, codec, store, user) = setup(TokenKind::Refresh).await;
        let access = codec
            .issue(user, Role::User, TokenKind::Access, Duration::from_secs(60))
            .unwrap();
        let expires_at = Utc::now() + chrono::Duration::seconds(60);
        store
            .store_session(user, TokenKind::Access, StoredSession::for_token(&access, expires_at))
            .await
            .unwrap();

        let res = router
            .oneshot(get_with(Some(&format!("Bearer {access}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
