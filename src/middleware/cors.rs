//! CORS policy for browser clients.
//!
//! - development: any origin
//! - production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`; an empty
//!   list sends no CORS headers at all
//!
//! Credentials are never allowed, so the wildcard stays valid.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppEnv;
use crate::middleware::http::REQUEST_ID_HEADER;

fn layer(app_env: AppEnv, allowed_origins: &[String]) -> CorsLayer {
    let cors = if app_env.is_production() {
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ])
    .expose_headers([header::RETRY_AFTER, HeaderName::from_static(REQUEST_ID_HEADER)])
    .max_age(Duration::from_secs(60 * 10))
}

pub fn apply(router: Router, app_env: AppEnv, allowed_origins: &[String]) -> Router {
    router.layer(layer(app_env, allowed_origins))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;

    async fn allow_origin_for(app_env: AppEnv, allowed: &[String], origin: &str) -> Option<String> {
        let app = apply(Router::new().route("/", get(|| async { "ok" })), app_env, allowed);
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn development_allows_any_origin() {
        let got = allow_origin_for(AppEnv::Development, &[], "http://localhost:3000").await;
        assert_eq!(got.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn production_only_echoes_listed_origins() {
        let allowed = vec!["https://portfolio.example".to_string()];
        let got = allow_origin_for(AppEnv::Production, &allowed, "https://portfolio.example").await;
        assert_eq!(got.as_deref(), Some("https://portfolio.example"));

        let got = allow_origin_for(AppEnv::Production, &allowed, "https://evil.example").await;
        assert_eq!(got, None);
    }
}
