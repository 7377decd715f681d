//! Per-client rate limiting in front of every route, including CORS preflights.
//!
//! The client is identified by the connection peer address. Proxy headers
//! (`X-Forwarded-For`, then `X-Real-IP`) are read only when the deployment
//! says a trusted proxy sits in front.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::rate_limiter::RateLimiter;

#[derive(Clone)]
struct RateLimitState {
    limiter: RateLimiter,
    trust_proxy_headers: bool,
}

pub fn apply<S>(router: Router<S>, limiter: RateLimiter, trust_proxy_headers: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = RateLimitState {
        limiter,
        trust_proxy_headers,
    };
    router.layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}

async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&req, state.trust_proxy_headers);

    if state.limiter.allow(ip) {
        return Ok(next.run(req).await);
    }

    let retry_after = state.limiter.retry_after(ip);
    tracing::warn!(
        %ip,
        retry_after_ms = retry_after.as_millis() as u64,
        "rate limit exceeded"
    );
    Err(AppError::RateLimited { retry_after })
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    first_hop.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    })
}

fn client_ip(req: &Request<Body>, trust_proxy_headers: bool) -> IpAddr {
    if trust_proxy_headers && let Some(ip) = forwarded_ip(req.headers()) {
        return ip;
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;
    use crate::services::rate_limiter::RateLimitConfig;

    fn app(burst: u32, trust_proxy_headers: bool) -> Router {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 1,
            burst,
        });
        apply(
            Router::new().route("/", get(|| async { "ok" })),
            limiter,
            trust_proxy_headers,
        )
    }

    fn from(addr: &str, forwarded: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri("/");
        if let Some(f) = forwarded {
            req = req.header("x-forwarded-for", f);
        }
        let mut req = req.body(Body::empty()).unwrap();
        let addr: SocketAddr = addr.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn over_the_burst_is_429_with_retry_after() {
        let app = app(2, false);
        for _ in 0..2 {
            let res = app.clone().oneshot(from("10.0.0.1:5000", None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = app.oneshot(from("10.0.0.1:5000", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key(header::RETRY_AFTER));

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], 429);
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn peers_are_limited_independently() {
        let app = app(1, false);
        let res = app.clone().oneshot(from("10.0.0.1:5000", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = app.clone().oneshot(from("10.0.0.2:5000", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = app.oneshot(from("10.0.0.1:6000", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn forwarded_for_is_ignored_unless_trusted() {
        let untrusted = app(1, false);
        let res = untrusted
            .clone()
            .oneshot(from("10.0.0.9:1", Some("1.1.1.1")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = untrusted
            .oneshot(from("10.0.0.9:1", Some("2.2.2.2")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        let trusted = app(1, true);
        let res = trusted
            .clone()
            .oneshot(from("10.0.0.9:1", Some("1.1.1.1, 10.0.0.9")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = trusted
            .oneshot(from("10.0.0.9:1", Some("2.2.2.2")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn real_ip_is_the_fallback_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "3.3.3.3".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some(IpAddr::from([3, 3, 3, 3])));

        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some(IpAddr::from([3, 3, 3, 3])));
    }
}
