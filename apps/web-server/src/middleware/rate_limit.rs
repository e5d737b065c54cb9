//! Per-client rate limiting of form submissions.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use futures::future::{LocalBoxFuture, Ready, ready};

use behonest_core::ports::RateLimiter;

use super::error::AppError;

/// Rate limiting middleware factory.
///
/// Only POST requests count against the limit, so rendering a form is never
/// blocked. Without a limiter every request passes.
///
/// Clients are keyed on the socket peer IP. Forwarding headers are
/// client-controlled, so they are read only when `trust_proxy_headers` is set.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy_headers: bool,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        Self {
            limiter,
            trust_proxy_headers: false,
        }
    }

    #[must_use]
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy_headers: self.trust_proxy_headers,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy_headers: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = match &self.limiter {
            Some(limiter) if req.method() == Method::POST => limiter.clone(),
            _ => {
                return Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                });
            }
        };

        let key = client_key(&req, self.trust_proxy_headers);

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(client = %key, path = %req.path(), "Rate limit exceeded");

                    let response = AppError::TooManyRequests {
                        retry_after: result.reset_after,
                    }
                    .error_response();
                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Ok(_) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

/// Peer IP without the port, or the forwarded client when trusted.
fn client_key(req: &ServiceRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = req.connection_info().realip_remote_addr() {
            return ip.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, HttpResponse, test, web};
    use async_trait::async_trait;
    use behonest_core::ports::{RateLimitError, RateLimitResult};

    /// Allows the first `budget` checks, then denies.
    struct Budget(Mutex<u32>);

    #[async_trait]
    impl RateLimiter for Budget {
        async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
            let mut left = self.0.lock().unwrap();
            let allowed = *left > 0;
            *left = left.saturating_sub(1);
            Ok(RateLimitResult {
                allowed,
                reset_after: Duration::from_secs(12),
            })
        }
    }

    /// Allows everything and remembers the keys it was asked about.
    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl RateLimiter for Recorder {
        async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
            self.0.lock().unwrap().push(key.to_string());
            Ok(RateLimitResult {
                allowed: true,
                reset_after: Duration::ZERO,
            })
        }
    }

    struct Broken;

    #[async_trait]
    impl RateLimiter for Broken {
        async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
            Err(RateLimitError::Backend("down".into()))
        }
    }

    macro_rules! limited_app {
        ($limiter:expr) => {
            limited_app!($limiter, false)
        };
        ($limiter:expr, $trust:expr) => {
            test::init_service(
                App::new().service(
                    web::resource("/login/")
                        .wrap(RateLimitMiddleware::new(Some($limiter)).trust_proxy_headers($trust))
                        .route(web::get().to(HttpResponse::Ok))
                        .route(web::post().to(HttpResponse::Ok)),
                ),
            )
            .await
        };
    }

    macro_rules! post_login {
        () => {
            test::TestRequest::post().uri("/login/").to_request()
        };
    }

    #[actix_web::test]
    async fn test_post_over_budget_is_rejected() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(Budget(Mutex::new(1)));
        let app = limited_app!(limiter);

        let ok = test::call_service(&app, post_login!()).await;
        assert_eq!(ok.status(), StatusCode::OK);

        let limited = test::call_service(&app, post_login!()).await;
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.headers().get(header::RETRY_AFTER).unwrap(), "12");
    }

    #[actix_web::test]
    async fn test_get_is_never_counted() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(Budget(Mutex::new(0)));
        let app = limited_app!(limiter);

        for _ in 0..3 {
            let req = test::TestRequest::get().uri("/login/").to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
    }

    #[actix_web::test]
    async fn test_limiter_failure_fails_open() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(Broken);
        let app = limited_app!(limiter);

        let res = test::call_service(&app, post_login!()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    macro_rules! forwarded_post {
        ($peer:expr, $forwarded_for:expr) => {
            test::TestRequest::post()
                .uri("/login/")
                .peer_addr($peer.parse().unwrap())
                .insert_header(("X-Forwarded-For", $forwarded_for))
                .to_request()
        };
    }

    #[actix_web::test]
    async fn test_key_is_peer_ip_by_default() {
        let recorder = Arc::new(Recorder::default());
        let app = limited_app!(recorder.clone() as Arc<dyn RateLimiter>);

        test::call_service(&app, forwarded_post!("10.1.2.3:40001", "1.1.1.1")).await;
        test::call_service(&app, forwarded_post!("10.1.2.3:40002", "2.2.2.2")).await;

        let keys = recorder.0.lock().unwrap().clone();
        assert_eq!(keys, ["10.1.2.3", "10.1.2.3"]);
    }

    #[actix_web::test]
    async fn test_trusted_proxy_uses_forwarded_client() {
        let recorder = Arc::new(Recorder::default());
        let app = limited_app!(recorder.clone() as Arc<dyn RateLimiter>, true);

        test::call_service(&app, forwarded_post!("10.1.2.3:40001", "203.0.113.9")).await;

        let keys = recorder.0.lock().unwrap().clone();
        assert_eq!(keys, ["203.0.113.9"]);
    }
}
