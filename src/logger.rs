use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Id of the request being served, as echoed in `x-request-id`. Outside a
/// request (unit tests, startup) a fresh id is minted.
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string())
}

/// Request logging middleware.
///
/// Runs every request inside a `http_request` span carrying a fresh request
/// id, logs start and completion, and echoes the id in `x-request-id`.
/// Errors raised by inner middleware are rendered here, so error bodies and
/// logs share the same id.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
        );

        let http_request = req.request().clone();
        let service = self.service.clone();
        let header_value = HeaderValue::from_str(&request_id).ok();

        let handled = async move {
            tracing::info!("request started");

            let mut res = match service.call(req).await {
                Ok(res) => res.map_into_left_body(),
                Err(e) => ServiceResponse::from_err(e, http_request).map_into_right_body(),
            };

            if let Some(value) = header_value {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            tracing::info!(
                status = res.status().as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "request completed"
            );

            Ok(res)
        }
        .instrument(span);

        Box::pin(REQUEST_ID.scope(request_id, handled))
    }
}
