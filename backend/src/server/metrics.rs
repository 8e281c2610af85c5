//! Prometheus middleware that can be switched off at runtime.
//!
//! Both arms box the inner service so the app type does not depend on
//! whether a registry was configured.

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

const METRICS_NAMESPACE: &str = "fleet";
const METRICS_ENDPOINT: &str = "/metrics";

/// Build the request metrics middleware exposing `/metrics`.
///
/// # Errors
/// Returns the builder error when the default collectors cannot be
/// registered.
pub(crate) fn build_prometheus() -> Result<PrometheusMetrics, Box<dyn std::error::Error + Send + Sync>> {
    PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .endpoint(METRICS_ENDPOINT)
        .build()
}

#[derive(Clone, Default)]
pub(crate) struct MetricsLayer(Option<Arc<PrometheusMetrics>>);

impl From<Option<PrometheusMetrics>> for MetricsLayer {
    fn from(metrics: Option<PrometheusMetrics>) -> Self {
        Self(metrics.map(Arc::new))
    }
}

type BoxedService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(metrics) = self.0.clone() else {
            return Box::pin(async move {
                let passthrough = service.map(ServiceResponse::map_into_boxed_body);
                Ok(boxed::service(passthrough))
            });
        };
        let fut = Compat::new((*metrics).clone()).new_transform(service);
        Box::pin(async move { Ok(boxed::service(fut.await?)) })
    }
}
