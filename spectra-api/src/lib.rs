use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::MatchedPath,
    http::{HeaderMap, Request},
    response::{Redirect, Response},
    routing::get,
    Router,
};
use client::setup_client_router;
use spectra_core::Runtime;
use tower_http::{classify::ServerErrorsFailureClass, cors::CorsLayer, trace::TraceLayer};
use tracing::{info_span, Span};
use utoipa_scalar::{Scalar, Servable};
use utoipa_swagger_ui::SwaggerUi;

pub mod client;
pub mod error;

pub const SPECTRA_VERSION: &str = env!("CARGO_PKG_VERSION");

fn set_api_docs_info(mut openapi: utoipa::openapi::OpenApi) -> utoipa::openapi::OpenApi {
    openapi.info.title = "Spectra API".to_string();
    openapi.info.version = SPECTRA_VERSION.to_string();
    openapi.info.description = Some("Coadded spectra of single DESI targets".to_string());

    openapi
}

/// All routes with the runtime attached as state, documentation included.
pub fn build_router(runtime: Arc<Runtime>) -> Router {
    let (client_router, api_docs) = setup_client_router();
    let api_docs = set_api_docs_info(api_docs);

    let router = client_router
        .merge(Scalar::with_url("/scalar/", api_docs.clone()))
        .route("/scalar", get(|| async { Redirect::to("/scalar/") }))
        .merge(SwaggerUi::new("/swagger").url("/api/openapi.json", api_docs))
        .layer(CorsLayer::permissive());

    trace_layer(router).with_state(runtime)
}

fn trace_layer<T>(router: Router<T>) -> Router<T>
where
    T: Send + Sync + Clone + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                // Matched route with its placeholders, not the raw uri.
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {
                tracing::info!("Request Received.");
            })
            .on_response(|response: &Response, latency: Duration, _span: &Span| {
                tracing::info!(
                    "Response Completed. Status: {} Duration: {:?}",
                    response.status(),
                    latency
                );
            })
            .on_body_chunk(|_chunk: &Bytes, _latency: Duration, _span: &Span| {})
            .on_eos(|_trailers: Option<&HeaderMap>, _stream_duration: Duration, _span: &Span| {})
            .on_failure(
                |error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                    tracing::error!("Request failed after {:?}: {}", latency, error)
                },
            ),
    )
}
