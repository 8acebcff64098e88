use std::sync::Arc;

use axum::Router;
use spectra_core::Runtime;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

mod catalog;
mod coadd;
mod info;

#[derive(utoipa::OpenApi)]
#[openapi()]
pub struct ClientApiDoc;

pub(crate) fn setup_client_router() -> (Router<Arc<Runtime>>, utoipa::openapi::OpenApi) {
    let (client_router, client_api) = OpenApiRouter::with_openapi(ClientApiDoc::openapi())
        .routes(routes!(info::root))
        .routes(routes!(info::system_info))
        .routes(routes!(info::health))
        .routes(routes!(catalog::catalog_row))
        .routes(routes!(coadd::coadd_json))
        .routes(routes!(coadd::coadd_csv))
        .split_for_parts();

    (client_router, client_api)
}
