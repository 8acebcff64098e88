use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use spectra_core::Runtime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Greeting {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemInfo {
    pub name: String,
    pub version: String,
    pub catalog_rows: usize,
    pub healpix_root: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Health {
    pub status: String,
}

#[utoipa::path(
    tag = "system",
    get,
    path = "/",
    responses((status = 200, description = "Greeting", body = Greeting))
)]
pub(crate) async fn root() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello World from the spectra service!".to_string(),
    })
}

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "system",
    get,
    path = "/api/info",
    responses((status = 200, description = "Returns service information", body = SystemInfo))
)]
pub(crate) async fn system_info(State(state): State<Arc<Runtime>>) -> Json<SystemInfo> {
    Json(SystemInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: crate::SPECTRA_VERSION.to_string(),
        catalog_rows: state.catalog().len(),
        healpix_root: state.healpix_root().display().to_string(),
    })
}

#[utoipa::path(
    tag = "system",
    get,
    path = "/api/health",
    responses((status = 200, description = "The service is up", body = Health))
)]
pub(crate) async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}
