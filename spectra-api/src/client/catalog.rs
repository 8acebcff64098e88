use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use indexmap::IndexMap;
use spectra_catalog::FieldValue;
use spectra_core::Runtime;

use crate::error::{spectrum_error, ApiError, ErrorResponse};

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "catalog",
    get,
    path = "/catalog/{identifier}",
    params(("identifier" = i64, Path, description = "TARGETID of the object")),
    responses(
        (status = 200, description = "Catalog row of the object, keyed by column name"),
        (status = 404, description = "Identifier is not in the catalog", body = ErrorResponse),
    )
)]
pub(crate) async fn catalog_row(
    State(state): State<Arc<Runtime>>,
    Path(identifier): Path<i64>,
) -> Result<Json<IndexMap<String, FieldValue>>, ApiError> {
    state
        .lookup_identifier(identifier)
        .map(Json)
        .map_err(spectrum_error)
}
