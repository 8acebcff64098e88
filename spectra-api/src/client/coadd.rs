use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use spectra_core::{Runtime, SpectrumDocument};
use spectra_output::OutputResponse;
use utoipa::IntoParams;

use crate::error::{output_error, spectrum_error, ApiError, ErrorResponse};

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CsvQuery {
    /// Arm to export: `B`, `R` or `Z`. Defaults to `R`.
    pub filter: Option<String>,
}

fn into_response(output: OutputResponse) -> Response<Body> {
    (
        [
            (header::CONTENT_TYPE, output.content_type.to_string()),
            (header::CONTENT_DISPOSITION, output.content_disposition),
        ],
        output.body,
    )
        .into_response()
}

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "coadd",
    get,
    path = "/coadd/{identifier}",
    params(("identifier" = i64, Path, description = "TARGETID of the object")),
    responses(
        (status = 200, description = "Catalog row, scores and the spectra of all three arms", body = SpectrumDocument),
        (status = 404, description = "Identifier is not in the catalog", body = ErrorResponse),
        (status = 500, description = "The spectrum could not be read", body = ErrorResponse),
    )
)]
pub(crate) async fn coadd_json(
    State(state): State<Arc<Runtime>>,
    Path(identifier): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let document = state
        .get_full_spectrum(identifier)
        .await
        .map_err(spectrum_error)?;
    let output = spectra_output::json::output(&document).map_err(output_error)?;
    Ok(into_response(output))
}

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "coadd",
    get,
    path = "/coadd-csv/{identifier}",
    params(
        ("identifier" = i64, Path, description = "TARGETID of the object"),
        CsvQuery,
    ),
    responses(
        (status = 200, description = "One arm as CSV with the columns wavelength, flux, ivar and mask", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown arm, or the arm is absent from the partition", body = ErrorResponse),
        (status = 404, description = "Identifier is not in the catalog", body = ErrorResponse),
        (status = 500, description = "The spectrum could not be read", body = ErrorResponse),
    )
)]
pub(crate) async fn coadd_csv(
    State(state): State<Arc<Runtime>>,
    Path(identifier): Path<i64>,
    Query(query): Query<CsvQuery>,
) -> Result<Response<Body>, ApiError> {
    let table = state
        .get_arm_table(identifier, query.filter.as_deref())
        .await
        .map_err(spectrum_error)?;
    let output = spectra_output::csv::output(&table).map_err(output_error)?;
    Ok(into_response(output))
}
