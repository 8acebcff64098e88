use axum::{http::StatusCode, Json};
use serde::Serialize;
use spectra_core::{ErrorKind, SpectrumError};
use spectra_output::OutputError;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: String) -> ApiError {
    (status, Json(ErrorResponse { detail }))
}

pub(crate) fn spectrum_error(err: SpectrumError) -> ApiError {
    match err.kind() {
        ErrorKind::NotFound => {
            tracing::warn!("{}", err);
            api_error(StatusCode::NOT_FOUND, err.to_string())
        }
        ErrorKind::BadRequest => {
            tracing::warn!("{}", err);
            api_error(StatusCode::BAD_REQUEST, err.to_string())
        }
        ErrorKind::Internal => {
            tracing::error!("{}", err);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {}", err),
            )
        }
    }
}

pub(crate) fn output_error(err: OutputError) -> ApiError {
    tracing::error!("{}", err);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal Server Error: {}", err),
    )
}
