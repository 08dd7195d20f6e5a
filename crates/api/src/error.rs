use advisor_core::AdvisorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError(pub AdvisorError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AdvisorError::InvalidProfile(_)
            | AdvisorError::InvalidHorizon(_)
            | AdvisorError::InvalidAge(_)
            | AdvisorError::InvalidInvestment(_) => StatusCode::BAD_REQUEST,
            AdvisorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AdvisorError::NoProfileSelected => StatusCode::CONFLICT,
            AdvisorError::ZeroWeightSum { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AdvisorError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(e: AdvisorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(self.0.clone()));
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
