use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// API错误类型
pub struct AppError(pub StatusCode, pub anyhow::Error);

impl AppError {
    pub fn conflict(err: anyhow::Error) -> Self {
        Self(StatusCode::CONFLICT, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, format!("{}", self.1)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        let status = match err.downcast_ref::<Error>() {
            Some(Error::DimensionMismatch { .. } | Error::NonFinite { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Some(Error::EmptyGallery | Error::DegenerateSubspace) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self(status, err)
    }
}
