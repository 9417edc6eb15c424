//! HTTP mapping for `TechStoreError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use techstore_core::{InstanceIdentity, TechStoreError};

/// Error returned by handlers; carries the identity of the answering instance.
#[derive(Debug)]
pub struct ApiError {
    err: TechStoreError,
    identity: InstanceIdentity,
}

impl ApiError {
    pub fn new(err: TechStoreError, identity: InstanceIdentity) -> Self {
        Self { err, identity }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(flatten)]
    identity: InstanceIdentity,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.err.client_code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.err, "request failed");
        }

        let body = ErrorBody {
            error: self.err.to_string(),
            code: code.as_str(),
            identity: self.identity,
        };
        (status, Json(body)).into_response()
    }
}
