use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use atelier_fulfillment::DeliveryError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::InvalidCustomer(_) => AppError::ValidationError(err.to_string()),
            DeliveryError::InvalidExpiry(_) => AppError::InternalServerError(err.to_string()),
            DeliveryError::Storage(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}
