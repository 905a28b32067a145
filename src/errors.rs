use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let message = match &self {
            AppError::Internal(_) => "internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Failures from the booking store that callers are expected to branch on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an active booking already exists for flight {flight_number}")]
    DuplicateBooking { flight_number: String },

    #[error("flight {flight_number} has no seats left")]
    SoldOut { flight_number: String },

    #[error("could not allocate a unique confirmation number after {attempts} attempts")]
    ConfirmationCodeExhausted { attempts: usize },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let res = AppError::from(anyhow::anyhow!("disk I/O error at /var/db/skydesk.db")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_text(res).await;
        assert!(body.contains("internal server error"));
        assert!(!body.contains("/var/db"));
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let res = AppError::NotFound("booking BK-ABC123".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_text(res).await.contains("BK-ABC123"));

        let res = AppError::Unauthorized.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
