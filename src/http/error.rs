use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::StorefrontError;

impl StorefrontError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ProductNotFound | Self::ShopperNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::InvalidProduct(_)
            | Self::InvalidSchedule(_)
            | Self::InvalidGalleryImage(_)
            | Self::InvalidProductRef(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ScheduleError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StorefrontError::ProductNotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(StorefrontError::EmailTaken.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(StorefrontError::from(ScheduleError::EndBeforeStart).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            StorefrontError::Database(sqlx::Error::PoolTimedOut).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
