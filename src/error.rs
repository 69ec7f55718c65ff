use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists with this email")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("City is already in favorites")]
    FavoriteExists,

    #[error("Favorite not found")]
    FavoriteNotFound,

    #[error("No alert preferences found for this city")]
    PreferenceNotFound,

    #[error("City not found")]
    CityNotFound,

    #[error("Weather provider error: {0}")] Provider(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::MissingToken =>
                ("AUTH_REQUIRED", "Authentication required".to_string(), None),
            AppError::InvalidToken =>
                ("INVALID_TOKEN", "Invalid or expired token".to_string(), None),
            AppError::InvalidCredentials =>
                ("INVALID_CREDENTIALS", "Invalid email or password".to_string(), None),
            AppError::EmailTaken =>
                (
                    "EMAIL_TAKEN",
                    "User already exists with this email".to_string(),
                    Some("email".to_string()),
                ),
            AppError::UserNotFound => ("USER_NOT_FOUND", "User not found".to_string(), None),
            AppError::FavoriteExists =>
                ("FAVORITE_EXISTS", "City is already in favorites".to_string(), None),
            AppError::FavoriteNotFound =>
                ("FAVORITE_NOT_FOUND", "Favorite not found".to_string(), None),
            AppError::PreferenceNotFound =>
                (
                    "ALERT_NOT_FOUND",
                    "No alert preferences found for this city".to_string(),
                    None,
                ),
            AppError::CityNotFound => ("CITY_NOT_FOUND", "City not found".to_string(), None),
            AppError::Provider(msg) => ("PROVIDER_ERROR", msg.clone(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            | AppError::UserNotFound
            | AppError::FavoriteNotFound
            | AppError::PreferenceNotFound
            | AppError::CityNotFound => axum::http::StatusCode::NOT_FOUND,
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::InvalidCredentials => axum::http::StatusCode::UNAUTHORIZED,
            | AppError::InvalidInput(_)
            | AppError::EmailTaken
            | AppError::FavoriteExists => axum::http::StatusCode::BAD_REQUEST,
            AppError::Provider(_) => axum::http::StatusCode::BAD_GATEWAY,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
