use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

pub mod auth;
pub mod weather;
pub mod favorites;
pub mod alerts;

use crate::auth::JwtKeys;
use crate::error::AppError;
use crate::services::{ AlertService, FavoriteService, UserService, WeatherService };

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub favorite_service: Arc<FavoriteService>,
    pub alert_service: Arc<AlertService>,
    pub weather_service: Arc<WeatherService>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        favorite_service: Arc<FavoriteService>,
        alert_service: Arc<AlertService>,
        weather_service: Arc<WeatherService>,
        jwt: Arc<JwtKeys>
    ) -> Self {
        Self {
            user_service,
            favorite_service,
            alert_service,
            weather_service,
            jwt,
        }
    }
}

/// The authenticated caller, extracted from the bearer token.
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState
    ) -> Result<Self, Self::Rejection> {
        let header = parts.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::MissingToken)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::MissingToken)?;

        let claims = state.jwt.verify(token)?;
        let user_id = claims.sub.parse::<Uuid>().map_err(|_| AppError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}
