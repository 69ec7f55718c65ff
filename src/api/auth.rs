use axum::{ extract::State, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::user;
use crate::error::{ AppError, Result };

use super::{ AppState, AuthUser };

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(account: user::Model) -> Self {
        UserResponse {
            id: account.id,
            email: account.email,
            name: account.name,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>
) -> Result<(StatusCode, Json<AuthResponse>)> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let name = request.name.map(|name| name.trim().to_string()).filter(|name| !name.is_empty());

    let account = state.user_service.register(request.email, request.password, name).await?;
    let token = state.jwt.issue(account.id, &account.email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: account.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>
) -> Result<Json<AuthResponse>> {
    validate_email(&request.email)?;

    let account = state.user_service.authenticate(&request.email, &request.password).await?;
    let token = state.jwt.issue(account.id, &account.email)?;

    Ok(
        Json(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user: account.into(),
        })
    )
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser
) -> Result<Json<ProfileResponse>> {
    let account = state.user_service
        .find_by_id(auth.user_id).await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(ProfileResponse { user: account.into() }))
}

fn validate_email(email: &str) -> Result<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() < 6 {
        return Err(AppError::InvalidInput(
            "Password must be at least 6 characters".to_string()
        ));
    }
    Ok(())
}
