use axum::{ extract::{ Path, State }, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::favorite_city;
use crate::error::{ AppError, Result };

use super::{ AppState, AuthUser };

#[derive(Deserialize)]
pub struct AddFavoriteRequest {
    pub city_name: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Serialize)]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub city_name: String,
    pub country_code: Option<String>,
    pub created_at: String,
}

impl From<favorite_city::Model> for FavoriteResponse {
    fn from(favorite: favorite_city::Model) -> Self {
        FavoriteResponse {
            id: favorite.id,
            city_name: favorite.city_name,
            country_code: favorite.country_code,
            created_at: favorite.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct FavoritesListResponse {
    pub favorites: Vec<FavoriteResponse>,
}

#[derive(Serialize)]
pub struct AddFavoriteResponse {
    pub message: String,
    pub favorite: FavoriteResponse,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_favorites(
    State(state): State<AppState>,
    auth: AuthUser
) -> Result<Json<FavoritesListResponse>> {
    let favorites = state.favorite_service.list_favorites(auth.user_id).await?;

    Ok(
        Json(FavoritesListResponse {
            favorites: favorites.into_iter().map(Into::into).collect(),
        })
    )
}

pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AddFavoriteRequest>
) -> Result<(StatusCode, Json<AddFavoriteResponse>)> {
    let city_name = request.city_name.trim().to_string();
    if city_name.is_empty() {
        return Err(AppError::InvalidInput("City name is required".to_string()));
    }

    let country_code = request.country_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty());

    let favorite = state.favorite_service
        .add_favorite(auth.user_id, city_name, country_code).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddFavoriteResponse {
            message: "City added to favorites".to_string(),
            favorite: favorite.into(),
        }),
    ))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>
) -> Result<Json<MessageResponse>> {
    state.favorite_service.remove_favorite(auth.user_id, id).await?;

    Ok(
        Json(MessageResponse {
            message: "Favorite removed successfully".to_string(),
        })
    )
}
