use axum::{ extract::{ Path, State }, Json };

use crate::error::Result;

use super::AppState;

pub async fn current_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>
) -> Result<Json<serde_json::Value>> {
    let payload = state.weather_service.current_by_city(&city).await?;
    Ok(Json(payload))
}

pub async fn forecast_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>
) -> Result<Json<serde_json::Value>> {
    let payload = state.weather_service.forecast_by_city(&city).await?;
    Ok(Json(payload))
}

pub async fn current_by_coordinates(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>
) -> Result<Json<serde_json::Value>> {
    let payload = state.weather_service.current_by_coordinates(lat, lon).await?;
    Ok(Json(payload))
}

pub async fn forecast_by_coordinates(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>
) -> Result<Json<serde_json::Value>> {
    let payload = state.weather_service.forecast_by_coordinates(lat, lon).await?;
    Ok(Json(payload))
}
