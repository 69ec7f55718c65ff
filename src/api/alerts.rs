use axum::{ extract::{ Path, State }, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::alert_preference;
use crate::error::{ AppError, Result };
use crate::services::alert_service::UpsertPreferenceRequest;

use super::{ AppState, AuthUser };

#[derive(Deserialize)]
pub struct UpsertAlertRequest {
    pub city_name: String,
    #[serde(default)]
    pub max_temp: Option<f64>,
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub email_enabled: Option<bool>,
}

#[derive(Serialize)]
pub struct AlertResponse {
    pub id: Uuid,
    pub city_name: String,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub email_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<alert_preference::Model> for AlertResponse {
    fn from(preference: alert_preference::Model) -> Self {
        AlertResponse {
            id: preference.id,
            city_name: preference.city_name,
            max_temp: preference.max_temp,
            min_temp: preference.min_temp,
            email_enabled: preference.email_enabled,
            created_at: preference.created_at.to_rfc3339(),
            updated_at: preference.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct AlertsListResponse {
    pub alerts: Vec<AlertResponse>,
}

#[derive(Serialize)]
pub struct SingleAlertResponse {
    pub alert: AlertResponse,
}

#[derive(Serialize)]
pub struct UpsertAlertResponse {
    pub message: String,
    pub alert: AlertResponse,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_alerts(
    State(state): State<AppState>,
    auth: AuthUser
) -> Result<Json<AlertsListResponse>> {
    let preferences = state.alert_service.list_preferences(auth.user_id).await?;

    Ok(
        Json(AlertsListResponse {
            alerts: preferences.into_iter().map(Into::into).collect(),
        })
    )
}

pub async fn get_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(city): Path<String>
) -> Result<Json<SingleAlertResponse>> {
    let preference = state.alert_service
        .get_preference(auth.user_id, &city).await?
        .ok_or(AppError::PreferenceNotFound)?;

    Ok(Json(SingleAlertResponse { alert: preference.into() }))
}

/// Set or overwrite the preference for a city. Thresholds are replaced
/// wholesale; an omitted email_enabled defaults to true.
pub async fn upsert_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpsertAlertRequest>
) -> Result<(StatusCode, Json<UpsertAlertResponse>)> {
    let city_name = request.city_name.trim().to_string();
    if city_name.is_empty() {
        return Err(AppError::InvalidInput("City name is required".to_string()));
    }

    let (preference, created) = state.alert_service.upsert_preference(
        auth.user_id,
        UpsertPreferenceRequest {
            city_name,
            max_temp: request.max_temp,
            min_temp: request.min_temp,
            email_enabled: request.email_enabled.unwrap_or(true),
        }
    ).await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Alert preferences created")
    } else {
        (StatusCode::OK, "Alert preferences updated")
    };

    Ok((
        status,
        Json(UpsertAlertResponse {
            message: message.to_string(),
            alert: preference.into(),
        }),
    ))
}

pub async fn delete_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(city): Path<String>
) -> Result<Json<MessageResponse>> {
    state.alert_service.delete_preference(auth.user_id, &city).await?;

    Ok(
        Json(MessageResponse {
            message: "Alert preferences deleted successfully".to_string(),
        })
    )
}
