use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    FromQueryResult,
    QueryFilter,
    QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::alert_monitor::{ AlertStore, NewAlertEvent, Subscription };
use crate::db::entity::{ alert_event, alert_preference, user };
use crate::enums::AlertKind;
use crate::error::{ AppError, Result };

#[derive(Clone)]
pub struct AlertService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct UpsertPreferenceRequest {
    pub city_name: String,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub email_enabled: bool,
}

impl AlertService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All alert preferences for a user, ordered by city name.
    pub async fn list_preferences(&self, user_id: Uuid) -> Result<Vec<alert_preference::Model>> {
        let preferences = alert_preference::Entity
            ::find()
            .filter(alert_preference::Column::UserId.eq(user_id))
            .order_by_asc(alert_preference::Column::CityName)
            .all(&self.db).await?;

        Ok(preferences)
    }

    pub async fn get_preference(
        &self,
        user_id: Uuid,
        city_name: &str
    ) -> Result<Option<alert_preference::Model>> {
        let preference = alert_preference::Entity
            ::find()
            .filter(alert_preference::Column::UserId.eq(user_id))
            .filter(alert_preference::Column::CityName.eq(city_name))
            .one(&self.db).await?;

        Ok(preference)
    }

    /// Create or overwrite the preference for (user, city). The single-row
    /// invariant is held by this select-then-write, not a DB constraint.
    /// Returns the stored row and whether it was newly created.
    pub async fn upsert_preference(
        &self,
        user_id: Uuid,
        request: UpsertPreferenceRequest
    ) -> Result<(alert_preference::Model, bool)> {
        let now = Utc::now();

        if let Some(existing) = self.get_preference(user_id, &request.city_name).await? {
            let mut active: alert_preference::ActiveModel = existing.into();
            active.max_temp = ActiveValue::Set(request.max_temp);
            active.min_temp = ActiveValue::Set(request.min_temp);
            active.email_enabled = ActiveValue::Set(request.email_enabled);
            active.updated_at = ActiveValue::Set(now);

            let updated = active.update(&self.db).await?;
            return Ok((updated, false));
        }

        let preference = alert_preference::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            city_name: ActiveValue::Set(request.city_name),
            max_temp: ActiveValue::Set(request.max_temp),
            min_temp: ActiveValue::Set(request.min_temp),
            email_enabled: ActiveValue::Set(request.email_enabled),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let preference = preference.insert(&self.db).await?;
        Ok((preference, true))
    }

    pub async fn delete_preference(&self, user_id: Uuid, city_name: &str) -> Result<()> {
        let result = alert_preference::Entity
            ::delete_many()
            .filter(alert_preference::Column::UserId.eq(user_id))
            .filter(alert_preference::Column::CityName.eq(city_name))
            .exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::PreferenceNotFound);
        }

        Ok(())
    }
}

/// Joined row shape for the monitor's subscription snapshot.
#[derive(Debug, FromQueryResult)]
struct SubscriptionRow {
    user_id: Uuid,
    city_name: String,
    max_temp: Option<f64>,
    min_temp: Option<f64>,
    user_email: String,
    user_name: Option<String>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            user_id: row.user_id,
            city_name: row.city_name,
            max_temp: row.max_temp,
            min_temp: row.min_temp,
            user_email: row.user_email,
            user_name: row.user_name,
        }
    }
}

#[async_trait]
impl AlertStore for AlertService {
    /// One snapshot of enabled preferences joined with the owning user's
    /// contact info, ordered by city name for a stable sweep order.
    async fn load_enabled_subscriptions(&self) -> Result<Vec<Subscription>> {
        let rows = alert_preference::Entity
            ::find()
            .select_only()
            .column(alert_preference::Column::UserId)
            .column(alert_preference::Column::CityName)
            .column(alert_preference::Column::MaxTemp)
            .column(alert_preference::Column::MinTemp)
            .column_as(user::Column::Email, "user_email")
            .column_as(user::Column::Name, "user_name")
            .inner_join(user::Entity)
            .filter(alert_preference::Column::EmailEnabled.eq(true))
            .order_by_asc(alert_preference::Column::CityName)
            .into_model::<SubscriptionRow>()
            .all(&self.db).await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Newest ledger entry for (user, city, kind) with sent_at strictly
    /// after the cutoff. Pure read.
    async fn was_recently_sent(
        &self,
        user_id: Uuid,
        city_name: &str,
        kind: AlertKind,
        cutoff: DateTime<Utc>
    ) -> Result<bool> {
        let recent = alert_event::Entity
            ::find()
            .filter(alert_event::Column::UserId.eq(user_id))
            .filter(alert_event::Column::CityName.eq(city_name))
            .filter(alert_event::Column::AlertKind.eq(kind.as_str()))
            .filter(alert_event::Column::SentAt.gt(cutoff))
            .order_by_desc(alert_event::Column::SentAt)
            .one(&self.db).await?;

        Ok(recent.is_some())
    }

    async fn record_alert(&self, event: NewAlertEvent) -> Result<()> {
        let entry = alert_event::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(event.user_id),
            city_name: ActiveValue::Set(event.city_name),
            alert_kind: ActiveValue::Set(event.kind.to_string()),
            temperature: ActiveValue::Set(event.temperature),
            threshold: ActiveValue::Set(event.threshold),
            sent_at: ActiveValue::Set(Utc::now()),
        };

        entry.insert(&self.db).await?;
        Ok(())
    }
}
