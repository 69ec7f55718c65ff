use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::entity::favorite_city;
use crate::error::{ AppError, Result };

#[derive(Clone)]
pub struct FavoriteService {
    db: DatabaseConnection,
}

impl FavoriteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All favorites for a user, newest first.
    pub async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<favorite_city::Model>> {
        let favorites = favorite_city::Entity
            ::find()
            .filter(favorite_city::Column::UserId.eq(user_id))
            .order_by_desc(favorite_city::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(favorites)
    }

    /// Add a city to the user's favorites. One row per (user, city).
    pub async fn add_favorite(
        &self,
        user_id: Uuid,
        city_name: String,
        country_code: Option<String>
    ) -> Result<favorite_city::Model> {
        let existing = favorite_city::Entity
            ::find()
            .filter(favorite_city::Column::UserId.eq(user_id))
            .filter(favorite_city::Column::CityName.eq(&city_name))
            .one(&self.db).await?;

        if existing.is_some() {
            return Err(AppError::FavoriteExists);
        }

        let favorite = favorite_city::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            city_name: ActiveValue::Set(city_name),
            country_code: ActiveValue::Set(country_code),
            created_at: ActiveValue::Set(Utc::now()),
        };

        let favorite = favorite.insert(&self.db).await?;
        Ok(favorite)
    }

    /// Remove a favorite by id, scoped to its owner.
    pub async fn remove_favorite(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = favorite_city::Entity
            ::delete_many()
            .filter(favorite_city::Column::Id.eq(id))
            .filter(favorite_city::Column::UserId.eq(user_id))
            .exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::FavoriteNotFound);
        }

        Ok(())
    }
}
