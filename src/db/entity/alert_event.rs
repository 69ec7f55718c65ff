use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// One delivered notification. Append-only; the monitor reads it back only
/// through the trailing dedup window.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub city_name: String,
    pub alert_kind: String, // "high" or "low"
    pub temperature: f64,
    pub threshold: f64,
    pub sent_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
