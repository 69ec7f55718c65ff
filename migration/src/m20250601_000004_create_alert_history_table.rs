use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AlertHistory::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertHistory::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AlertHistory::UserId).uuid().not_null())
                .col(ColumnDef::new(AlertHistory::CityName).string().not_null())
                .col(ColumnDef::new(AlertHistory::AlertKind).string().not_null())
                .col(ColumnDef::new(AlertHistory::Temperature).double().not_null())
                .col(ColumnDef::new(AlertHistory::Threshold).double().not_null())
                .col(ColumnDef::new(AlertHistory::SentAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Covers the recent-alert dedup lookup
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_history_dedup")
                .table(AlertHistory::Table)
                .col(AlertHistory::UserId)
                .col(AlertHistory::CityName)
                .col(AlertHistory::AlertKind)
                .col(AlertHistory::SentAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AlertHistory::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AlertHistory {
    Table,
    Id,
    UserId,
    CityName,
    AlertKind,
    Temperature,
    Threshold,
    SentAt,
}
