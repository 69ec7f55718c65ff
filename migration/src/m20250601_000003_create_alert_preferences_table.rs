use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AlertPreferences::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertPreferences::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AlertPreferences::UserId).uuid().not_null())
                .col(ColumnDef::new(AlertPreferences::CityName).string().not_null())
                .col(ColumnDef::new(AlertPreferences::MaxTemp).double())
                .col(ColumnDef::new(AlertPreferences::MinTemp).double())
                .col(
                    ColumnDef::new(AlertPreferences::EmailEnabled)
                        .boolean()
                        .not_null()
                        .default(true)
                )
                .col(
                    ColumnDef::new(AlertPreferences::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(
                    ColumnDef::new(AlertPreferences::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_preferences_user_id")
                .table(AlertPreferences::Table)
                .col(AlertPreferences::UserId)
                .to_owned()
        ).await?;

        // The monitor sweeps by this flag
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_preferences_email_enabled")
                .table(AlertPreferences::Table)
                .col(AlertPreferences::EmailEnabled)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AlertPreferences::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AlertPreferences {
    Table,
    Id,
    UserId,
    CityName,
    MaxTemp,
    MinTemp,
    EmailEnabled,
    CreatedAt,
    UpdatedAt,
}
