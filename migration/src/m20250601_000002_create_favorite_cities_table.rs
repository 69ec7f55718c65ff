use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(FavoriteCities::Table)
                .if_not_exists()
                .col(ColumnDef::new(FavoriteCities::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(FavoriteCities::UserId).uuid().not_null())
                .col(ColumnDef::new(FavoriteCities::CityName).string().not_null())
                .col(ColumnDef::new(FavoriteCities::CountryCode).string())
                .col(
                    ColumnDef::new(FavoriteCities::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_favorite_cities_user_id")
                .table(FavoriteCities::Table)
                .col(FavoriteCities::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(FavoriteCities::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum FavoriteCities {
    Table,
    Id,
    UserId,
    CityName,
    CountryCode,
    CreatedAt,
}
