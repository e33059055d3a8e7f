use crate::entities::{consolidates, packages};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_consolidates_client_created")
                    .table(consolidates::Entity)
                    .col(consolidates::Column::ClientId)
                    .col((consolidates::Column::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_consolidates_status")
                    .table(consolidates::Entity)
                    .col(consolidates::Column::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_consolidates_delivery_date")
                    .table(consolidates::Entity)
                    .col(consolidates::Column::DeliveryDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_packages_consolidate")
                    .table(packages::Entity)
                    .col(packages::Column::ConsolidateId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_consolidates_client_created")
                    .table(consolidates::Entity)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_consolidates_status")
                    .table(consolidates::Entity)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_consolidates_delivery_date")
                    .table(consolidates::Entity)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_packages_consolidate")
                    .table(packages::Entity)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
