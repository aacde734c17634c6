use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{Customers, OrderProducts, Orders, Products};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents first: orders reference customers, the join table references both sides.
        create_table(manager, &schema, Customers).await?;
        create_table(manager, &schema, Products).await?;
        create_table(manager, &schema, Orders).await?;
        create_table(manager, &schema, OrderProducts).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_customer_id")
                    .table(Orders)
                    .col(crate::entity::orders::Column::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_products_product_id")
                    .table(OrderProducts)
                    .col(crate::entity::order_products::Column::ProductId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderProducts).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers).if_exists().to_owned())
            .await
    }
}

async fn create_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}
