use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Sum of product prices when the order was placed. Not re-derived later.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub order_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::order_products::Entity")]
    OrderProducts,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::order_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderProducts.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_products::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_products::Relation::Orders.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
