use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_products::Entity")]
    OrderProducts,
}

impl Related<super::order_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderProducts.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_products::Relation::Orders.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_products::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
