use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wishlist_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wishlist_collections::Entity",
        from = "Column::GroupId",
        to = "super::wishlist_collections::Column::Id"
    )]
    WishlistCollections,
}

impl Related<super::wishlist_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishlistCollections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
