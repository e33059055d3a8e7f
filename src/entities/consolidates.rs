use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "consolidates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub description: String,

    /// One of the [`crate::domain::ConsolidateStatus`] values.
    pub status: String,

    pub delivery_date: Option<Date>,

    pub comment: Option<String>,

    /// Free-form key/value attributes.
    pub extra_attributes: Json,

    /// Owner; immutable after creation.
    pub client_id: i32,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(has_many = "super::packages::Entity")]
    Packages,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Packages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
