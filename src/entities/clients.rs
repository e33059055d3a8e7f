use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Optional login account; a client may exist without portal access.
    #[sea_orm(unique)]
    pub user_id: Option<i32>,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    pub identification_number: String,

    pub state: String,

    pub city: String,

    pub main_street: String,

    pub secondary_street: String,

    pub building_number: String,

    pub mobile_phone_number: String,

    pub phone_number: String,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

impl Model {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(has_many = "super::packages::Entity")]
    Packages,
    #[sea_orm(has_many = "super::consolidates::Entity")]
    Consolidates,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Packages.def()
    }
}

impl Related<super::consolidates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consolidates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
