use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Tracking barcode; immutable once the row exists.
    pub barcode: String,

    pub courier: String,

    pub other_courier: Option<String>,

    pub length: Option<f64>,

    pub width: Option<f64>,

    pub height: Option<f64>,

    pub dimension_unit: Option<String>,

    pub weight: Option<f64>,

    pub weight_unit: Option<String>,

    pub description: Option<String>,

    pub purchase_link: Option<String>,

    pub real_price: Option<f64>,

    pub service_price: Option<f64>,

    pub arrival_date: Option<Date>,

    pub client_id: i32,

    /// At most one consolidate per package, enforced structurally.
    pub consolidate_id: Option<i32>,

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
    #[sea_orm(
        belongs_to = "super::consolidates::Entity",
        from = "Column::ConsolidateId",
        to = "super::consolidates::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Consolidate,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::consolidates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consolidate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
