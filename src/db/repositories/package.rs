use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::domain::SortOrder;
use crate::entities::{consolidates, packages};

use super::client::sort_direction;

/// Fields accepted when registering a package arrival.
#[derive(Debug, Clone)]
pub struct NewPackage {
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
    pub arrival_date: Option<chrono::NaiveDate>,
    pub client_id: i32,
}

/// Partial update; outer `None` leaves the column untouched, inner `None`
/// clears a nullable column. The barcode is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct PackageChanges {
    pub courier: Option<String>,
    pub other_courier: Option<Option<String>>,
    pub length: Option<Option<f64>>,
    pub width: Option<Option<f64>>,
    pub height: Option<Option<f64>>,
    pub dimension_unit: Option<Option<String>>,
    pub weight: Option<Option<f64>>,
    pub weight_unit: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub purchase_link: Option<Option<String>>,
    pub real_price: Option<Option<f64>>,
    pub service_price: Option<Option<f64>>,
    pub arrival_date: Option<Option<chrono::NaiveDate>>,
    pub client_id: Option<i32>,
}

pub struct PackageRepository {
    conn: DatabaseConnection,
}

impl PackageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, data: NewPackage) -> Result<packages::Model> {
        let now = chrono::Utc::now();

        let package = packages::ActiveModel {
            barcode: Set(data.barcode),
            courier: Set(data.courier),
            other_courier: Set(data.other_courier),
            length: Set(data.length),
            width: Set(data.width),
            height: Set(data.height),
            dimension_unit: Set(data.dimension_unit),
            weight: Set(data.weight),
            weight_unit: Set(data.weight_unit),
            description: Set(data.description),
            purchase_link: Set(data.purchase_link),
            real_price: Set(data.real_price),
            service_price: Set(data.service_price),
            arrival_date: Set(data.arrival_date),
            client_id: Set(data.client_id),
            consolidate_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        package
            .insert(&self.conn)
            .await
            .context("Failed to insert package")
    }

    pub async fn get(&self, id: i32) -> Result<Option<packages::Model>> {
        packages::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query package by ID")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<packages::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        packages::Entity::find()
            .filter(packages::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query packages by IDs")
    }

    pub async fn get_for_consolidate(&self, consolidate_id: i32) -> Result<Vec<packages::Model>> {
        packages::Entity::find()
            .filter(packages::Column::ConsolidateId.eq(consolidate_id))
            .order_by_asc(packages::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query packages for consolidate")
    }

    pub async fn update(
        &self,
        package: packages::Model,
        changes: PackageChanges,
    ) -> Result<packages::Model> {
        let mut active: packages::ActiveModel = package.into();

        if let Some(v) = changes.courier {
            active.courier = Set(v);
        }
        if let Some(v) = changes.other_courier {
            active.other_courier = Set(v);
        }
        if let Some(v) = changes.length {
            active.length = Set(v);
        }
        if let Some(v) = changes.width {
            active.width = Set(v);
        }
        if let Some(v) = changes.height {
            active.height = Set(v);
        }
        if let Some(v) = changes.dimension_unit {
            active.dimension_unit = Set(v);
        }
        if let Some(v) = changes.weight {
            active.weight = Set(v);
        }
        if let Some(v) = changes.weight_unit {
            active.weight_unit = Set(v);
        }
        if let Some(v) = changes.description {
            active.description = Set(v);
        }
        if let Some(v) = changes.purchase_link {
            active.purchase_link = Set(v);
        }
        if let Some(v) = changes.real_price {
            active.real_price = Set(v);
        }
        if let Some(v) = changes.service_price {
            active.service_price = Set(v);
        }
        if let Some(v) = changes.arrival_date {
            active.arrival_date = Set(v);
        }
        if let Some(v) = changes.client_id {
            active.client_id = Set(v);
        }
        active.updated_at = Set(chrono::Utc::now());

        active
            .update(&self.conn)
            .await
            .context("Failed to update package")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let res = packages::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete package")?;

        Ok(res.rows_affected > 0)
    }

    /// Paginated listing. `consolidated` filters on membership in any
    /// consolidate; the search term matches barcode and description.
    pub async fn list(
        &self,
        client_scope: Option<i32>,
        consolidated: Option<bool>,
        search: Option<&str>,
        order: (&str, SortOrder),
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<packages::Model>, u64)> {
        let mut query =
            packages::Entity::find().join(JoinType::InnerJoin, packages::Relation::Client.def());

        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }

        if let Some(flag) = consolidated {
            query = if flag {
                query.filter(packages::Column::ConsolidateId.is_not_null())
            } else {
                query.filter(packages::Column::ConsolidateId.is_null())
            };
        }

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(packages::Column::Barcode.contains(term))
                    .add(packages::Column::Description.contains(term)),
            );
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count packages")?;

        let (field, dir) = order;
        let dir = sort_direction(dir);
        let query = match field {
            "barcode" => query.order_by(packages::Column::Barcode, dir),
            "courier" => query.order_by(packages::Column::Courier, dir),
            "weight" => query.order_by(packages::Column::Weight, dir),
            "arrival_date" => query.order_by(packages::Column::ArrivalDate, dir),
            "updated_at" => query.order_by(packages::Column::UpdatedAt, dir),
            "id" => query.order_by(packages::Column::Id, dir),
            "client_name" => query.order_by(
                Expr::cust("clients.first_name || ' ' || clients.last_name"),
                dir,
            ),
            _ => query.order_by(packages::Column::CreatedAt, dir),
        };

        let rows = query
            .offset(page.saturating_sub(1).saturating_mul(page_size))
            .limit(page_size)
            .all(&self.conn)
            .await
            .context("Failed to list packages")?;

        Ok((rows, total))
    }

    pub async fn count(&self, client_scope: Option<i32>) -> Result<u64> {
        let mut query = packages::Entity::find();
        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }
        query
            .count(&self.conn)
            .await
            .context("Failed to count packages")
    }

    /// Packages created at or after `cutoff`.
    pub async fn count_since(
        &self,
        client_scope: Option<i32>,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        let mut query =
            packages::Entity::find().filter(packages::Column::CreatedAt.gte(cutoff));
        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }
        query
            .count(&self.conn)
            .await
            .context("Failed to count recent packages")
    }

    pub async fn count_unconsolidated(&self, client_scope: Option<i32>) -> Result<u64> {
        let mut query =
            packages::Entity::find().filter(packages::Column::ConsolidateId.is_null());
        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }
        query
            .count(&self.conn)
            .await
            .context("Failed to count unconsolidated packages")
    }

    /// Packages not yet consolidated, plus those whose consolidate is still
    /// pending.
    pub async fn count_pending(&self, client_scope: Option<i32>) -> Result<u64> {
        let mut query = packages::Entity::find()
            .join(JoinType::LeftJoin, packages::Relation::Consolidate.def())
            .filter(
                Condition::any()
                    .add(packages::Column::ConsolidateId.is_null())
                    .add(consolidates::Column::Status.eq("pending")),
            );
        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }
        query
            .count(&self.conn)
            .await
            .context("Failed to count pending packages")
    }

    /// Packages whose consolidate currently has the given status.
    pub async fn count_with_consolidate_status(
        &self,
        client_scope: Option<i32>,
        status: &str,
    ) -> Result<u64> {
        let mut query = packages::Entity::find()
            .join(JoinType::InnerJoin, packages::Relation::Consolidate.def())
            .filter(consolidates::Column::Status.eq(status));
        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }
        query
            .count(&self.conn)
            .await
            .context("Failed to count packages by consolidate status")
    }

    /// Sum of declared and service prices, as `(real, service)`.
    pub async fn price_totals(&self, client_scope: Option<i32>) -> Result<(f64, f64)> {
        let mut query = packages::Entity::find()
            .select_only()
            .column_as(packages::Column::RealPrice.sum(), "real_total")
            .column_as(packages::Column::ServicePrice.sum(), "service_total");

        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }

        let row = query
            .into_tuple::<(Option<f64>, Option<f64>)>()
            .one(&self.conn)
            .await
            .context("Failed to sum package prices")?;

        let (real, service) = row.unwrap_or((None, None));
        Ok((real.unwrap_or(0.0), service.unwrap_or(0.0)))
    }

    pub async fn recent(&self, client_scope: Option<i32>, limit: u64) -> Result<Vec<packages::Model>> {
        let mut query = packages::Entity::find();
        if let Some(id) = client_scope {
            query = query.filter(packages::Column::ClientId.eq(id));
        }
        query
            .order_by_desc(packages::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent packages")
    }
}
