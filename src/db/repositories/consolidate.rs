use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};

use crate::domain::SortOrder;
use crate::entities::{clients, consolidates, packages};

use super::client::sort_direction;

/// Fields accepted when grouping packages into a consolidate. The caller
/// must have validated the package set beforehand.
#[derive(Debug, Clone)]
pub struct NewConsolidate {
    pub description: String,
    pub status: String,
    pub delivery_date: Option<chrono::NaiveDate>,
    pub comment: Option<String>,
    pub client_id: i32,
    pub package_ids: Vec<i32>,
}

/// Partial update; `package_ids` replaces the whole membership when given.
#[derive(Debug, Clone, Default)]
pub struct ConsolidateChanges {
    pub description: Option<String>,
    pub status: Option<String>,
    pub delivery_date: Option<Option<chrono::NaiveDate>>,
    pub comment: Option<Option<String>>,
    pub package_ids: Option<Vec<i32>>,
}

pub struct ConsolidateRepository {
    conn: DatabaseConnection,
}

impl ConsolidateRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert the consolidate and attach its packages in one transaction.
    pub async fn create(&self, data: NewConsolidate) -> Result<consolidates::Model> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now();

        let consolidate = consolidates::ActiveModel {
            description: Set(data.description),
            status: Set(data.status),
            delivery_date: Set(data.delivery_date),
            comment: Set(data.comment),
            extra_attributes: Set(serde_json::json!({})),
            client_id: Set(data.client_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let consolidate = consolidate
            .insert(&txn)
            .await
            .context("Failed to insert consolidate")?;

        attach_packages(&txn, consolidate.id, &data.package_ids).await?;

        txn.commit().await?;
        Ok(consolidate)
    }

    pub async fn get(&self, id: i32) -> Result<Option<consolidates::Model>> {
        consolidates::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query consolidate by ID")
    }

    /// Apply scalar changes and, when `package_ids` is present, swap the
    /// membership to exactly that set. Runs in one transaction.
    pub async fn update(
        &self,
        consolidate: consolidates::Model,
        changes: ConsolidateChanges,
    ) -> Result<consolidates::Model> {
        let txn = self.conn.begin().await?;
        let id = consolidate.id;

        let mut active: consolidates::ActiveModel = consolidate.into();
        if let Some(v) = changes.description {
            active.description = Set(v);
        }
        if let Some(v) = changes.status {
            active.status = Set(v);
        }
        if let Some(v) = changes.delivery_date {
            active.delivery_date = Set(v);
        }
        if let Some(v) = changes.comment {
            active.comment = Set(v);
        }
        active.updated_at = Set(chrono::Utc::now());

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update consolidate")?;

        if let Some(ids) = changes.package_ids {
            detach_packages_except(&txn, id, &ids).await?;
            attach_packages(&txn, id, &ids).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Release member packages and delete the row.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        detach_packages_except(&txn, id, &[]).await?;

        let res = consolidates::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete consolidate")?;

        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    /// Paginated listing; the search term matches the owning client's name
    /// and email.
    pub async fn list(
        &self,
        client_scope: Option<i32>,
        status: Option<&str>,
        search: Option<&str>,
        order: (&str, SortOrder),
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<consolidates::Model>, u64)> {
        let mut query = consolidates::Entity::find()
            .join(JoinType::InnerJoin, consolidates::Relation::Client.def());

        if let Some(id) = client_scope {
            query = query.filter(consolidates::Column::ClientId.eq(id));
        }

        if let Some(status) = status {
            query = query.filter(consolidates::Column::Status.eq(status));
        }

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(clients::Column::FirstName.contains(term))
                    .add(clients::Column::LastName.contains(term))
                    .add(clients::Column::Email.contains(term)),
            );
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count consolidates")?;

        let (field, dir) = order;
        let dir = sort_direction(dir);
        let query = match field {
            "description" => query.order_by(consolidates::Column::Description, dir),
            "status" => query.order_by(consolidates::Column::Status, dir),
            "delivery_date" => query.order_by(consolidates::Column::DeliveryDate, dir),
            "updated_at" => query.order_by(consolidates::Column::UpdatedAt, dir),
            "id" => query.order_by(consolidates::Column::Id, dir),
            "client_name" => query.order_by(
                Expr::cust("clients.first_name || ' ' || clients.last_name"),
                dir,
            ),
            _ => query.order_by(consolidates::Column::CreatedAt, dir),
        };

        let rows = query
            .offset(page.saturating_sub(1).saturating_mul(page_size))
            .limit(page_size)
            .all(&self.conn)
            .await
            .context("Failed to list consolidates")?;

        Ok((rows, total))
    }

    pub async fn count(&self, client_scope: Option<i32>) -> Result<u64> {
        let mut query = consolidates::Entity::find();
        if let Some(id) = client_scope {
            query = query.filter(consolidates::Column::ClientId.eq(id));
        }
        query
            .count(&self.conn)
            .await
            .context("Failed to count consolidates")
    }

    /// Row counts per status value.
    pub async fn status_counts(&self, client_scope: Option<i32>) -> Result<Vec<(String, i64)>> {
        let mut query = consolidates::Entity::find()
            .select_only()
            .column(consolidates::Column::Status)
            .column_as(consolidates::Column::Id.count(), "count")
            .group_by(consolidates::Column::Status);

        if let Some(id) = client_scope {
            query = query.filter(consolidates::Column::ClientId.eq(id));
        }

        query
            .into_tuple::<(String, i64)>()
            .all(&self.conn)
            .await
            .context("Failed to count consolidates by status")
    }

    pub async fn recent(
        &self,
        client_scope: Option<i32>,
        limit: u64,
    ) -> Result<Vec<consolidates::Model>> {
        let mut query = consolidates::Entity::find();
        if let Some(id) = client_scope {
            query = query.filter(consolidates::Column::ClientId.eq(id));
        }
        query
            .order_by_desc(consolidates::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent consolidates")
    }
}

async fn attach_packages<C: ConnectionTrait>(
    conn: &C,
    consolidate_id: i32,
    package_ids: &[i32],
) -> Result<()> {
    if package_ids.is_empty() {
        return Ok(());
    }

    packages::Entity::update_many()
        .col_expr(packages::Column::ConsolidateId, Expr::value(consolidate_id))
        .col_expr(packages::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(packages::Column::Id.is_in(package_ids.iter().copied()))
        .exec(conn)
        .await
        .context("Failed to attach packages to consolidate")?;

    Ok(())
}

/// Detach every member of the consolidate not in `keep`.
async fn detach_packages_except<C: ConnectionTrait>(
    conn: &C,
    consolidate_id: i32,
    keep: &[i32],
) -> Result<()> {
    let mut query = packages::Entity::update_many()
        .col_expr(packages::Column::ConsolidateId, Expr::value(Option::<i32>::None))
        .col_expr(packages::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(packages::Column::ConsolidateId.eq(consolidate_id));

    if !keep.is_empty() {
        query = query.filter(packages::Column::Id.is_not_in(keep.iter().copied()));
    }

    query
        .exec(conn)
        .await
        .context("Failed to detach packages from consolidate")?;

    Ok(())
}
