use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::SortOrder;
use crate::entities::clients;

/// Fields accepted when registering a client.
#[derive(Debug, Clone)]
pub struct NewClient {
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
}

/// Partial update; `None` leaves the column untouched. The email and the
/// user link are not updatable through this path.
#[derive(Debug, Clone, Default)]
pub struct ClientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub identification_number: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub main_street: Option<String>,
    pub secondary_street: Option<String>,
    pub building_number: Option<String>,
    pub mobile_phone_number: Option<String>,
    pub phone_number: Option<String>,
}

pub struct ClientRepository {
    conn: DatabaseConnection,
}

impl ClientRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, data: NewClient, user_id: Option<i32>) -> Result<clients::Model> {
        let now = chrono::Utc::now();

        let client = clients::ActiveModel {
            user_id: Set(user_id),
            first_name: Set(data.first_name),
            last_name: Set(data.last_name),
            email: Set(data.email),
            identification_number: Set(data.identification_number),
            state: Set(data.state),
            city: Set(data.city),
            main_street: Set(data.main_street),
            secondary_street: Set(data.secondary_street),
            building_number: Set(data.building_number),
            mobile_phone_number: Set(data.mobile_phone_number),
            phone_number: Set(data.phone_number),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        client
            .insert(&self.conn)
            .await
            .context("Failed to insert client")
    }

    pub async fn get(&self, id: i32) -> Result<Option<clients::Model>> {
        clients::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query client by ID")
    }

    pub async fn get_by_user_id(&self, user_id: i32) -> Result<Option<clients::Model>> {
        clients::Entity::find()
            .filter(clients::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query client by user ID")
    }

    pub async fn update(
        &self,
        client: clients::Model,
        changes: ClientChanges,
    ) -> Result<clients::Model> {
        let mut active: clients::ActiveModel = client.into();

        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.identification_number {
            active.identification_number = Set(v);
        }
        if let Some(v) = changes.state {
            active.state = Set(v);
        }
        if let Some(v) = changes.city {
            active.city = Set(v);
        }
        if let Some(v) = changes.main_street {
            active.main_street = Set(v);
        }
        if let Some(v) = changes.secondary_street {
            active.secondary_street = Set(v);
        }
        if let Some(v) = changes.building_number {
            active.building_number = Set(v);
        }
        if let Some(v) = changes.mobile_phone_number {
            active.mobile_phone_number = Set(v);
        }
        if let Some(v) = changes.phone_number {
            active.phone_number = Set(v);
        }
        active.updated_at = Set(chrono::Utc::now());

        active
            .update(&self.conn)
            .await
            .context("Failed to update client")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let res = clients::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete client")?;

        Ok(res.rows_affected > 0)
    }

    /// Paginated listing over the whole roster.
    pub async fn list(
        &self,
        search: Option<&str>,
        order: (&str, SortOrder),
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<clients::Model>, u64)> {
        let mut query = clients::Entity::find();

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(clients::Column::FirstName.contains(term))
                    .add(clients::Column::LastName.contains(term))
                    .add(clients::Column::Email.contains(term))
                    .add(clients::Column::IdentificationNumber.contains(term))
                    .add(clients::Column::MobilePhoneNumber.contains(term)),
            );
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count clients")?;

        let (field, dir) = order;
        let dir = sort_direction(dir);
        let query = match field {
            "full_name" => query.order_by(Expr::cust("first_name || ' ' || last_name"), dir),
            "first_name" => query.order_by(clients::Column::FirstName, dir),
            "last_name" => query.order_by(clients::Column::LastName, dir),
            "email" => query.order_by(clients::Column::Email, dir),
            "identification_number" => {
                query.order_by(clients::Column::IdentificationNumber, dir)
            }
            "updated_at" => query.order_by(clients::Column::UpdatedAt, dir),
            "id" => query.order_by(clients::Column::Id, dir),
            _ => query.order_by(clients::Column::CreatedAt, dir),
        };

        let rows = query
            .offset(page.saturating_sub(1).saturating_mul(page_size))
            .limit(page_size)
            .all(&self.conn)
            .await
            .context("Failed to list clients")?;

        Ok((rows, total))
    }

    pub async fn count(&self) -> Result<u64> {
        clients::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count clients")
    }
}

pub(crate) fn sort_direction(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}
