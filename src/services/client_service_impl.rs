//! `SeaORM` implementation of the `ClientService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::repositories::user::{generate_token, hash_password_blocking};
use crate::db::{ClientChanges, NewClient, Store};
use crate::domain::{Actor, Page, PageParams, SortOrder, parse_order_by, validate_page_size};
use crate::entities::clients;
use crate::services::client_service::{ClientError, ClientService, SORTABLE_FIELDS};

pub struct SeaOrmClientService {
    store: Store,
}

impl SeaOrmClientService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClientService for SeaOrmClientService {
    async fn list(
        &self,
        actor: &Actor,
        params: PageParams,
    ) -> Result<Page<clients::Model>, ClientError> {
        // The client roster is admin-only; owners read their record by id.
        if !actor.is_admin() {
            return Err(ClientError::PermissionDenied);
        }

        validate_page_size(params.page_size()).map_err(ClientError::Validation)?;
        let order = match params.order_by.as_deref() {
            Some(raw) => parse_order_by(raw, SORTABLE_FIELDS).map_err(ClientError::Validation)?,
            None => ("created_at", SortOrder::Desc),
        };

        let (rows, total) = self
            .store
            .list_clients(
                params.search_term(),
                order,
                params.page(),
                params.page_size(),
            )
            .await?;

        Ok(Page::new(rows, total, params.page(), params.page_size()))
    }

    async fn get(&self, actor: &Actor, id: i32) -> Result<clients::Model, ClientError> {
        let client = self
            .store
            .get_client(id)
            .await?
            .ok_or(ClientError::NotFound)?;

        if !actor.can_access_client(client.id) {
            return Err(ClientError::PermissionDenied);
        }

        Ok(client)
    }

    async fn create(&self, actor: &Actor, input: NewClient) -> Result<clients::Model, ClientError> {
        if !actor.is_admin() {
            return Err(ClientError::PermissionDenied);
        }

        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(ClientError::Validation(
                "First name and last name are required.".to_string(),
            ));
        }
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ClientError::Validation(
                "A valid email address is required.".to_string(),
            ));
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(ClientError::Validation(
                "A user with this email already exists.".to_string(),
            ));
        }

        // Portal account starts inactive with an unguessable password; the
        // client gains access through the password-reset flow.
        let password_hash = hash_password_blocking(generate_token()).await?;
        let user = self
            .store
            .create_user(&email, Some(&email), password_hash, false, false)
            .await?;

        let input = NewClient { email, ..input };
        let client = self.store.create_client(input, Some(user.id)).await?;

        info!(client_id = client.id, user_id = user.id, "Client created");
        Ok(client)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        changes: ClientChanges,
    ) -> Result<clients::Model, ClientError> {
        let client = self
            .store
            .get_client(id)
            .await?
            .ok_or(ClientError::NotFound)?;

        // Clients may edit their own profile; everything else is admin-only.
        if !actor.can_access_client(client.id) {
            return Err(ClientError::PermissionDenied);
        }

        Ok(self.store.update_client(client, changes).await?)
    }

    async fn delete(&self, actor: &Actor, id: i32, delete_user: bool) -> Result<(), ClientError> {
        if !actor.is_admin() {
            return Err(ClientError::PermissionDenied);
        }

        let client = self
            .store
            .get_client(id)
            .await?
            .ok_or(ClientError::NotFound)?;

        self.store.delete_client(id).await?;

        if let Some(user_id) = client.user_id {
            if delete_user {
                self.store.delete_user(user_id).await?;
            } else {
                self.store.set_user_active(user_id, false).await?;
            }
        }

        info!(client_id = id, delete_user, "Client deleted");
        Ok(())
    }
}
