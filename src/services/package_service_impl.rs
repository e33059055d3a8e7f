//! `SeaORM` implementation of the `PackageService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{NewPackage, Store};
use crate::domain::{Actor, Page, PageParams, Scope, SortOrder, parse_order_by, validate_page_size};
use crate::entities::packages;
use crate::services::package_service::{
    PackageError, PackageService, SORTABLE_FIELDS, UpdatePackageInput,
};

pub struct SeaOrmPackageService {
    store: Store,
}

impl SeaOrmPackageService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PackageService for SeaOrmPackageService {
    async fn list(
        &self,
        actor: &Actor,
        params: PageParams,
        consolidated: Option<bool>,
        client_id: Option<i32>,
    ) -> Result<Page<packages::Model>, PackageError> {
        // Arguments are checked even when the scope turns out to be empty.
        validate_page_size(params.page_size()).map_err(PackageError::Validation)?;
        let order = match params.order_by.as_deref() {
            Some(raw) => parse_order_by(raw, SORTABLE_FIELDS).map_err(PackageError::Validation)?,
            None => ("created_at", SortOrder::Desc),
        };

        let scope = match actor.scope() {
            Scope::All => client_id,
            Scope::Client(id) => Some(id),
            Scope::Nothing => {
                return Ok(Page::new(Vec::new(), 0, params.page(), params.page_size()));
            }
        };

        let (rows, total) = self
            .store
            .list_packages(
                scope,
                consolidated,
                params.search_term(),
                order,
                params.page(),
                params.page_size(),
            )
            .await?;

        Ok(Page::new(rows, total, params.page(), params.page_size()))
    }

    async fn get(&self, actor: &Actor, id: i32) -> Result<packages::Model, PackageError> {
        let package = self
            .store
            .get_package(id)
            .await?
            .ok_or(PackageError::NotFound)?;

        if !actor.can_access_client(package.client_id) {
            return Err(PackageError::PermissionDenied);
        }

        Ok(package)
    }

    async fn create(
        &self,
        actor: &Actor,
        input: NewPackage,
    ) -> Result<packages::Model, PackageError> {
        if !actor.is_admin() {
            return Err(PackageError::PermissionDenied);
        }

        if input.barcode.trim().is_empty() {
            return Err(PackageError::Validation("Barcode is required.".to_string()));
        }
        if input.courier.trim().is_empty() {
            return Err(PackageError::Validation("Courier is required.".to_string()));
        }

        if self.store.get_client(input.client_id).await?.is_none() {
            return Err(PackageError::Validation(format!(
                "Client not found: {}",
                input.client_id
            )));
        }

        let package = self.store.create_package(input).await?;
        info!(package_id = package.id, barcode = %package.barcode, "Package registered");
        Ok(package)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdatePackageInput,
    ) -> Result<packages::Model, PackageError> {
        if !actor.is_admin() {
            return Err(PackageError::PermissionDenied);
        }

        let package = self
            .store
            .get_package(id)
            .await?
            .ok_or(PackageError::NotFound)?;

        // Presence alone is rejected, even when the value matches.
        if input.barcode.is_some() {
            return Err(PackageError::Validation(
                "Barcode cannot be modified.".to_string(),
            ));
        }

        if let Some(new_client_id) = input.changes.client_id {
            if new_client_id != package.client_id {
                if package.consolidate_id.is_some() {
                    return Err(PackageError::Validation(
                        "Cannot change the client of a consolidated package.".to_string(),
                    ));
                }
                if self.store.get_client(new_client_id).await?.is_none() {
                    return Err(PackageError::Validation(format!(
                        "Client not found: {new_client_id}"
                    )));
                }
            }
        }

        Ok(self.store.update_package(package, input.changes).await?)
    }

    async fn delete(&self, actor: &Actor, id: i32) -> Result<(), PackageError> {
        if !actor.is_admin() {
            return Err(PackageError::PermissionDenied);
        }

        let package = self
            .store
            .get_package(id)
            .await?
            .ok_or(PackageError::NotFound)?;

        if package.consolidate_id.is_some() {
            return Err(PackageError::Validation(
                "Cannot delete a consolidated package.".to_string(),
            ));
        }

        self.store.delete_package(id).await?;
        info!(package_id = id, "Package deleted");
        Ok(())
    }
}
