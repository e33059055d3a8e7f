//! `SeaORM` implementation of the `ConsolidateService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::db::{ConsolidateChanges, NewConsolidate, Store};
use crate::domain::{
    Actor, ConsolidateStatus, Page, PageParams, Scope, SortOrder, parse_order_by,
    validate_page_size,
};
use crate::entities::{consolidates, packages};
use crate::services::consolidate_service::{
    ConsolidateDetail, ConsolidateError, ConsolidateService, CreateConsolidateInput,
    SORTABLE_FIELDS, UpdateConsolidateInput,
};
use crate::services::mailer::{self, Mailer};

pub struct SeaOrmConsolidateService {
    store: Store,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmConsolidateService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Shared membership checks: ids must be non-empty, all must exist, all
    /// must share one client, and none may sit in a different consolidate.
    /// Returns the resolved packages and their common client id.
    async fn validate_membership(
        &self,
        package_ids: &[i32],
        current_consolidate: Option<i32>,
    ) -> Result<(Vec<packages::Model>, i32), ConsolidateError> {
        if package_ids.is_empty() {
            return Err(ConsolidateError::Validation(
                "At least one package is required.".to_string(),
            ));
        }

        let packages = self.store.get_packages_by_ids(package_ids).await?;
        if packages.len() != package_ids.len() {
            let mut missing: Vec<i32> = package_ids
                .iter()
                .filter(|id| !packages.iter().any(|p| p.id == **id))
                .copied()
                .collect();
            missing.sort_unstable();
            missing.dedup();
            let missing = missing
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ConsolidateError::Validation(format!(
                "Unknown package ids: {missing}"
            )));
        }

        let client_id = packages[0].client_id;
        if packages.iter().any(|p| p.client_id != client_id) {
            return Err(ConsolidateError::Validation(
                "All packages must belong to the same client.".to_string(),
            ));
        }

        // Re-adding a package to the consolidate it is already in is fine.
        if let Some(offender) = packages
            .iter()
            .find(|p| p.consolidate_id.is_some() && p.consolidate_id != current_consolidate)
        {
            return Err(ConsolidateError::Validation(format!(
                "Package {} is already consolidated.",
                offender.barcode
            )));
        }

        Ok((packages, client_id))
    }

    async fn detail(
        &self,
        consolidate: consolidates::Model,
    ) -> Result<ConsolidateDetail, ConsolidateError> {
        let packages = self.store.get_packages_for_consolidate(consolidate.id).await?;
        Ok(ConsolidateDetail {
            consolidate,
            packages,
        })
    }
}

#[async_trait]
impl ConsolidateService for SeaOrmConsolidateService {
    async fn list(
        &self,
        actor: &Actor,
        params: PageParams,
        status: Option<String>,
    ) -> Result<Page<consolidates::Model>, ConsolidateError> {
        // Arguments are checked even when the scope turns out to be empty.
        validate_page_size(params.page_size()).map_err(ConsolidateError::Validation)?;
        let order = match params.order_by.as_deref() {
            Some(raw) => {
                parse_order_by(raw, SORTABLE_FIELDS).map_err(ConsolidateError::Validation)?
            }
            // Newest first when no order is given
            None => ("created_at", SortOrder::Desc),
        };

        let status = match status {
            Some(raw) => Some(
                raw.parse::<ConsolidateStatus>()
                    .map_err(|()| ConsolidateError::Validation(format!("Invalid status: {raw}")))?,
            ),
            None => None,
        };

        let scope = match actor.scope() {
            Scope::All => None,
            Scope::Client(id) => Some(id),
            Scope::Nothing => {
                return Ok(Page::new(Vec::new(), 0, params.page(), params.page_size()));
            }
        };

        let (rows, total) = self
            .store
            .list_consolidates(
                scope,
                status.map(|s| s.as_str()),
                params.search_term(),
                order,
                params.page(),
                params.page_size(),
            )
            .await?;

        Ok(Page::new(rows, total, params.page(), params.page_size()))
    }

    async fn get(&self, actor: &Actor, id: i32) -> Result<ConsolidateDetail, ConsolidateError> {
        let consolidate = self
            .store
            .get_consolidate(id)
            .await?
            .ok_or(ConsolidateError::NotFound)?;

        if !actor.can_access_client(consolidate.client_id) {
            return Err(ConsolidateError::PermissionDenied);
        }

        self.detail(consolidate).await
    }

    async fn create(
        &self,
        actor: &Actor,
        input: CreateConsolidateInput,
    ) -> Result<ConsolidateDetail, ConsolidateError> {
        if !actor.is_admin() {
            return Err(ConsolidateError::PermissionDenied);
        }

        let (_, client_id) = self.validate_membership(&input.package_ids, None).await?;

        let status = input
            .status
            .parse::<ConsolidateStatus>()
            .map_err(|()| ConsolidateError::Validation(format!("Invalid status: {}", input.status)))?;
        if !status.is_initial() {
            return Err(ConsolidateError::Validation(format!(
                "Invalid initial status: {status}"
            )));
        }

        let consolidate = self
            .store
            .create_consolidate(NewConsolidate {
                description: input.description,
                status: status.as_str().to_string(),
                delivery_date: input.delivery_date,
                comment: input.comment,
                client_id,
                package_ids: input.package_ids,
            })
            .await?;

        info!(
            consolidate_id = consolidate.id,
            client_id, "Consolidate created"
        );

        let detail = self.detail(consolidate).await?;

        // Notify the client; delivery failure must not fail the mutation.
        if let Some(client) = self.store.get_client(client_id).await? {
            let message =
                mailer::consolidation_created(&client, &detail.consolidate, &detail.packages);
            mailer::send_in_background(self.mailer.clone(), message);
        }

        Ok(detail)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdateConsolidateInput,
    ) -> Result<ConsolidateDetail, ConsolidateError> {
        if !actor.is_admin() {
            return Err(ConsolidateError::PermissionDenied);
        }

        let consolidate = self
            .store
            .get_consolidate(id)
            .await?
            .ok_or(ConsolidateError::NotFound)?;

        let status = match input.status {
            Some(raw) => {
                // Any recognized status is accepted after creation.
                let status = raw
                    .parse::<ConsolidateStatus>()
                    .map_err(|()| ConsolidateError::Validation(format!("Invalid status: {raw}")))?;
                Some(status.as_str().to_string())
            }
            None => None,
        };

        if let Some(ids) = &input.package_ids {
            let (_, client_id) = self.validate_membership(ids, Some(id)).await?;
            if client_id != consolidate.client_id {
                return Err(ConsolidateError::Validation(
                    "All packages must belong to the consolidate's client.".to_string(),
                ));
            }
        }

        let updated = self
            .store
            .update_consolidate(
                consolidate,
                ConsolidateChanges {
                    description: input.description,
                    status,
                    delivery_date: input.delivery_date,
                    comment: input.comment,
                    package_ids: input.package_ids,
                },
            )
            .await?;

        self.detail(updated).await
    }

    async fn delete(&self, actor: &Actor, id: i32) -> Result<(), ConsolidateError> {
        if !actor.is_admin() {
            return Err(ConsolidateError::PermissionDenied);
        }

        if !self.store.delete_consolidate(id).await? {
            return Err(ConsolidateError::NotFound);
        }

        info!(consolidate_id = id, "Consolidate deleted");
        Ok(())
    }
}
