//! `SeaORM` implementation of the `DashboardService` trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::db::Store;
use crate::domain::{Actor, ConsolidateStatus, Scope};
use crate::services::dashboard_service::{
    DEFAULT_RECENT_LIMIT, DashboardError, DashboardService, DashboardStats, MAX_RECENT_LIMIT,
};

pub struct SeaOrmDashboardService {
    store: Store,
}

impl SeaOrmDashboardService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn empty_status_buckets() -> BTreeMap<String, u64> {
    ConsolidateStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect()
}

#[async_trait]
impl DashboardService for SeaOrmDashboardService {
    async fn stats(
        &self,
        actor: &Actor,
        recent_limit: Option<u64>,
    ) -> Result<DashboardStats, DashboardError> {
        if !actor.is_authenticated() {
            return Err(DashboardError::AuthenticationRequired);
        }

        let limit = recent_limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);

        let scope = match actor.scope() {
            Scope::All => None,
            Scope::Client(id) => Some(id),
            // Authenticated but unlinked: everything in scope is empty.
            Scope::Nothing => {
                return Ok(DashboardStats {
                    total_clients: 0,
                    total_packages: 0,
                    packages_last_30_days: 0,
                    unconsolidated_packages: 0,
                    packages_pending: 0,
                    packages_in_transit: 0,
                    packages_delivered: 0,
                    total_consolidates: 0,
                    consolidates_by_status: empty_status_buckets(),
                    total_real_price: 0.0,
                    total_service_price: 0.0,
                    recent_packages: Vec::new(),
                    recent_consolidates: Vec::new(),
                });
            }
        };

        let cutoff = chrono::Utc::now() - chrono::Duration::days(30);

        let total_packages = self.store.count_packages(scope).await?;
        let packages_last_30_days = self.store.count_packages_since(scope, cutoff).await?;
        let unconsolidated_packages = self.store.count_unconsolidated_packages(scope).await?;
        let packages_pending = self.store.count_pending_packages(scope).await?;
        let packages_in_transit = self
            .store
            .count_packages_with_consolidate_status(scope, ConsolidateStatus::InTransit.as_str())
            .await?;
        let packages_delivered = self
            .store
            .count_packages_with_consolidate_status(scope, ConsolidateStatus::Delivered.as_str())
            .await?;
        let total_consolidates = self.store.count_consolidates(scope).await?;

        let mut consolidates_by_status = empty_status_buckets();
        for (status, count) in self.store.consolidate_status_counts(scope).await? {
            consolidates_by_status.insert(status, u64::try_from(count).unwrap_or(0));
        }

        // Admin-only aggregates; zero for everyone else, never scoped sums.
        let (total_clients, total_real_price, total_service_price) = if actor.is_admin() {
            let clients = self.store.count_clients().await?;
            let (real, service) = self.store.package_price_totals(None).await?;
            (clients, real, service)
        } else {
            (0, 0.0, 0.0)
        };

        let recent_packages = self.store.recent_packages(scope, limit).await?;
        let recent_consolidates = self.store.recent_consolidates(scope, limit).await?;

        Ok(DashboardStats {
            total_clients,
            total_packages,
            packages_last_30_days,
            unconsolidated_packages,
            packages_pending,
            packages_in_transit,
            packages_delivered,
            total_consolidates,
            consolidates_by_status,
            total_real_price,
            total_service_price,
            recent_packages,
            recent_consolidates,
        })
    }
}
