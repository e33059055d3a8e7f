pub mod jwt;
pub mod mailer;
pub use mailer::{EmailMessage, LogMailer, Mailer};

pub mod client_service;
pub mod client_service_impl;
pub use client_service::{ClientError, ClientService};
pub use client_service_impl::SeaOrmClientService;

pub mod package_service;
pub mod package_service_impl;
pub use package_service::{PackageError, PackageService, UpdatePackageInput};
pub use package_service_impl::SeaOrmPackageService;

pub mod consolidate_service;
pub mod consolidate_service_impl;
pub use consolidate_service::{
    ConsolidateDetail, ConsolidateError, ConsolidateService, CreateConsolidateInput,
    UpdateConsolidateInput,
};
pub use consolidate_service_impl::SeaOrmConsolidateService;

pub mod dashboard_service;
pub mod dashboard_service_impl;
pub use dashboard_service::{DashboardError, DashboardService, DashboardStats};
pub use dashboard_service_impl::SeaOrmDashboardService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, TokenPair, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;
