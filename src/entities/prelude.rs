pub use super::clients::Entity as Clients;
pub use super::consolidates::Entity as Consolidates;
pub use super::packages::Entity as Packages;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::users::Entity as Users;
