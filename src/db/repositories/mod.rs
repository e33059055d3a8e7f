pub mod client;
pub mod consolidate;
pub mod package;
pub mod refresh_token;
pub mod user;
