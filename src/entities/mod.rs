pub mod prelude;

pub mod clients;
pub mod consolidates;
pub mod packages;
pub mod refresh_tokens;
pub mod users;
