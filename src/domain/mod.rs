pub mod actor;
pub mod pagination;
pub mod status;

pub use actor::{Actor, Scope};
pub use pagination::{Page, PageParams, SortOrder, parse_order_by, validate_page_size};
pub use status::ConsolidateStatus;
