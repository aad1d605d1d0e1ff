mod commands;
mod query;

pub use commands::{present_add, present_delete, present_reserve, Deleted, ReserveRequest};
pub use query::{reserved_presents, search_presents, wishlist_presents, wishlist_unreserved_presents, SearchQuery};
