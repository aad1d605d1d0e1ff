pub mod manager;
pub mod memory;
pub mod models;
pub mod pg_store;
pub mod query_builder;
pub mod repository;

pub use manager::DatabaseManager;
pub use memory::MemoryPresentStore;
pub use models::Present;
pub use pg_store::PgPresentStore;
pub use repository::{PresentStore, ReserveOutcome, StoreError};
