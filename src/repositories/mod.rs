pub mod entity_store;
pub mod memory_store;
pub mod pg_store;

pub use entity_store::EntityStore;
pub use memory_store::InMemoryStore;
pub use pg_store::PgStore;
