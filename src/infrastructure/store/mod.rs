//! Vector store implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryVectorStore;
pub use postgres::PostgresVectorStore;
