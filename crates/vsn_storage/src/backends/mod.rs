pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStorage;
