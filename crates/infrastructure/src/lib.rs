//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_directory;
mod keyset_cursor;
mod postgres_directory;

pub use in_memory_directory::InMemoryDirectory;
pub use postgres_directory::PostgresDirectory;
