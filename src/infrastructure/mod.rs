pub mod database;
pub mod memory;

pub use database::{init_database, SeaOrmRepositoryProvider};
pub use memory::MemoryProvider;
