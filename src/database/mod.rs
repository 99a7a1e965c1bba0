pub mod cascade;
pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod table;

pub use cascade::DependentRows;
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryTable;
pub use repository::Repository;
pub use table::ResourceTable;
