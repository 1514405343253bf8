pub mod drink_repo;
pub mod error;
pub mod memory_drink_repo;

pub use drink_repo::{DrinkRow, DrinkStore, PgDrinkStore};
pub use error::RepoError;
pub use memory_drink_repo::MemoryDrinkStore;
