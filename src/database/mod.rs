pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use models::{Comment, NewUser, Tea, User};
pub use postgres::PgStore;
pub use store::{ensure_owner, StoreError, TeaStore};
