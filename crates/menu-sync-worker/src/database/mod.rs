pub mod account_repository;
pub mod event_repository;
pub mod material_repository;
pub mod menu_repository;
pub mod models;
pub mod pool;

pub use account_repository::AccountRepository;
pub use event_repository::{EventRepository, EventStore};
pub use material_repository::{MaterialRepository, MaterialStore};
pub use menu_repository::{MenuRepository, MenuStore};
pub use models::*;
pub use pool::DbPool;
