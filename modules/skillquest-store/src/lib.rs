//! Persistence for quests, quest progress, employees and skills.
//!
//! Two implementations share the same contracts: `PgStore` (Postgres, one
//! transaction per mutating call) and `MemoryStore` (tests and local runs).

pub mod error;
pub mod memory;
pub mod pg;
pub mod traits;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use traits::{Aggregate, EmployeeStore, QuestStore};
