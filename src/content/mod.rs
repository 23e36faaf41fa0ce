//! Section-keyed content store.
//!
//! - `key`: `<section>.<field>` namespacing
//! - `value`: coercion and legacy double-encoding repair on read
//! - `backend`: the storage trait, with `memory` and `postgres` implementations
//! - `store`: read/write operations over a backend

mod backend;
pub mod key;
mod memory;
mod model;
mod postgres;
mod store;
pub mod value;

pub use backend::ContentBackend;
pub use memory::MemoryContentBackend;
pub use model::{ContentRow, NewRow, SaveOutcome, SectionContent, StoredRow};
pub use postgres::PgContentBackend;
pub use store::ContentStore;
