pub mod error;
pub mod code_table;
pub mod config;
pub mod entry;
pub mod merge;
pub mod normalize;
pub mod search;
pub mod store;
pub mod upsert;
mod lexicon;
#[cfg(feature = "sqlite")]
pub mod store_sqlite;
#[cfg(feature = "sled")]
pub mod store_sled;

pub use code_table::{CodeSpace, CodeTable};
pub use config::{Config, Engine};
pub use entry::{CodeId, EntryId, HumanEntry, StorageEntry, TagId};
pub use error::{Error, Result};
pub use lexicon::{Backend, Lexicon};
pub use search::{Fetched, SearchOutcome, Strategy};
pub use store::EntryStore;
pub use upsert::Upserted;
