// Database adapters.
// - `sqlite_bot_store.rs` is the primary database (`command`, `server`, `profile`).
// - `legacy_store.rs` reads the previous bot version's file during migrations.

#[path = "sqlite_bot_store.rs"]
pub mod sqlite_bot_store;

#[path = "legacy_store.rs"]
pub mod legacy_store;

pub use legacy_store::SqliteLegacyStore;
pub use sqlite_bot_store::SqliteBotStore;
