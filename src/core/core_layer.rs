// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "admin/mod.rs"]
pub mod admin;

#[path = "eval/mod.rs"]
pub mod eval;

#[path = "extensions/extension_registry.rs"]
pub mod extensions;

#[path = "formatting/formatters.rs"]
pub mod formatting;

#[path = "stats/bot_stats.rs"]
pub mod stats;

#[path = "status/mod.rs"]
pub mod status;
