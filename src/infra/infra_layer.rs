// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "database/mod.rs"]
pub mod database;

#[path = "status/http_status_client.rs"]
pub mod status;

#[path = "system/mod.rs"]
pub mod system;
