pub mod admin_models;
pub mod admin_service;
pub mod admin_store;

pub use admin_models::{
    AdminPanel, CommandRow, ImportSummary, LegacyPrefix, Profile, QueryResult, QueryValue,
    ServerUsage,
};
pub use admin_service::{AdminError, AdminService};
pub use admin_store::{BotStore, LegacyStore};
