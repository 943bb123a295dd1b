pub mod status_models;
pub mod status_parsers;
pub mod status_service;

pub use status_models::{ComponentStatus, NewsArticle, StatusReport, StatusUrls};
pub use status_service::{
    format_overbot_status, format_overwatch_status, StatusClient, StatusError, StatusService,
};
