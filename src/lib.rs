pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, PgRequestSource};
pub use error::{AppError, ConnectivityError, ExportError, NormalizeError, UnclassifiedError};
pub use service::{compare, normalize_offer, normalize_request, ReconciliationService};
