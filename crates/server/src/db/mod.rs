//! Patient data access

mod repository;

pub use repository::PgPatientStore;

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config as PgConfig, Pool, Runtime};
use hcd_core::Patient;
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;

/// Storage failures, kept separate from HTTP concerns
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// A connection could not be established.
    #[error("{0}")]
    Unavailable(String),
    /// The statement failed or returned rows that could not be mapped.
    #[error("{0}")]
    Failure(String),
}

/// Optional filters for [`PatientStore::search`]; absent filters do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFilter {
    /// Case-insensitive substring of the given or family name
    pub name: Option<String>,
    /// Exact document id
    pub document: Option<String>,
    pub limit: i64,
}

/// Read access to the `pacientes` table.
///
/// Every call acquires its own connection and releases it before returning,
/// on success and on error alike.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), StorageError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Patient>, StorageError>;

    /// Patients in ascending id order.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Patient>, StorageError>;

    /// Patients matching all given filters, in ascending id order.
    async fn search(&self, filter: &PatientFilter) -> Result<Vec<Patient>, StorageError>;
}

/// Create a connection pool from the database settings.
///
/// No connection is opened here; the first checkout connects.
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = PgConfig::new();
    match &config.url {
        Some(url) => cfg.url = Some(url.clone()),
        None => {
            cfg.host = Some(config.host.clone());
            cfg.port = Some(config.port);
            cfg.dbname = Some(config.dbname.clone());
            cfg.user = Some(config.user.clone());
            cfg.password = Some(config.password.clone());
        }
    }
    cfg.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}
