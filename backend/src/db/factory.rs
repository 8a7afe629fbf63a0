//! Backend selection and construction.
//!
//! The server picks its store either from a TOML file (see
//! [`RepositoryConfig`]) or from the environment, then hands back a
//! type-erased [`FullRepository`].

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum RepositoryType {
    /// Postgres through the Diesel pool
    Postgres,
    /// In-memory store
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts "postgres", "pg" or "local" in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl TryFrom<String> for RepositoryType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl RepositoryType {
    /// Backend named by the environment.
    ///
    /// `REPOSITORY_TYPE` wins when set; an unrecognised value means Local.
    /// Otherwise any of the database URL variables selects Postgres.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        let has_url = ["DATABASE_URL", "PG_DATABASE_URL", "DB_URL"]
            .iter()
            .any(|key| std::env::var(key).is_ok());
        if has_url {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

pub(crate) fn postgres_disabled() -> RepositoryError {
    RepositoryError::configuration("Postgres repository feature not enabled")
}

/// Builds repositories for the server and for tests.
///
/// # Example
/// ```ignore
/// use patient_registry::db::{RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repo = RepositoryFactory::create(RepositoryType::Local, None).await?;
///     assert!(repo.health_check().await?);
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of the given type.
    ///
    /// `postgres_config` is required for [`RepositoryType::Postgres`].
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = postgres_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Postgres repository requires PostgresConfig",
                        )
                    })?;
                    let pg = Self::create_postgres(config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    let _ = postgres_config;
                    Err(postgres_disabled())
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Connect to Postgres and run pending migrations.
    ///
    /// Pool construction and migrations block, so they run on the blocking pool.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create the repository the environment asks for.
    ///
    /// See [`RepositoryType::from_env`]; Postgres settings come from
    /// `PostgresConfig::from_env`.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env();
        let postgres = match repo_type {
            RepositoryType::Local => None,
            RepositoryType::Postgres => Some(postgres_config_from_env()?),
        };
        Self::create(repo_type, postgres.as_ref()).await
    }

    /// Create the repository described by a TOML file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        let (repo_type, postgres) = config.resolve()?;
        Self::create(repo_type, postgres.as_ref()).await
    }
}

#[cfg(feature = "postgres-repo")]
fn postgres_config_from_env() -> RepositoryResult<PostgresConfig> {
    PostgresConfig::from_env().map_err(RepositoryError::configuration)
}

#[cfg(not(feature = "postgres-repo"))]
fn postgres_config_from_env() -> RepositoryResult<PostgresConfig> {
    Err(postgres_disabled())
}
