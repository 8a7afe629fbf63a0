//! Persistence layer for the patient registry.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers                                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Summary aggregate parsing                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! │  - PatientRepository / CatalogRepository                │
//! │  - RelationshipRepository                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼───────────────────┐  ┌─────────▼───────────────┐
//! │ Postgres Repository   │  │ Local Repository        │
//! │ (Diesel, r2d2 pool)   │  │ (in-memory)             │
//! └───────────────────────┘  └─────────────────────────┘
//! ```
//!
//! The repository is built once at startup (see [`factory`]) and handed to
//! the HTTP layer as an `Arc<dyn FullRepository>`; there is no global
//! instance.
//!
//! ```ignore
//! use patient_registry::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let summary = services::get_patient_summary(repo.as_ref(), 1.into()).await?;
//!     println!("{:?}", summary.general_symptoms_list);
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use services::{get_patient_summary, health_check, list_patients, parse_aggregated_list};

pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    CatalogRepository, ErrorContext, FullRepository, PatientRepository, RelationshipRepository,
    RepositoryError, RepositoryResult,
};
