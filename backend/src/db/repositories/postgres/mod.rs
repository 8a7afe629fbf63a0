//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! Every call checks out one pooled connection and runs exactly once; no
//! operation is retried.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`, `PG_DATABASE_URL` or `DB_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::Int4;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::*;
use crate::db::repository::{
    CatalogRepository, ErrorContext, PatientRepository, RelationshipRepository, RepositoryError,
    RepositoryResult,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const PATIENT_SUMMARY_SQL: &str = r#"
SELECT p.patient_id, p.firstname, p.lastname, p.email,
       (SELECT STRING_AGG(s.symptom_name, ', ' ORDER BY ps.id)
          FROM patient_symptoms ps
          JOIN symptoms s ON s.symptom_id = ps.symptom_id
         WHERE ps.patient_id = p.patient_id) AS general_symptoms_list,
       (SELECT STRING_AGG(DISTINCT d.disease_name, ', ')
          FROM patient_disease pd
          JOIN diseases d ON d.disease_id = pd.disease_id
         WHERE pd.patient_id = p.patient_id) AS distinct_diseases_list
  FROM patients p
 WHERE p.patient_id = $1
"#;

const PATIENT_TAKEN: &str = "A patient with this register or email already exists";
const SYMPTOM_TAKEN: &str = "A symptom with this name already exists";
const DISEASE_TAKEN: &str = "A disease with this code already exists";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .or_else(|_| std::env::var("DB_URL"))
            .map_err(|_| "DATABASE_URL, PG_DATABASE_URL or DB_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Errors
    /// * `ConnectionError` if the pool cannot be built or a connection cannot be checked out
    /// * `InternalError` if a migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self { pool })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run `f` on a pooled connection inside the blocking thread pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;

            f(&mut conn).map_err(|e| {
                log::debug!("{} failed: {}", operation, e);
                e.with_operation(operation)
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn not_found(entity: &str, id: impl ToString, operation: &str) -> RepositoryError {
    let id = id.to_string();
    RepositoryError::not_found_with_context(
        format!("{} {} not found", entity, id),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

/// Replace driver text on constraint failures with a client-facing message.
fn constraint_error(err: diesel::result::Error, duplicate: &str, missing: &str) -> RepositoryError {
    match RepositoryError::from(err) {
        RepositoryError::Conflict { context, .. } => {
            RepositoryError::conflict_with_context(duplicate, context)
        }
        RepositoryError::InvalidReference { context, .. } => {
            RepositoryError::invalid_reference_with_context(missing, context)
        }
        other => other,
    }
}

#[async_trait]
impl PatientRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    async fn list_patients(&self, page: Pagination) -> RepositoryResult<Vec<Patient>> {
        self.with_conn("list_patients", move |conn| {
            let rows = patients::table
                .order(patients::patient_id.asc())
                .limit(page.limit)
                .offset(page.offset)
                .select(PatientRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Patient::from).collect())
        })
        .await
    }

    async fn create_patient(&self, patient: &NewPatient) -> RepositoryResult<Patient> {
        let patient = patient.clone();
        self.with_conn("create_patient", move |conn| {
            let row = diesel::insert_into(patients::table)
                .values(NewPatientRow::from(&patient))
                .returning(PatientRow::as_returning())
                .get_result(conn)
                .map_err(|e| constraint_error(e, PATIENT_TAKEN, ""))?;
            Ok(row.into())
        })
        .await
    }

    async fn get_patient(&self, patient_id: PatientId) -> RepositoryResult<Patient> {
        self.with_conn("get_patient", move |conn| {
            patients::table
                .find(patient_id.value())
                .select(PatientRow::as_select())
                .first(conn)
                .optional()?
                .map(Patient::from)
                .ok_or_else(|| not_found("patient", patient_id, "get_patient"))
        })
        .await
    }

    async fn update_patient(
        &self,
        patient_id: PatientId,
        patient: &NewPatient,
    ) -> RepositoryResult<Patient> {
        let patient = patient.clone();
        self.with_conn("update_patient", move |conn| {
            diesel::update(patients::table.find(patient_id.value()))
                .set(PatientChanges::from(&patient))
                .returning(PatientRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| constraint_error(e, PATIENT_TAKEN, ""))?
                .map(Patient::from)
                .ok_or_else(|| not_found("patient", patient_id, "update_patient"))
        })
        .await
    }

    async fn delete_patient(&self, patient_id: PatientId) -> RepositoryResult<bool> {
        self.with_conn("delete_patient", move |conn| {
            let removed =
                diesel::delete(patients::table.find(patient_id.value())).execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn get_patient_summary(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<PatientSummaryRow> {
        self.with_conn("get_patient_summary", move |conn| {
            sql_query(PATIENT_SUMMARY_SQL)
                .bind::<Int4, _>(patient_id.value())
                .get_result::<PatientSummarySqlRow>(conn)
                .optional()?
                .map(PatientSummaryRow::from)
                .ok_or_else(|| not_found("patient", patient_id, "get_patient_summary"))
        })
        .await
    }
}

#[async_trait]
impl CatalogRepository for PostgresRepository {
    async fn list_symptoms(&self) -> RepositoryResult<Vec<Symptom>> {
        self.with_conn("list_symptoms", |conn| {
            let rows = symptoms::table
                .order(symptoms::symptom_id.asc())
                .select(SymptomRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Symptom::from).collect())
        })
        .await
    }

    async fn create_symptom(&self, symptom: &NewSymptom) -> RepositoryResult<Symptom> {
        let symptom = symptom.clone();
        self.with_conn("create_symptom", move |conn| {
            let row = diesel::insert_into(symptoms::table)
                .values(NewSymptomRow {
                    symptom_name: &symptom.symptom_name,
                    symptom_description: symptom.symptom_description.as_deref(),
                })
                .returning(SymptomRow::as_returning())
                .get_result(conn)
                .map_err(|e| constraint_error(e, SYMPTOM_TAKEN, ""))?;
            Ok(row.into())
        })
        .await
    }

    async fn get_symptom(&self, symptom_id: SymptomId) -> RepositoryResult<Symptom> {
        self.with_conn("get_symptom", move |conn| {
            symptoms::table
                .find(symptom_id.value())
                .select(SymptomRow::as_select())
                .first(conn)
                .optional()?
                .map(Symptom::from)
                .ok_or_else(|| not_found("symptom", symptom_id, "get_symptom"))
        })
        .await
    }

    async fn update_symptom(
        &self,
        symptom_id: SymptomId,
        symptom: &NewSymptom,
    ) -> RepositoryResult<Symptom> {
        let symptom = symptom.clone();
        self.with_conn("update_symptom", move |conn| {
            diesel::update(symptoms::table.find(symptom_id.value()))
                .set(SymptomChanges {
                    symptom_name: &symptom.symptom_name,
                    symptom_description: symptom.symptom_description.as_deref(),
                    updated_at: Utc::now().naive_utc(),
                })
                .returning(SymptomRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| constraint_error(e, SYMPTOM_TAKEN, ""))?
                .map(Symptom::from)
                .ok_or_else(|| not_found("symptom", symptom_id, "update_symptom"))
        })
        .await
    }

    async fn delete_symptom(&self, symptom_id: SymptomId) -> RepositoryResult<bool> {
        self.with_conn("delete_symptom", move |conn| {
            let removed =
                diesel::delete(symptoms::table.find(symptom_id.value())).execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_diseases(&self) -> RepositoryResult<Vec<Disease>> {
        self.with_conn("list_diseases", |conn| {
            let rows = diseases::table
                .order(diseases::disease_id.asc())
                .select(DiseaseRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Disease::from).collect())
        })
        .await
    }

    async fn create_disease(&self, disease: &NewDisease) -> RepositoryResult<Disease> {
        let disease = disease.clone();
        self.with_conn("create_disease", move |conn| {
            let row = diesel::insert_into(diseases::table)
                .values(NewDiseaseRow {
                    disease_name: &disease.disease_name,
                    disease_code: &disease.disease_code,
                    disease_description: disease.disease_description.as_deref(),
                    disease_treatment: disease.disease_treatment.as_ref(),
                })
                .returning(DiseaseRow::as_returning())
                .get_result(conn)
                .map_err(|e| constraint_error(e, DISEASE_TAKEN, ""))?;
            Ok(row.into())
        })
        .await
    }

    async fn get_disease(&self, disease_id: DiseaseId) -> RepositoryResult<Disease> {
        self.with_conn("get_disease", move |conn| {
            diseases::table
                .find(disease_id.value())
                .select(DiseaseRow::as_select())
                .first(conn)
                .optional()?
                .map(Disease::from)
                .ok_or_else(|| not_found("disease", disease_id, "get_disease"))
        })
        .await
    }

    async fn update_disease(
        &self,
        disease_id: DiseaseId,
        disease: &NewDisease,
    ) -> RepositoryResult<Disease> {
        let disease = disease.clone();
        self.with_conn("update_disease", move |conn| {
            diesel::update(diseases::table.find(disease_id.value()))
                .set(DiseaseChanges {
                    disease_name: &disease.disease_name,
                    disease_code: &disease.disease_code,
                    disease_description: disease.disease_description.as_deref(),
                    disease_treatment: disease.disease_treatment.as_ref(),
                    updated_at: Utc::now().naive_utc(),
                })
                .returning(DiseaseRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| constraint_error(e, DISEASE_TAKEN, ""))?
                .map(Disease::from)
                .ok_or_else(|| not_found("disease", disease_id, "update_disease"))
        })
        .await
    }

    async fn delete_disease(&self, disease_id: DiseaseId) -> RepositoryResult<bool> {
        self.with_conn("delete_disease", move |conn| {
            match diesel::delete(diseases::table.find(disease_id.value())).execute(conn) {
                Ok(removed) => Ok(removed > 0),
                // ON DELETE RESTRICT from patient_disease
                Err(err) => match RepositoryError::from(err) {
                    RepositoryError::InvalidReference { context, .. } => {
                        Err(RepositoryError::conflict_with_context(
                            format!("Disease {} is referenced by diagnosis instances", disease_id),
                            context.with_entity("disease").with_entity_id(disease_id),
                        ))
                    }
                    other => Err(other),
                },
            }
        })
        .await
    }
}

#[async_trait]
impl RelationshipRepository for PostgresRepository {
    async fn list_patient_symptoms(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<Vec<PatientSymptomEntry>> {
        self.with_conn("list_patient_symptoms", move |conn| {
            let rows: Vec<(PatientSymptomRow, String, Option<String>)> = patient_symptoms::table
                .inner_join(symptoms::table)
                .filter(patient_symptoms::patient_id.eq(patient_id.value()))
                .order(patient_symptoms::id.asc())
                .select((
                    PatientSymptomRow::as_select(),
                    symptoms::symptom_name,
                    symptoms::symptom_description,
                ))
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(row, name, description)| row.into_entry(name, description))
                .collect())
        })
        .await
    }

    async fn create_patient_symptom(
        &self,
        report: &NewPatientSymptom,
    ) -> RepositoryResult<PatientSymptom> {
        let values = NewPatientSymptomRow {
            patient_id: report.patient_id.value(),
            symptom_id: report.symptom_id.value(),
            reported_date: report.reported_date,
        };
        self.with_conn("create_patient_symptom", move |conn| {
            let row = diesel::insert_into(patient_symptoms::table)
                .values(&values)
                .returning(PatientSymptomRow::as_returning())
                .get_result(conn)
                .map_err(|e| constraint_error(e, "", "Patient or symptom not found"))?;
            Ok(row.into())
        })
        .await
    }

    async fn delete_patient_symptom(&self, id: PatientSymptomId) -> RepositoryResult<bool> {
        self.with_conn("delete_patient_symptom", move |conn| {
            let removed = diesel::delete(patient_symptoms::table.find(id.value())).execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_disease_instances(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<Vec<DiseaseInstanceEntry>> {
        self.with_conn("list_disease_instances", move |conn| {
            let rows: Vec<(DiseaseInstanceRow, String, String)> = patient_disease::table
                .inner_join(diseases::table)
                .filter(patient_disease::patient_id.eq(patient_id.value()))
                .order(patient_disease::patient_disease_id.asc())
                .select((
                    DiseaseInstanceRow::as_select(),
                    diseases::disease_name,
                    diseases::disease_code,
                ))
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(row, name, code)| row.into_entry(name, code))
                .collect())
        })
        .await
    }

    async fn create_disease_instance(
        &self,
        instance: &NewDiseaseInstance,
    ) -> RepositoryResult<DiseaseInstance> {
        let instance = instance.clone();
        self.with_conn("create_disease_instance", move |conn| {
            let row = diesel::insert_into(patient_disease::table)
                .values(NewDiseaseInstanceRow {
                    patient_id: instance.patient_id.value(),
                    disease_id: instance.disease_id.value(),
                    diagnosis_date: instance.diagnosis_date,
                    notes: instance.notes.as_deref(),
                })
                .returning(DiseaseInstanceRow::as_returning())
                .get_result(conn)
                .map_err(|e| constraint_error(e, "", "Patient or disease not found"))?;
            Ok(row.into())
        })
        .await
    }

    async fn delete_disease_instance(&self, id: DiseaseInstanceId) -> RepositoryResult<bool> {
        self.with_conn("delete_disease_instance", move |conn| {
            let removed = diesel::delete(patient_disease::table.find(id.value())).execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_instance_symptoms(
        &self,
        instance_id: DiseaseInstanceId,
    ) -> RepositoryResult<Vec<LinkedSymptom>> {
        self.with_conn("list_instance_symptoms", move |conn| {
            let rows: Vec<(InstanceSymptomRow, String, Option<String>)> =
                patient_disease_symptom::table
                    .inner_join(symptoms::table)
                    .filter(patient_disease_symptom::patient_disease_id.eq(instance_id.value()))
                    .order(patient_disease_symptom::id.asc())
                    .select((
                        InstanceSymptomRow::as_select(),
                        symptoms::symptom_name,
                        symptoms::symptom_description,
                    ))
                    .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(row, name, description)| row.into_linked(name, description))
                .collect())
        })
        .await
    }

    async fn link_instance_symptom(
        &self,
        link: &NewDiseaseInstanceSymptom,
    ) -> RepositoryResult<DiseaseInstanceSymptom> {
        let values = NewInstanceSymptomRow {
            patient_disease_id: link.patient_disease_id.value(),
            symptom_id: link.symptom_id.value(),
        };
        self.with_conn("link_instance_symptom", move |conn| {
            let row = diesel::insert_into(patient_disease_symptom::table)
                .values(&values)
                .returning(InstanceSymptomRow::as_returning())
                .get_result(conn)
                .map_err(|e| {
                    constraint_error(
                        e,
                        "Symptom already linked to this disease instance",
                        "Disease instance or symptom not found",
                    )
                })?;
            Ok(row.into())
        })
        .await
    }

    async fn unlink_instance_symptom(
        &self,
        instance_id: DiseaseInstanceId,
        symptom_id: SymptomId,
    ) -> RepositoryResult<bool> {
        self.with_conn("unlink_instance_symptom", move |conn| {
            let removed = diesel::delete(
                patient_disease_symptom::table
                    .filter(patient_disease_symptom::patient_disease_id.eq(instance_id.value()))
                    .filter(patient_disease_symptom::symptom_id.eq(symptom_id.value())),
            )
            .execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_with_url_keeps_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/registry");
        assert_eq!(config.database_url, "postgres://localhost/registry");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert_eq!(config.connection_timeout_sec, 30);
        assert_eq!(config.idle_timeout_sec, 600);
    }

    #[test]
    fn test_summary_sql_binds_single_parameter() {
        assert!(PATIENT_SUMMARY_SQL.contains("$1"));
        assert!(!PATIENT_SUMMARY_SQL.contains("$2"));
    }
}
