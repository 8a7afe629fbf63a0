//! In-memory local repository implementation.
//!
//! Implements every repository trait on top of ordered maps guarded by a
//! single lock. Observable behaviour mirrors the Postgres schema: unique
//! columns raise `Conflict`, dangling references raise `InvalidReference`,
//! and deletes cascade (or are restricted) the same way the foreign keys do.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::*;

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same data.
///
/// # Example
/// ```
/// use patient_registry::db::repositories::LocalRepository;
/// use patient_registry::db::PatientRepository;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    patients: BTreeMap<i32, Patient>,
    symptoms: BTreeMap<i32, Symptom>,
    diseases: BTreeMap<i32, Disease>,
    patient_symptoms: BTreeMap<i32, PatientSymptom>,
    disease_instances: BTreeMap<i32, DiseaseInstance>,
    instance_symptoms: BTreeMap<i32, DiseaseInstanceSymptom>,

    // ID sequences, one per table
    next_patient_id: i32,
    next_symptom_id: i32,
    next_disease_id: i32,
    next_patient_symptom_id: i32,
    next_instance_id: i32,
    next_link_id: i32,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            patients: BTreeMap::new(),
            symptoms: BTreeMap::new(),
            diseases: BTreeMap::new(),
            patient_symptoms: BTreeMap::new(),
            disease_instances: BTreeMap::new(),
            instance_symptoms: BTreeMap::new(),
            next_patient_id: 1,
            next_symptom_id: 1,
            next_disease_id: 1,
            next_patient_symptom_id: 1,
            next_instance_id: 1,
            next_link_id: 1,
            is_healthy: true,
        }
    }
}

fn next_id(counter: &mut i32) -> i32 {
    let id = *counter;
    *counter += 1;
    id
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn join_names<I: IntoIterator<Item = String>>(names: I) -> Option<String> {
    let joined = names.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

impl LocalData {
    fn check_patient_unique(
        &self,
        patient: &NewPatient,
        except: Option<i32>,
        operation: &str,
    ) -> RepositoryResult<()> {
        for (id, existing) in &self.patients {
            if Some(*id) == except {
                continue;
            }
            if existing.register == patient.register {
                return Err(RepositoryError::conflict_with_context(
                    format!("register '{}' already exists", patient.register),
                    ErrorContext::new(operation).with_entity("patient"),
                ));
            }
            if existing.email == patient.email {
                return Err(RepositoryError::conflict_with_context(
                    format!("email '{}' already exists", patient.email),
                    ErrorContext::new(operation).with_entity("patient"),
                ));
            }
        }
        Ok(())
    }

    fn check_symptom_unique(
        &self,
        name: &str,
        except: Option<i32>,
        operation: &str,
    ) -> RepositoryResult<()> {
        let taken = self
            .symptoms
            .iter()
            .any(|(id, s)| Some(*id) != except && s.symptom_name == name);
        if taken {
            return Err(RepositoryError::conflict_with_context(
                format!("symptom_name '{}' already exists", name),
                ErrorContext::new(operation).with_entity("symptom"),
            ));
        }
        Ok(())
    }

    fn check_disease_unique(
        &self,
        code: &str,
        except: Option<i32>,
        operation: &str,
    ) -> RepositoryResult<()> {
        let taken = self
            .diseases
            .iter()
            .any(|(id, d)| Some(*id) != except && d.disease_code == code);
        if taken {
            return Err(RepositoryError::conflict_with_context(
                format!("disease_code '{}' already exists", code),
                ErrorContext::new(operation).with_entity("disease"),
            ));
        }
        Ok(())
    }

    fn require_patient(&self, id: PatientId, operation: &str) -> RepositoryResult<()> {
        if self.patients.contains_key(&id.value()) {
            Ok(())
        } else {
            Err(RepositoryError::invalid_reference_with_context(
                format!("patient {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("patient")
                    .with_entity_id(id),
            ))
        }
    }

    fn require_symptom(&self, id: SymptomId, operation: &str) -> RepositoryResult<()> {
        if self.symptoms.contains_key(&id.value()) {
            Ok(())
        } else {
            Err(RepositoryError::invalid_reference_with_context(
                format!("symptom {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("symptom")
                    .with_entity_id(id),
            ))
        }
    }

    fn require_disease(&self, id: DiseaseId, operation: &str) -> RepositoryResult<()> {
        if self.diseases.contains_key(&id.value()) {
            Ok(())
        } else {
            Err(RepositoryError::invalid_reference_with_context(
                format!("disease {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("disease")
                    .with_entity_id(id),
            ))
        }
    }

    fn require_instance(&self, id: DiseaseInstanceId, operation: &str) -> RepositoryResult<()> {
        if self.disease_instances.contains_key(&id.value()) {
            Ok(())
        } else {
            Err(RepositoryError::invalid_reference_with_context(
                format!("disease instance {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("disease_instance")
                    .with_entity_id(id),
            ))
        }
    }

    fn remove_instance_cascade(&mut self, instance_id: i32) -> bool {
        let removed = self.disease_instances.remove(&instance_id).is_some();
        if removed {
            self.instance_symptoms
                .retain(|_, link| link.patient_disease_id.value() != instance_id);
        }
        removed
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data and reset the id sequences.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of stored patients.
    pub fn patient_count(&self) -> usize {
        self.data.read().patients.len()
    }

    /// Number of general symptom reports across all patients.
    pub fn patient_symptom_count(&self) -> usize {
        self.data.read().patient_symptoms.len()
    }

    /// Number of diagnosis instances across all patients.
    pub fn disease_instance_count(&self) -> usize {
        self.data.read().disease_instances.len()
    }

    /// Number of diagnosis-to-symptom links.
    pub fn instance_symptom_count(&self) -> usize {
        self.data.read().instance_symptoms.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection(
                "Local repository marked unhealthy",
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PatientRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_patients(&self, page: Pagination) -> RepositoryResult<Vec<Patient>> {
        self.check_health()?;
        let data = self.data.read();
        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(data
            .patients
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_patient(&self, patient: &NewPatient) -> RepositoryResult<Patient> {
        self.check_health()?;
        let mut data = self.data.write();
        data.check_patient_unique(patient, None, "create_patient")?;
        let id = next_id(&mut data.next_patient_id);
        let stored = patient.clone().into_patient(PatientId::new(id));
        data.patients.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_patient(&self, patient_id: PatientId) -> RepositoryResult<Patient> {
        self.check_health()?;
        self.data
            .read()
            .patients
            .get(&patient_id.value())
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Patient {} not found", patient_id),
                    ErrorContext::new("get_patient")
                        .with_entity("patient")
                        .with_entity_id(patient_id),
                )
            })
    }

    async fn update_patient(
        &self,
        patient_id: PatientId,
        patient: &NewPatient,
    ) -> RepositoryResult<Patient> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.patients.contains_key(&patient_id.value()) {
            return Err(RepositoryError::not_found_with_context(
                format!("Patient {} not found", patient_id),
                ErrorContext::new("update_patient")
                    .with_entity("patient")
                    .with_entity_id(patient_id),
            ));
        }
        data.check_patient_unique(patient, Some(patient_id.value()), "update_patient")?;
        let stored = patient.clone().into_patient(patient_id);
        data.patients.insert(patient_id.value(), stored.clone());
        Ok(stored)
    }

    async fn delete_patient(&self, patient_id: PatientId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.patients.remove(&patient_id.value()).is_none() {
            return Ok(false);
        }
        data.patient_symptoms
            .retain(|_, report| report.patient_id != patient_id);
        let instance_ids: Vec<i32> = data
            .disease_instances
            .values()
            .filter(|instance| instance.patient_id == patient_id)
            .map(|instance| instance.patient_disease_id.value())
            .collect();
        for instance_id in instance_ids {
            data.remove_instance_cascade(instance_id);
        }
        Ok(true)
    }

    async fn get_patient_summary(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<PatientSummaryRow> {
        self.check_health()?;
        let data = self.data.read();
        let patient = data.patients.get(&patient_id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Patient {} not found", patient_id),
                ErrorContext::new("get_patient_summary")
                    .with_entity("patient")
                    .with_entity_id(patient_id),
            )
        })?;

        let symptoms = data
            .patient_symptoms
            .values()
            .filter(|report| report.patient_id == patient_id)
            .filter_map(|report| data.symptoms.get(&report.symptom_id.value()))
            .map(|symptom| symptom.symptom_name.clone());

        // Distinct names come back sorted, matching STRING_AGG(DISTINCT ...).
        let diseases: BTreeSet<String> = data
            .disease_instances
            .values()
            .filter(|instance| instance.patient_id == patient_id)
            .filter_map(|instance| data.diseases.get(&instance.disease_id.value()))
            .map(|disease| disease.disease_name.clone())
            .collect();

        Ok(PatientSummaryRow {
            patient_id,
            firstname: patient.firstname.clone(),
            lastname: patient.lastname.clone(),
            email: patient.email.clone(),
            general_symptoms_list: join_names(symptoms),
            distinct_diseases_list: join_names(diseases),
        })
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn list_symptoms(&self) -> RepositoryResult<Vec<Symptom>> {
        self.check_health()?;
        Ok(self.data.read().symptoms.values().cloned().collect())
    }

    async fn create_symptom(&self, symptom: &NewSymptom) -> RepositoryResult<Symptom> {
        self.check_health()?;
        let mut data = self.data.write();
        data.check_symptom_unique(&symptom.symptom_name, None, "create_symptom")?;
        let id = next_id(&mut data.next_symptom_id);
        let ts = now();
        let stored = Symptom {
            symptom_id: SymptomId::new(id),
            symptom_name: symptom.symptom_name.clone(),
            symptom_description: symptom.symptom_description.clone(),
            created_at: ts,
            updated_at: ts,
        };
        data.symptoms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_symptom(&self, symptom_id: SymptomId) -> RepositoryResult<Symptom> {
        self.check_health()?;
        self.data
            .read()
            .symptoms
            .get(&symptom_id.value())
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Symptom {} not found", symptom_id),
                    ErrorContext::new("get_symptom")
                        .with_entity("symptom")
                        .with_entity_id(symptom_id),
                )
            })
    }

    async fn update_symptom(
        &self,
        symptom_id: SymptomId,
        symptom: &NewSymptom,
    ) -> RepositoryResult<Symptom> {
        self.check_health()?;
        let mut data = self.data.write();
        let created_at = data
            .symptoms
            .get(&symptom_id.value())
            .map(|existing| existing.created_at)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Symptom {} not found", symptom_id),
                    ErrorContext::new("update_symptom")
                        .with_entity("symptom")
                        .with_entity_id(symptom_id),
                )
            })?;
        data.check_symptom_unique(
            &symptom.symptom_name,
            Some(symptom_id.value()),
            "update_symptom",
        )?;
        let stored = Symptom {
            symptom_id,
            symptom_name: symptom.symptom_name.clone(),
            symptom_description: symptom.symptom_description.clone(),
            created_at,
            updated_at: now(),
        };
        data.symptoms.insert(symptom_id.value(), stored.clone());
        Ok(stored)
    }

    async fn delete_symptom(&self, symptom_id: SymptomId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.symptoms.remove(&symptom_id.value()).is_none() {
            return Ok(false);
        }
        data.patient_symptoms
            .retain(|_, report| report.symptom_id != symptom_id);
        data.instance_symptoms
            .retain(|_, link| link.symptom_id != symptom_id);
        Ok(true)
    }

    async fn list_diseases(&self) -> RepositoryResult<Vec<Disease>> {
        self.check_health()?;
        Ok(self.data.read().diseases.values().cloned().collect())
    }

    async fn create_disease(&self, disease: &NewDisease) -> RepositoryResult<Disease> {
        self.check_health()?;
        let mut data = self.data.write();
        data.check_disease_unique(&disease.disease_code, None, "create_disease")?;
        let id = next_id(&mut data.next_disease_id);
        let ts = now();
        let stored = Disease {
            disease_id: DiseaseId::new(id),
            disease_name: disease.disease_name.clone(),
            disease_code: disease.disease_code.clone(),
            disease_description: disease.disease_description.clone(),
            disease_treatment: disease.disease_treatment.clone(),
            created_at: ts,
            updated_at: ts,
        };
        data.diseases.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_disease(&self, disease_id: DiseaseId) -> RepositoryResult<Disease> {
        self.check_health()?;
        self.data
            .read()
            .diseases
            .get(&disease_id.value())
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Disease {} not found", disease_id),
                    ErrorContext::new("get_disease")
                        .with_entity("disease")
                        .with_entity_id(disease_id),
                )
            })
    }

    async fn update_disease(
        &self,
        disease_id: DiseaseId,
        disease: &NewDisease,
    ) -> RepositoryResult<Disease> {
        self.check_health()?;
        let mut data = self.data.write();
        let created_at = data
            .diseases
            .get(&disease_id.value())
            .map(|existing| existing.created_at)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Disease {} not found", disease_id),
                    ErrorContext::new("update_disease")
                        .with_entity("disease")
                        .with_entity_id(disease_id),
                )
            })?;
        data.check_disease_unique(
            &disease.disease_code,
            Some(disease_id.value()),
            "update_disease",
        )?;
        let stored = Disease {
            disease_id,
            disease_name: disease.disease_name.clone(),
            disease_code: disease.disease_code.clone(),
            disease_description: disease.disease_description.clone(),
            disease_treatment: disease.disease_treatment.clone(),
            created_at,
            updated_at: now(),
        };
        data.diseases.insert(disease_id.value(), stored.clone());
        Ok(stored)
    }

    async fn delete_disease(&self, disease_id: DiseaseId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        let referenced = data
            .disease_instances
            .values()
            .any(|instance| instance.disease_id == disease_id);
        if referenced {
            return Err(RepositoryError::conflict_with_context(
                format!("Disease {} is referenced by diagnosis instances", disease_id),
                ErrorContext::new("delete_disease")
                    .with_entity("disease")
                    .with_entity_id(disease_id),
            ));
        }
        Ok(data.diseases.remove(&disease_id.value()).is_some())
    }
}

#[async_trait]
impl RelationshipRepository for LocalRepository {
    async fn list_patient_symptoms(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<Vec<PatientSymptomEntry>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .patient_symptoms
            .values()
            .filter(|report| report.patient_id == patient_id)
            .filter_map(|report| {
                data.symptoms
                    .get(&report.symptom_id.value())
                    .map(|symptom| PatientSymptomEntry {
                        id: report.id,
                        patient_id: report.patient_id,
                        symptom_id: report.symptom_id,
                        symptom_name: symptom.symptom_name.clone(),
                        symptom_description: symptom.symptom_description.clone(),
                        reported_date: report.reported_date,
                        created_at: report.created_at,
                    })
            })
            .collect())
    }

    async fn create_patient_symptom(
        &self,
        report: &NewPatientSymptom,
    ) -> RepositoryResult<PatientSymptom> {
        self.check_health()?;
        let mut data = self.data.write();
        data.require_patient(report.patient_id, "create_patient_symptom")?;
        data.require_symptom(report.symptom_id, "create_patient_symptom")?;
        let id = next_id(&mut data.next_patient_symptom_id);
        let ts = now();
        let stored = PatientSymptom {
            id: PatientSymptomId::new(id),
            patient_id: report.patient_id,
            symptom_id: report.symptom_id,
            reported_date: report.reported_date,
            created_at: ts,
            updated_at: ts,
        };
        data.patient_symptoms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_patient_symptom(&self, id: PatientSymptomId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self
            .data
            .write()
            .patient_symptoms
            .remove(&id.value())
            .is_some())
    }

    async fn list_disease_instances(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<Vec<DiseaseInstanceEntry>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .disease_instances
            .values()
            .filter(|instance| instance.patient_id == patient_id)
            .filter_map(|instance| {
                data.diseases
                    .get(&instance.disease_id.value())
                    .map(|disease| DiseaseInstanceEntry {
                        patient_disease_id: instance.patient_disease_id,
                        patient_id: instance.patient_id,
                        disease_id: instance.disease_id,
                        disease_name: disease.disease_name.clone(),
                        disease_code: disease.disease_code.clone(),
                        diagnosis_date: instance.diagnosis_date,
                        notes: instance.notes.clone(),
                        created_at: instance.created_at,
                        updated_at: instance.updated_at,
                    })
            })
            .collect())
    }

    async fn create_disease_instance(
        &self,
        instance: &NewDiseaseInstance,
    ) -> RepositoryResult<DiseaseInstance> {
        self.check_health()?;
        let mut data = self.data.write();
        data.require_patient(instance.patient_id, "create_disease_instance")?;
        data.require_disease(instance.disease_id, "create_disease_instance")?;
        let id = next_id(&mut data.next_instance_id);
        let ts = now();
        let stored = DiseaseInstance {
            patient_disease_id: DiseaseInstanceId::new(id),
            patient_id: instance.patient_id,
            disease_id: instance.disease_id,
            diagnosis_date: instance.diagnosis_date,
            notes: instance.notes.clone(),
            created_at: ts,
            updated_at: ts,
        };
        data.disease_instances.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_disease_instance(&self, id: DiseaseInstanceId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.write().remove_instance_cascade(id.value()))
    }

    async fn list_instance_symptoms(
        &self,
        instance_id: DiseaseInstanceId,
    ) -> RepositoryResult<Vec<LinkedSymptom>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .instance_symptoms
            .values()
            .filter(|link| link.patient_disease_id == instance_id)
            .filter_map(|link| {
                data.symptoms
                    .get(&link.symptom_id.value())
                    .map(|symptom| LinkedSymptom {
                        id: link.id,
                        patient_disease_id: link.patient_disease_id,
                        symptom_id: link.symptom_id,
                        symptom_name: symptom.symptom_name.clone(),
                        symptom_description: symptom.symptom_description.clone(),
                        created_at: link.created_at,
                    })
            })
            .collect())
    }

    async fn link_instance_symptom(
        &self,
        link: &NewDiseaseInstanceSymptom,
    ) -> RepositoryResult<DiseaseInstanceSymptom> {
        self.check_health()?;
        let mut data = self.data.write();
        data.require_instance(link.patient_disease_id, "link_instance_symptom")?;
        data.require_symptom(link.symptom_id, "link_instance_symptom")?;
        let duplicate = data.instance_symptoms.values().any(|existing| {
            existing.patient_disease_id == link.patient_disease_id
                && existing.symptom_id == link.symptom_id
        });
        if duplicate {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "symptom {} already linked to disease instance {}",
                    link.symptom_id, link.patient_disease_id
                ),
                ErrorContext::new("link_instance_symptom").with_entity("disease_instance_symptom"),
            ));
        }
        let id = next_id(&mut data.next_link_id);
        let ts = now();
        let stored = DiseaseInstanceSymptom {
            id: DiseaseInstanceSymptomId::new(id),
            patient_disease_id: link.patient_disease_id,
            symptom_id: link.symptom_id,
            created_at: ts,
            updated_at: ts,
        };
        data.instance_symptoms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn unlink_instance_symptom(
        &self,
        instance_id: DiseaseInstanceId,
        symptom_id: SymptomId,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        let before = data.instance_symptoms.len();
        data.instance_symptoms.retain(|_, link| {
            !(link.patient_disease_id == instance_id && link.symptom_id == symptom_id)
        });
        Ok(data.instance_symptoms.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(register: &str, email: &str) -> NewPatient {
        NewPatient {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            register: register.into(),
            age: 36,
            gender: "F".into(),
            birthdate: None,
            address: None,
            phonenumber: "555-0100".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one() {
        let repo = LocalRepository::new();
        let p = repo.create_patient(&patient("R1", "a@x.io")).await.unwrap();
        assert_eq!(p.patient_id.value(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_register_conflicts() {
        let repo = LocalRepository::new();
        repo.create_patient(&patient("R1", "a@x.io")).await.unwrap();
        let err = repo
            .create_patient(&patient("R1", "b@x.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_queries() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_symptoms().await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_clear_resets_sequences() {
        let repo = LocalRepository::new();
        repo.create_patient(&patient("R1", "a@x.io")).await.unwrap();
        repo.clear();
        assert_eq!(repo.patient_count(), 0);
        let p = repo.create_patient(&patient("R2", "b@x.io")).await.unwrap();
        assert_eq!(p.patient_id.value(), 1);
    }

    #[test]
    fn test_join_names_empty_is_none() {
        assert_eq!(join_names(Vec::<String>::new()), None);
        assert_eq!(
            join_names(vec!["Fever".to_string(), "Cough".to_string()]),
            Some("Fever, Cough".to_string())
        );
    }
}
