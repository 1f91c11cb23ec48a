//! Patient records.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use careledger_common::{Result, SyncStatus};
use careledger_storage::{MemoryRepository, SyncPayload, SyncableRecord};

/// Patient gender as recorded at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Transgender,
}

/// A registered patient.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub uuid: Uuid,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    /// Unique business identifier printed on the patient's care card.
    /// Optional; a *blank* (empty) identifier is a data violation that
    /// marks the record `Invalid` until corrected.
    pub identifier: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// Register a new patient. The record starts `Pending`.
    pub fn register(
        full_name: impl Into<String>,
        gender: Gender,
        date_of_birth: Option<NaiveDate>,
        identifier: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            full_name: full_name.into(),
            gender,
            date_of_birth,
            identifier,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Rename the patient.
    pub fn rename(&mut self, full_name: impl Into<String>) {
        self.full_name = full_name.into();
        self.touch();
    }

    /// Soft-delete the patient. The record stays in storage and syncs its
    /// deletion timestamp like any other edit.
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.touch();
    }

    /// Whether the business identifier is present but blank.
    pub fn has_blank_identifier(&self) -> bool {
        matches!(&self.identifier, Some(id) if id.trim().is_empty())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.sync_status = SyncStatus::Pending;
    }
}

/// Wire representation of a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientPayload {
    pub uuid: Uuid,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub identifier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncableRecord for Patient {
    type Payload = PatientPayload;
    const ENTITY: &'static str = "patients";

    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }
    fn set_sync_status(&mut self, status: SyncStatus) {
        self.sync_status = status;
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn to_payload(&self) -> PatientPayload {
        PatientPayload {
            uuid: self.uuid,
            full_name: self.full_name.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            identifier: self.identifier.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl SyncPayload for PatientPayload {
    type Record = Patient;

    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn into_record(self, status: SyncStatus) -> Patient {
        Patient {
            uuid: self.uuid,
            full_name: self.full_name,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            identifier: self.identifier,
            sync_status: status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// Corrective write paths on the patient repository.
#[async_trait]
pub trait PatientRepositoryExt {
    /// Correction pass for patients flagged `Invalid` over a blank business
    /// identifier: the blank identifier is deleted and the record re-queued
    /// as `Pending` so the fix is picked up by the next push. Patients that
    /// are not `Invalid`, or whose identifier is absent or non-blank, are
    /// left unchanged.
    ///
    /// Returns the number of corrected records.
    async fn scrub_blank_identifiers(&self) -> Result<usize>;
}

#[async_trait]
impl PatientRepositoryExt for MemoryRepository<Patient> {
    async fn scrub_blank_identifiers(&self) -> Result<usize> {
        let corrected = self.update_matching(
            |patient| {
                patient.sync_status == SyncStatus::Invalid && patient.has_blank_identifier()
            },
            |patient| {
                patient.identifier = None;
                patient.touch();
            },
        );
        Ok(corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careledger_storage::SynceableRepository;

    #[test]
    fn test_new_patient_is_pending() {
        let patient = Patient::register("Anish Acharya", Gender::Male, None, None);
        assert_eq!(patient.sync_status, SyncStatus::Pending);
        assert!(patient.deleted_at.is_none());
    }

    #[test]
    fn test_local_edit_resets_done_to_pending() {
        let mut patient = Patient::register("Anish Acharya", Gender::Male, None, None);
        patient.sync_status = SyncStatus::Done;

        let before = patient.updated_at;
        patient.rename("Anish B. Acharya");

        assert_eq!(patient.sync_status, SyncStatus::Pending);
        assert!(patient.updated_at >= before);
    }

    #[tokio::test]
    async fn test_scrub_corrects_invalid_blank_identifier() {
        let repo = MemoryRepository::<Patient>::new();

        let mut invalid = Patient::register(
            "Shreya Nair",
            Gender::Female,
            None,
            Some("   ".to_string()),
        );
        invalid.sync_status = SyncStatus::Invalid;

        let mut healthy = Patient::register(
            "Riya Bhatt",
            Gender::Female,
            None,
            Some("BP-1234".to_string()),
        );
        healthy.sync_status = SyncStatus::Done;

        repo.save(vec![invalid.clone(), healthy.clone()])
            .await
            .unwrap();

        let corrected = repo.scrub_blank_identifiers().await.unwrap();
        assert_eq!(corrected, 1);

        let fixed = repo.get(&invalid.uuid).unwrap();
        assert_eq!(fixed.sync_status, SyncStatus::Pending);
        assert!(fixed.identifier.is_none());

        // The already-synced patient with a real identifier is untouched.
        assert_eq!(repo.get(&healthy.uuid).unwrap(), healthy);
    }

    #[test]
    fn test_payload_round_trip_preserves_fields() {
        let patient = Patient::register(
            "Dhruv Saxena",
            Gender::Male,
            NaiveDate::from_ymd_opt(1968, 7, 21),
            Some("BP-7781".to_string()),
        );
        let restored = patient.to_payload().into_record(SyncStatus::Done);

        assert_eq!(restored.uuid, patient.uuid);
        assert_eq!(restored.full_name, patient.full_name);
        assert_eq!(restored.identifier, patient.identifier);
        assert_eq!(restored.sync_status, SyncStatus::Done);
    }
}
