//! Medical history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use careledger_common::SyncStatus;
use careledger_storage::{SyncPayload, SyncableRecord};

/// Answer to a medical history question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Unknown,
}

/// Condition history captured for a patient at intake.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicalHistory {
    pub uuid: Uuid,
    pub patient_uuid: Uuid,
    pub diagnosed_with_hypertension: Answer,
    pub has_diabetes: Answer,
    pub has_had_heart_attack: Answer,
    pub has_had_stroke: Answer,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MedicalHistory {
    /// Start an empty history for a patient, all answers `Unknown`.
    pub fn unanswered(patient_uuid: Uuid) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            patient_uuid,
            diagnosed_with_hypertension: Answer::Unknown,
            has_diabetes: Answer::Unknown,
            has_had_heart_attack: Answer::Unknown,
            has_had_stroke: Answer::Unknown,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Replace the recorded answers.
    pub fn amend(
        &mut self,
        hypertension: Answer,
        diabetes: Answer,
        heart_attack: Answer,
        stroke: Answer,
    ) {
        self.diagnosed_with_hypertension = hypertension;
        self.has_diabetes = diabetes;
        self.has_had_heart_attack = heart_attack;
        self.has_had_stroke = stroke;
        self.updated_at = Utc::now();
        self.sync_status = SyncStatus::Pending;
    }
}

/// Wire representation of a medical history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistoryPayload {
    pub uuid: Uuid,
    pub patient_uuid: Uuid,
    pub diagnosed_with_hypertension: Answer,
    pub has_diabetes: Answer,
    pub has_had_heart_attack: Answer,
    pub has_had_stroke: Answer,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncableRecord for MedicalHistory {
    type Payload = MedicalHistoryPayload;
    const ENTITY: &'static str = "medical_histories";

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
    fn to_payload(&self) -> MedicalHistoryPayload {
        MedicalHistoryPayload {
            uuid: self.uuid,
            patient_uuid: self.patient_uuid,
            diagnosed_with_hypertension: self.diagnosed_with_hypertension,
            has_diabetes: self.has_diabetes,
            has_had_heart_attack: self.has_had_heart_attack,
            has_had_stroke: self.has_had_stroke,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl SyncPayload for MedicalHistoryPayload {
    type Record = MedicalHistory;

    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn into_record(self, status: SyncStatus) -> MedicalHistory {
        MedicalHistory {
            uuid: self.uuid,
            patient_uuid: self.patient_uuid,
            diagnosed_with_hypertension: self.diagnosed_with_hypertension,
            has_diabetes: self.has_diabetes,
            has_had_heart_attack: self.has_had_heart_attack,
            has_had_stroke: self.has_had_stroke,
            sync_status: status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}
