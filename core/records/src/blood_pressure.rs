//! Blood pressure readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use careledger_common::SyncStatus;
use careledger_storage::{SyncPayload, SyncableRecord};

/// A single blood pressure reading for a patient.
#[derive(Debug, Clone, PartialEq)]
pub struct BloodPressure {
    pub uuid: Uuid,
    pub patient_uuid: Uuid,
    pub systolic: u16,
    pub diastolic: u16,
    pub recorded_at: DateTime<Utc>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BloodPressure {
    /// Record a new reading. Starts `Pending`.
    pub fn record(patient_uuid: Uuid, systolic: u16, diastolic: u16) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            patient_uuid,
            systolic,
            diastolic,
            recorded_at: now,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Correct a mis-entered reading.
    pub fn amend(&mut self, systolic: u16, diastolic: u16) {
        self.systolic = systolic;
        self.diastolic = diastolic;
        self.touch();
    }

    /// Soft-delete the reading; the deletion itself still syncs.
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.sync_status = SyncStatus::Pending;
    }
}

/// Wire representation of a blood pressure reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodPressurePayload {
    pub uuid: Uuid,
    pub patient_uuid: Uuid,
    pub systolic: u16,
    pub diastolic: u16,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncableRecord for BloodPressure {
    type Payload = BloodPressurePayload;
    const ENTITY: &'static str = "blood_pressures";

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
    fn to_payload(&self) -> BloodPressurePayload {
        BloodPressurePayload {
            uuid: self.uuid,
            patient_uuid: self.patient_uuid,
            systolic: self.systolic,
            diastolic: self.diastolic,
            recorded_at: self.recorded_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl SyncPayload for BloodPressurePayload {
    type Record = BloodPressure;

    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn into_record(self, status: SyncStatus) -> BloodPressure {
        BloodPressure {
            uuid: self.uuid,
            patient_uuid: self.patient_uuid,
            systolic: self.systolic,
            diastolic: self.diastolic,
            recorded_at: self.recorded_at,
            sync_status: status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_reading_stays_syncable() {
        let mut reading = BloodPressure::record(Uuid::new_v4(), 142, 95);
        reading.sync_status = SyncStatus::Done;

        reading.mark_deleted();

        assert!(reading.deleted_at.is_some());
        assert_eq!(reading.sync_status, SyncStatus::Pending);
    }

    #[test]
    fn test_amend_requeues_reading() {
        let mut reading = BloodPressure::record(Uuid::new_v4(), 142, 95);
        reading.sync_status = SyncStatus::Done;

        reading.amend(124, 85);

        assert_eq!((reading.systolic, reading.diastolic), (124, 85));
        assert_eq!(reading.sync_status, SyncStatus::Pending);
    }
}
