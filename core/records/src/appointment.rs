//! Appointment records.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use careledger_common::{Result, SyncStatus};
use careledger_storage::{MemoryRepository, SyncPayload, SyncableRecord, SynceableRepository};

/// Visit state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, patient not yet seen.
    Scheduled,
    /// Patient was seen (or the appointment was superseded by a newer one).
    Visited,
    /// Cancelled before the visit.
    Cancelled,
}

/// A follow-up appointment for a patient at a facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub uuid: Uuid,
    pub patient_uuid: Uuid,
    pub facility_uuid: Uuid,
    pub scheduled_date: NaiveDate,
    pub status: AppointmentStatus,
    pub cancel_reason: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Book a new appointment. The record starts `Scheduled` and `Pending`.
    pub fn book(patient_uuid: Uuid, facility_uuid: Uuid, scheduled_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            patient_uuid,
            facility_uuid,
            scheduled_date,
            status: AppointmentStatus::Scheduled,
            cancel_reason: None,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Cancel this appointment with a reason.
    pub fn cancel(&mut self, reason: impl Into<String>) {
        self.status = AppointmentStatus::Cancelled;
        self.cancel_reason = Some(reason.into());
        self.touch();
    }

    /// Mark the visit as completed.
    pub fn mark_visited(&mut self) {
        self.status = AppointmentStatus::Visited;
        self.touch();
    }

    /// Soft-delete the appointment.
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.sync_status = SyncStatus::Pending;
    }
}

/// Wire representation of an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentPayload {
    pub uuid: Uuid,
    pub patient_uuid: Uuid,
    pub facility_uuid: Uuid,
    pub scheduled_date: NaiveDate,
    pub status: AppointmentStatus,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncableRecord for Appointment {
    type Payload = AppointmentPayload;
    const ENTITY: &'static str = "appointments";

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
    fn to_payload(&self) -> AppointmentPayload {
        AppointmentPayload {
            uuid: self.uuid,
            patient_uuid: self.patient_uuid,
            facility_uuid: self.facility_uuid,
            scheduled_date: self.scheduled_date,
            status: self.status,
            cancel_reason: self.cancel_reason.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl SyncPayload for AppointmentPayload {
    type Record = Appointment;

    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn into_record(self, status: SyncStatus) -> Appointment {
        Appointment {
            uuid: self.uuid,
            patient_uuid: self.patient_uuid,
            facility_uuid: self.facility_uuid,
            scheduled_date: self.scheduled_date,
            status: self.status,
            cancel_reason: self.cancel_reason,
            sync_status: status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// Scheduling write paths on the appointment repository.
#[async_trait]
pub trait AppointmentRepositoryExt {
    /// Book `appointment` and supersede any older `Scheduled` appointment
    /// for the same patient: superseded appointments move to `Visited` and
    /// back to `Pending`, so the transition is picked up by the next push.
    /// Appointments of other patients are untouched.
    async fn schedule(&self, appointment: Appointment) -> Result<()>;
}

#[async_trait]
impl AppointmentRepositoryExt for MemoryRepository<Appointment> {
    async fn schedule(&self, appointment: Appointment) -> Result<()> {
        let patient_uuid = appointment.patient_uuid;
        let new_uuid = appointment.uuid;
        self.update_matching(
            |existing| {
                existing.patient_uuid == patient_uuid
                    && existing.uuid != new_uuid
                    && existing.status == AppointmentStatus::Scheduled
                    && existing.deleted_at.is_none()
            },
            |existing| existing.mark_visited(),
        );
        self.save(vec![appointment]).await
    }
}
