//! CareLedger application assembly.
//!
//! Explicit composition root: each entity's repository, API client and sync
//! adapter are wired here, once, at process start, and the resulting
//! immutable registry is handed to [`DataSync`]. Nothing else in the
//! application constructs sync machinery.

pub mod http;
pub mod telemetry;

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use careledger_common::Result;
use careledger_records::{
    Appointment, AppointmentPayload, BloodPressure, BloodPressurePayload, Facility,
    FacilityPayload, MedicalHistory, MedicalHistoryPayload, Patient, PatientPayload,
};
use careledger_storage::{
    FileTokenStore, MemoryRepository, PullTokenStore, SyncableRecord,
};
use careledger_sync::{
    DataSync, EntitySync, ErrorReporter, ModelSync, StaticConfigSource, SyncConfig,
    SyncConfigSource, SyncGate,
};

use crate::http::ApiConnection;

/// The assembled sync stack: one repository handle per entity plus the
/// orchestrator over all of them.
pub struct CareLedger {
    pub patients: Arc<MemoryRepository<Patient>>,
    pub appointments: Arc<MemoryRepository<Appointment>>,
    pub blood_pressures: Arc<MemoryRepository<BloodPressure>>,
    pub medical_histories: Arc<MemoryRepository<MedicalHistory>>,
    pub facilities: Arc<MemoryRepository<Facility>>,
    pub data_sync: Arc<DataSync>,
}

impl CareLedger {
    /// Wire up the full sync stack against an HTTP sync server.
    ///
    /// `data_dir` holds the pull-token file, so pagination progress
    /// survives restarts. The gate and reporter are the app's session and
    /// crash-reporting collaborators.
    pub async fn assemble(
        base_url: &str,
        access_token: &str,
        data_dir: &Path,
        gate: Arc<dyn SyncGate>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        let connection = ApiConnection::new(base_url, access_token);
        let tokens: Arc<dyn PullTokenStore> =
            Arc::new(FileTokenStore::open(data_dir.join("pull_tokens.json")).await?);

        // Clinical data syncs frequently; facility reference data daily.
        let config: Arc<dyn SyncConfigSource> = Arc::new(
            StaticConfigSource::new(SyncConfig::frequent())
                .with_override(Facility::ENTITY, SyncConfig::daily()),
        );

        let patients = Arc::new(MemoryRepository::<Patient>::new());
        let appointments = Arc::new(MemoryRepository::<Appointment>::new());
        let blood_pressures = Arc::new(MemoryRepository::<BloodPressure>::new());
        let medical_histories = Arc::new(MemoryRepository::<MedicalHistory>::new());
        let facilities = Arc::new(MemoryRepository::<Facility>::new());

        let registry: Vec<Arc<dyn ModelSync>> = vec![
            Arc::new(EntitySync::new(
                patients.clone(),
                Arc::new(connection.entity_api::<PatientPayload>(Patient::ENTITY)),
                tokens.clone(),
                config.clone(),
                gate.clone(),
            )),
            Arc::new(EntitySync::new(
                appointments.clone(),
                Arc::new(connection.entity_api::<AppointmentPayload>(Appointment::ENTITY)),
                tokens.clone(),
                config.clone(),
                gate.clone(),
            )),
            Arc::new(EntitySync::new(
                blood_pressures.clone(),
                Arc::new(connection.entity_api::<BloodPressurePayload>(BloodPressure::ENTITY)),
                tokens.clone(),
                config.clone(),
                gate.clone(),
            )),
            Arc::new(EntitySync::new(
                medical_histories.clone(),
                Arc::new(connection.entity_api::<MedicalHistoryPayload>(MedicalHistory::ENTITY)),
                tokens.clone(),
                config.clone(),
                gate.clone(),
            )),
            Arc::new(EntitySync::new(
                facilities.clone(),
                Arc::new(connection.entity_api::<FacilityPayload>(Facility::ENTITY)),
                tokens.clone(),
                config.clone(),
                gate.clone(),
            )),
        ];

        info!(entities = registry.len(), "Sync registry assembled");
        let data_sync = Arc::new(DataSync::new(registry, reporter));

        Ok(Self {
            patients,
            appointments,
            blood_pressures,
            medical_histories,
            facilities,
            data_sync,
        })
    }
}
