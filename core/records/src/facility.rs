//! Facility reference records.
//!
//! Facilities are master data owned by the server: they are only ever pulled,
//! never created or edited on the device, so a facility record is `Pending`
//! in practice never and its push path is a natural no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use careledger_common::SyncStatus;
use careledger_storage::{SyncPayload, SyncableRecord};

/// A clinic or hospital where patients are seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub uuid: Uuid,
    pub name: String,
    pub district: String,
    pub state: String,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Wire representation of a facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityPayload {
    pub uuid: Uuid,
    pub name: String,
    pub district: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncableRecord for Facility {
    type Payload = FacilityPayload;
    const ENTITY: &'static str = "facilities";

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
    fn to_payload(&self) -> FacilityPayload {
        FacilityPayload {
            uuid: self.uuid,
            name: self.name.clone(),
            district: self.district.clone(),
            state: self.state.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl SyncPayload for FacilityPayload {
    type Record = Facility;

    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn into_record(self, status: SyncStatus) -> Facility {
        Facility {
            uuid: self.uuid,
            name: self.name,
            district: self.district,
            state: self.state,
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
    fn test_payload_json_shape() {
        let payload = FacilityPayload {
            uuid: Uuid::new_v4(),
            name: "CHC Bagta".to_string(),
            district: "Bathinda".to_string(),
            state: "Punjab".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["name"], "CHC Bagta");
        assert!(json.get("sync_status").is_none());
    }
}
