//! CareLedger clinical record types.
//!
//! Each entity defines a rich local record (carrying sync bookkeeping and
//! timestamps) and a flat wire payload, with pure conversions between them.
//! Feature write paths always leave records `Pending`; the sync engine is
//! the only code that moves them to `Done`.

pub mod appointment;
pub mod blood_pressure;
pub mod facility;
pub mod medical_history;
pub mod patient;

pub use appointment::{
    Appointment, AppointmentPayload, AppointmentRepositoryExt, AppointmentStatus,
};
pub use blood_pressure::{BloodPressure, BloodPressurePayload};
pub use facility::{Facility, FacilityPayload};
pub use medical_history::{Answer, MedicalHistory, MedicalHistoryPayload};
pub use patient::{Gender, Patient, PatientPayload, PatientRepositoryExt};
