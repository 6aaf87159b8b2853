// libs/shared/models/src/entities.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CORE DOMAIN ENTITIES
// ==============================================================================
//
// Every struct here is a wire schema: the backend speaks camelCase JSON and
// responses are decoded strictly into these shapes (a body that does not fit
// is rejected at the gateway, never passed through untyped).

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub department_id: String,
    pub specialty: String,
    pub phone: String,
    pub title: String,
    /// Derived by the backend: size of the doctor's pending queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub specification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub age: u32,
    pub phone: String,
    pub address: String,
    pub create_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vip: Option<bool>,
    /// Only populated on the registration round-trip; list/lookup responses
    /// omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: String,
    /// Snapshot for display; the patient row stays authoritative.
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub visit_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetail {
    pub id: String,
    pub record_id: String,
    pub medicine_id: String,
    pub dosage: String,
    pub usage: String,
    pub days: u32,
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    /// Present when the booking came from a registered patient account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub gender: Gender,
    pub age: u32,
    pub department_id: String,
    pub department_name: String,
    /// None means the backend auto-assigns the least loaded doctor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    pub description: String,
    pub status: AppointmentStatus,
    pub create_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// pending -> {completed, cancelled} is the only legal transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE ENVELOPES
// ==============================================================================

/// Mutation acknowledgement: `{"success": bool, "message": "..."}`.
/// The message is human-readable and surfaced to the user verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for `POST /api/records`: the record plus its prescription lines,
/// committed by the backend in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSubmission {
    pub record: MedicalRecord,
    pub details: Vec<PrescriptionDetail>,
}

/// One bucket of the appointment statistics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: u32,
    pub count: u64,
}
