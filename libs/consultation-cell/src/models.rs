// libs/consultation-cell/src/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use shared_models::{Appointment, AppointmentStatus, MedicalRecord, Patient, PrescriptionDetail};

use crate::error::ConsultationError;

// ==============================================================================
// QUEUES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueTab {
    Mine,
    Department,
}

impl fmt::Display for QueueTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueTab::Mine => write!(f, "mine"),
            QueueTab::Department => write!(f, "department"),
        }
    }
}

/// The two waiting lists a doctor works from, built from one backend fetch.
/// Order is strictly the fetch order; the core never re-sorts it (queue
/// fairness is the backend's contract).
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    pub mine: Vec<Appointment>,
    pub department: Vec<Appointment>,
}

impl QueueSnapshot {
    /// Keep pending appointments only, split on whether the row is assigned
    /// to this doctor. Relative order within each list is preserved.
    pub fn partition(appointments: Vec<Appointment>, doctor_id: &str) -> Self {
        let mut snapshot = Self::default();
        for appointment in appointments {
            if appointment.status != AppointmentStatus::Pending {
                continue;
            }
            if appointment.doctor_id.as_deref() == Some(doctor_id) {
                snapshot.mine.push(appointment);
            } else {
                snapshot.department.push(appointment);
            }
        }
        snapshot
    }

    pub fn tab(&self, tab: QueueTab) -> &[Appointment] {
        match tab {
            QueueTab::Mine => &self.mine,
            QueueTab::Department => &self.department,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mine.is_empty() && self.department.is_empty()
    }
}

// ==============================================================================
// PRESCRIPTION BUFFER & DRAFT
// ==============================================================================

/// One line of the in-progress prescription, before ids exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionLine {
    pub medicine_id: String,
    pub dosage: String,
    pub usage: String,
    pub days: u32,
}

impl Default for PrescriptionLine {
    fn default() -> Self {
        Self {
            medicine_id: String::new(),
            dosage: String::new(),
            usage: String::new(),
            days: 3,
        }
    }
}

/// The unsaved consultation form: diagnosis, treatment plan and the
/// prescription buffer, plus the bookkeeping a retried commit needs.
#[derive(Debug, Clone, Default)]
pub struct ConsultationDraft {
    pub diagnosis: String,
    pub treatment_plan: String,
    lines: Vec<PrescriptionLine>,
    /// Stable id stamp for this consultation's record and detail ids, minted
    /// on the first commit attempt so a retry never duplicates an
    /// acknowledged insert.
    pub(crate) commit_stamp: Option<i64>,
    pub(crate) record_acked: bool,
    pub(crate) status_acked: bool,
}

impl ConsultationDraft {
    /// A line needs at least a medicine and a dosage; anything less is
    /// rejected and the buffer stays untouched.
    pub fn add_line(&mut self, line: PrescriptionLine) -> Result<(), ConsultationError> {
        if line.medicine_id.trim().is_empty() || line.dosage.trim().is_empty() {
            return Err(ConsultationError::Validation(
                "a prescription line needs a medicine and a dosage".to_string(),
            ));
        }
        self.lines.push(line);
        Ok(())
    }

    /// Remove the line at `index`, shifting the tail left by one.
    pub fn remove_line(&mut self, index: usize) -> Result<PrescriptionLine, ConsultationError> {
        if index >= self.lines.len() {
            return Err(ConsultationError::Validation(format!(
                "no prescription line at index {index}"
            )));
        }
        Ok(self.lines.remove(index))
    }

    pub fn lines(&self) -> &[PrescriptionLine] {
        &self.lines
    }

    pub fn is_complete(&self) -> bool {
        !self.diagnosis.trim().is_empty() && !self.treatment_plan.trim().is_empty()
    }
}

// ==============================================================================
// ACTIVE CONSULTATION
// ==============================================================================

/// A prior visit with its prescription lines, enriched with medicine data.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub record: MedicalRecord,
    pub lines: Vec<HistoryLine>,
}

#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub detail: PrescriptionDetail,
    pub medicine_name: Option<String>,
    pub medicine_price: Option<f64>,
    pub medicine_spec: Option<String>,
}

/// The single (appointment, patient) pair bound to the doctor session while
/// a consultation is open. Lives outside the refreshed queues, so a poll can
/// never evict it.
#[derive(Debug, Clone)]
pub struct ActiveConsultation {
    pub appointment: Appointment,
    pub patient: Patient,
    pub history: Vec<HistoryRecord>,
    pub draft: ConsultationDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationPhase {
    Idle,
    CallingNext,
    InConsultation,
    Committing,
}

/// What a successful commit produced.
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    pub record_id: String,
    pub appointment_id: String,
    pub prescription_count: usize,
}
