use serde::{Deserialize, Serialize};

use shared_models::{Department, Doctor, Gender};

/// The booking form. `doctor_id = None` is the "random assignment" choice:
/// the backend hands the appointment to the least loaded doctor on duty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeForm {
    pub patient_name: String,
    pub patient_phone: String,
    pub gender: Gender,
    pub age: u32,
    pub department_id: String,
    pub doctor_id: Option<String>,
    pub description: String,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self {
            patient_name: String::new(),
            patient_phone: String::new(),
            gender: Gender::Male,
            age: 0,
            department_id: String::new(),
            doctor_id: None,
            description: String::new(),
        }
    }
}

/// Loaded once per intake view: the selectable resources plus the form,
/// prefilled and identity-locked when a patient is booking for themselves.
#[derive(Debug, Clone)]
pub struct IntakeContext {
    pub departments: Vec<Department>,
    pub doctors: Vec<Doctor>,
    pub form: IntakeForm,
    /// True for the patient role: name/phone/age/gender come from the
    /// patient's own record and are read-only in the form.
    pub identity_locked: bool,
}

impl IntakeContext {
    /// Doctors selectable for the currently chosen department.
    pub fn available_doctors(&self) -> Vec<&Doctor> {
        self.doctors
            .iter()
            .filter(|d| d.department_id == self.form.department_id)
            .collect()
    }
}

/// Outcome of a successful booking.
#[derive(Debug, Clone)]
pub struct IntakeReceipt {
    pub appointment_id: String,
    /// Short queue ticket shown to the patient (tail of the id).
    pub ticket: String,
    pub message: Option<String>,
}
