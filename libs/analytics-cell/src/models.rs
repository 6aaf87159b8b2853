use serde::{Deserialize, Serialize};

use shared_models::{Appointment, MedicalRecord, Medicine, Patient};

/// One labelled bucket of a distribution, in chart-feed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: u64,
}

/// Admin day view: every appointment for one date plus the headline counts.
#[derive(Debug, Clone)]
pub struct DayBoard {
    pub date: String,
    pub appointments: Vec<Appointment>,
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub department_load: Vec<NamedCount>,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub total_visits: usize,
    pub total_doctors: usize,
    pub total_medicines: usize,
    pub visits_by_department: Vec<NamedCount>,
    pub diagnosis_distribution: Vec<NamedCount>,
    pub low_stock_medicines: Vec<Medicine>,
    pub recent_records: Vec<MedicalRecord>,
    pub vip_patients: Vec<Patient>,
}

#[derive(Debug, Clone)]
pub struct PatientDemographics {
    pub total_patients: usize,
    pub total_visits: usize,
    pub gender_distribution: Vec<NamedCount>,
    pub age_distribution: Vec<NamedCount>,
    pub diagnosis_distribution: Vec<NamedCount>,
    pub department_visits: Vec<NamedCount>,
}
