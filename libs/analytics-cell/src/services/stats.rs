// libs/analytics-cell/src/services/stats.rs
use std::sync::Arc;

use tracing::debug;

use shared_config::AppConfig;
use shared_gateway::{AppointmentQuery, BackendClient};
use shared_models::{ApiError, AppointmentStatus, Doctor, HourlyCount};

use crate::models::{DashboardStats, DayBoard, NamedCount, PatientDemographics};

/// Read-only aggregation feeding the operational dashboards. Everything here
/// is computed client-side from the plain resource lists; only the hourly
/// trend comes pre-aggregated from the backend.
pub struct StatsService {
    gateway: Arc<BackendClient>,
}

impl StatsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: Arc::new(BackendClient::new(config)),
        }
    }

    pub fn with_client(gateway: Arc<BackendClient>) -> Self {
        Self { gateway }
    }

    /// Admin monitoring view for one date.
    pub async fn day_board(
        &self,
        date: &str,
        auth_token: Option<&str>,
    ) -> Result<DayBoard, ApiError> {
        let query = AppointmentQuery::admin_day(date);
        let appointments = self.gateway.list_appointments(&query, auth_token).await?;

        let pending = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Pending)
            .count();
        let completed = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Completed)
            .count();
        let department_load =
            count_by(appointments.iter().map(|a| a.department_name.clone()));

        debug!(
            "Day board for {}: {} total, {} pending, {} completed",
            date,
            appointments.len(),
            pending,
            completed
        );

        Ok(DayBoard {
            date: date.to_string(),
            total: appointments.len(),
            pending,
            completed,
            department_load,
            appointments,
        })
    }

    pub async fn dashboard_stats(
        &self,
        auth_token: Option<&str>,
    ) -> Result<DashboardStats, ApiError> {
        let (patients, records, doctors, departments, medicines) = futures::try_join!(
            self.gateway.list_patients(None, None, auth_token),
            self.gateway.list_records(None, auth_token),
            self.gateway.list_doctors(auth_token),
            self.gateway.list_departments(auth_token),
            self.gateway.list_medicines(auth_token),
        )?;

        let diagnosis_distribution = top_n(
            count_by(records.iter().map(|r| r.diagnosis.clone())),
            5,
        );

        let visits_by_department = count_by(records.iter().filter_map(|record| {
            department_of(&doctors, &record.doctor_id).and_then(|dept_id| {
                departments
                    .iter()
                    .find(|d| d.id == dept_id)
                    .map(|d| d.name.clone())
            })
        }));

        let low_stock_medicines = medicines
            .iter()
            .filter(|m| m.stock < 100)
            .cloned()
            .collect();

        let mut recent_records = records.clone();
        recent_records.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        recent_records.truncate(5);

        let vip_patients = patients
            .iter()
            .filter(|p| p.is_vip == Some(true))
            .cloned()
            .collect();

        Ok(DashboardStats {
            total_patients: patients.len(),
            total_visits: records.len(),
            total_doctors: doctors.len(),
            total_medicines: medicines.len(),
            visits_by_department,
            diagnosis_distribution,
            low_stock_medicines,
            recent_records,
            vip_patients,
        })
    }

    pub async fn patient_demographics(
        &self,
        auth_token: Option<&str>,
    ) -> Result<PatientDemographics, ApiError> {
        let (patients, records, doctors, departments) = futures::try_join!(
            self.gateway.list_patients(None, None, auth_token),
            self.gateway.list_records(None, auth_token),
            self.gateway.list_doctors(auth_token),
            self.gateway.list_departments(auth_token),
        )?;

        let gender_distribution =
            count_by(patients.iter().map(|p| p.gender.to_string()));

        let mut age_buckets = [
            ("0-18", 0u64),
            ("19-35", 0u64),
            ("36-60", 0u64),
            ("60+", 0u64),
        ];
        for patient in &patients {
            let idx = match patient.age {
                0..=18 => 0,
                19..=35 => 1,
                36..=60 => 2,
                _ => 3,
            };
            age_buckets[idx].1 += 1;
        }
        let age_distribution = age_buckets
            .iter()
            .map(|(name, value)| NamedCount {
                name: name.to_string(),
                value: *value,
            })
            .collect();

        let diagnosis_distribution = top_n(
            count_by(records.iter().map(|r| r.diagnosis.clone())),
            10,
        );

        let department_visits = top_n(
            count_by(records.iter().filter_map(|record| {
                department_of(&doctors, &record.doctor_id).and_then(|dept_id| {
                    departments
                        .iter()
                        .find(|d| d.id == dept_id)
                        .map(|d| d.name.clone())
                })
            })),
            10,
        );

        Ok(PatientDemographics {
            total_patients: patients.len(),
            total_visits: records.len(),
            gender_distribution,
            age_distribution,
            diagnosis_distribution,
            department_visits,
        })
    }

    /// Backend-aggregated booking counts per hour of day.
    pub async fn hourly_trend(
        &self,
        date: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<HourlyCount>, ApiError> {
        self.gateway.appointment_statistics(date, auth_token).await
    }
}

fn department_of<'a>(doctors: &'a [Doctor], doctor_id: &str) -> Option<&'a str> {
    doctors
        .iter()
        .find(|d| d.id == doctor_id)
        .map(|d| d.department_id.as_str())
}

/// Count occurrences, preserving first-seen order of the labels.
fn count_by(labels: impl Iterator<Item = String>) -> Vec<NamedCount> {
    let mut counts: Vec<NamedCount> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|c| c.name == label) {
            Some(entry) => entry.value += 1,
            None => counts.push(NamedCount {
                name: label,
                value: 1,
            }),
        }
    }
    counts
}

/// Largest buckets first, capped at `n`.
fn top_n(mut counts: Vec<NamedCount>, n: usize) -> Vec<NamedCount> {
    counts.sort_by(|a, b| b.value.cmp(&a.value));
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_preserves_first_seen_order() {
        let counts = count_by(
            ["flu", "cold", "flu", "fracture", "flu"]
                .into_iter()
                .map(str::to_string),
        );
        let names: Vec<_> = counts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["flu", "cold", "fracture"]);
        assert_eq!(counts[0].value, 3);
    }

    #[test]
    fn test_top_n_sorts_descending_and_caps() {
        let counts = vec![
            NamedCount { name: "a".into(), value: 1 },
            NamedCount { name: "b".into(), value: 5 },
            NamedCount { name: "c".into(), value: 3 },
        ];
        let top = top_n(counts, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "b");
        assert_eq!(top[1].name, "c");
    }
}
