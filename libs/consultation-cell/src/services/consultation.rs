// libs/consultation-cell/src/services/consultation.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_gateway::{AppointmentQuery, BackendClient};
use shared_models::{
    Appointment, AppointmentStatus, MedicalRecord, Patient, PrescriptionDetail, UserRole,
    UserSession,
};
use shared_utils::time::{local_date, now_millis};

use crate::error::ConsultationError;
use crate::models::{
    ActiveConsultation, CommitReceipt, ConsultationDraft, ConsultationPhase, PrescriptionLine,
    QueueSnapshot, QueueTab,
};
use crate::services::history::HistoryService;

/// Everything a background poll needs, captured under the session lock so the
/// fetch itself can run outside it.
pub struct PollContext {
    pub version: u64,
    pub query: AppointmentQuery,
    pub token: Option<String>,
    pub gateway: Arc<BackendClient>,
}

/// Per-doctor consultation state machine.
///
/// Idle -> CallingNext -> InConsultation -> Committing -> Idle, with the
/// transient phases doubling as re-entrancy guards: calling or committing
/// while not in the right phase is a state error, not undefined behavior.
/// At most one (appointment, patient) pair is ever bound.
pub struct ConsultationSession {
    gateway: Arc<BackendClient>,
    history: HistoryService,
    doctor: UserSession,
    queues: QueueSnapshot,
    queue_version: u64,
    active_tab: QueueTab,
    phase: ConsultationPhase,
    active: Option<ActiveConsultation>,
}

impl ConsultationSession {
    pub fn new(
        gateway: Arc<BackendClient>,
        doctor: UserSession,
    ) -> Result<Self, ConsultationError> {
        if doctor.role != UserRole::Doctor {
            return Err(ConsultationError::Validation(format!(
                "consultation sessions require the doctor role, got {}",
                doctor.role
            )));
        }
        Ok(Self {
            history: HistoryService::new(Arc::clone(&gateway)),
            gateway,
            doctor,
            queues: QueueSnapshot::default(),
            queue_version: 0,
            active_tab: QueueTab::Mine,
            phase: ConsultationPhase::Idle,
            active: None,
        })
    }

    pub fn doctor(&self) -> &UserSession {
        &self.doctor
    }

    pub fn phase(&self) -> ConsultationPhase {
        self.phase
    }

    pub fn queues(&self) -> &QueueSnapshot {
        &self.queues
    }

    pub fn active_tab(&self) -> QueueTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: QueueTab) {
        self.active_tab = tab;
    }

    pub fn active_queue(&self) -> &[Appointment] {
        self.queues.tab(self.active_tab)
    }

    pub fn active(&self) -> Option<&ActiveConsultation> {
        self.active.as_ref()
    }

    pub fn queue_version(&self) -> u64 {
        self.queue_version
    }

    // ==========================================================================
    // QUEUE REFRESH
    // ==========================================================================

    /// User-initiated (or post-commit) reload. Installs the snapshot
    /// unconditionally and bumps the version, which invalidates any poll
    /// still in flight.
    pub async fn refresh_queues(&mut self) -> Result<(), ConsultationError> {
        let query = self.poll_query();
        let token = self.doctor.token.clone();
        let rows = self
            .gateway
            .list_appointments(&query, token.as_deref())
            .await?;
        self.install_snapshot(rows);
        Ok(())
    }

    /// Install a snapshot fetched by the background watcher, but only if no
    /// newer install happened since it was started. A slow poll must never
    /// overwrite fresher state.
    pub fn apply_poll(&mut self, based_on_version: u64, rows: Vec<Appointment>) -> bool {
        if based_on_version != self.queue_version {
            debug!(
                "Discarding stale poll snapshot (started at v{}, now v{})",
                based_on_version, self.queue_version
            );
            return false;
        }
        self.install_snapshot(rows);
        true
    }

    pub fn poll_context(&self) -> PollContext {
        PollContext {
            version: self.queue_version,
            query: self.poll_query(),
            token: self.doctor.token.clone(),
            gateway: Arc::clone(&self.gateway),
        }
    }

    fn poll_query(&self) -> AppointmentQuery {
        AppointmentQuery::for_doctor(&self.doctor.id)
    }

    fn install_snapshot(&mut self, rows: Vec<Appointment>) {
        // The active consultation lives outside these lists; a refresh can
        // never evict or reorder it.
        self.queues = QueueSnapshot::partition(rows, &self.doctor.id);
        self.queue_version += 1;
        debug!(
            "Queues refreshed (v{}): {} mine, {} department",
            self.queue_version,
            self.queues.mine.len(),
            self.queues.department.len()
        );
    }

    // ==========================================================================
    // CALL NEXT
    // ==========================================================================

    /// FIFO call: always index 0 of the tab-selected queue. Resolves the
    /// patient chart (id first, then phone) and loads the full history before
    /// the consultation opens; any failure puts the session back to Idle with
    /// the queues untouched.
    pub async fn call_next(&mut self) -> Result<&ActiveConsultation, ConsultationError> {
        if self.phase != ConsultationPhase::Idle {
            return Err(ConsultationError::Busy);
        }

        let Some(next) = self.active_queue().first().cloned() else {
            return Err(ConsultationError::QueueEmpty {
                tab: self.active_tab,
            });
        };

        self.phase = ConsultationPhase::CallingNext;
        info!(
            "Calling next patient {} from the {} queue (appointment {})",
            next.patient_name, self.active_tab, next.id
        );

        match self.open_consultation(next).await {
            Ok(consultation) => {
                self.phase = ConsultationPhase::InConsultation;
                Ok(self.active.insert(consultation))
            }
            Err(err) => {
                self.phase = ConsultationPhase::Idle;
                warn!("Call aborted: {}", err);
                Err(err)
            }
        }
    }

    async fn open_consultation(
        &self,
        appointment: Appointment,
    ) -> Result<ActiveConsultation, ConsultationError> {
        let patient = self.resolve_patient(&appointment).await?;
        let history = self
            .history
            .full_patient_history(&patient.id, self.doctor.token.as_deref())
            .await?;

        Ok(ActiveConsultation {
            appointment,
            patient,
            history,
            draft: ConsultationDraft::default(),
        })
    }

    /// Appointment fields are a snapshot and may be stale; a consultation is
    /// only opened against an existing chart, never a fabricated one.
    async fn resolve_patient(
        &self,
        appointment: &Appointment,
    ) -> Result<Patient, ConsultationError> {
        let token = self.doctor.token.as_deref();

        if let Some(patient_id) = appointment.patient_id.as_deref() {
            match self.gateway.find_patient(patient_id, token).await {
                Ok(patient) => {
                    debug!("Patient resolved by id: {}", patient.id);
                    return Ok(patient);
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
        }

        if !appointment.patient_phone.trim().is_empty() {
            match self
                .gateway
                .find_patient(&appointment.patient_phone, token)
                .await
            {
                Ok(patient) => {
                    debug!("Patient resolved by phone: {}", patient.id);
                    return Ok(patient);
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
        }

        Err(ConsultationError::PatientNotFound(format!(
            "no patient record found for {} ({}); the patient must be registered first",
            appointment.patient_name, appointment.patient_phone
        )))
    }

    // ==========================================================================
    // DRAFT EDITING
    // ==========================================================================

    pub fn draft_mut(&mut self) -> Result<&mut ConsultationDraft, ConsultationError> {
        match self.phase {
            ConsultationPhase::InConsultation => self
                .active
                .as_mut()
                .map(|active| &mut active.draft)
                .ok_or(ConsultationError::NoActiveConsultation),
            ConsultationPhase::CallingNext | ConsultationPhase::Committing => {
                Err(ConsultationError::Busy)
            }
            ConsultationPhase::Idle => Err(ConsultationError::NoActiveConsultation),
        }
    }

    pub fn set_diagnosis(&mut self, text: &str) -> Result<(), ConsultationError> {
        self.draft_mut()?.diagnosis = text.to_string();
        Ok(())
    }

    pub fn set_treatment_plan(&mut self, text: &str) -> Result<(), ConsultationError> {
        self.draft_mut()?.treatment_plan = text.to_string();
        Ok(())
    }

    pub fn add_prescription(&mut self, line: PrescriptionLine) -> Result<(), ConsultationError> {
        self.draft_mut()?.add_line(line)
    }

    pub fn remove_prescription(
        &mut self,
        index: usize,
    ) -> Result<PrescriptionLine, ConsultationError> {
        self.draft_mut()?.remove_line(index)
    }

    // ==========================================================================
    // CANCEL / COMMIT
    // ==========================================================================

    /// Discard the draft and unbind the pair. No network call; the
    /// appointment stays pending in the backend.
    pub fn cancel(&mut self) -> Result<(), ConsultationError> {
        match self.phase {
            ConsultationPhase::InConsultation => {
                if let Some(active) = self.active.take() {
                    info!(
                        "Consultation for {} cancelled; appointment {} stays pending",
                        active.patient.name, active.appointment.id
                    );
                }
                self.phase = ConsultationPhase::Idle;
                Ok(())
            }
            ConsultationPhase::CallingNext | ConsultationPhase::Committing => {
                Err(ConsultationError::Busy)
            }
            ConsultationPhase::Idle => Err(ConsultationError::NoActiveConsultation),
        }
    }

    /// Persist the record (with its prescription lines) and complete the
    /// appointment, issued concurrently. Success requires both. On a partial
    /// failure the draft is retained with the acknowledged half marked, so a
    /// retry re-issues only what is missing.
    pub async fn commit(&mut self) -> Result<CommitReceipt, ConsultationError> {
        match self.phase {
            ConsultationPhase::InConsultation => {}
            ConsultationPhase::CallingNext | ConsultationPhase::Committing => {
                return Err(ConsultationError::Busy)
            }
            ConsultationPhase::Idle => return Err(ConsultationError::NoActiveConsultation),
        }

        let (record, details, appointment_id, record_acked, status_acked) = {
            let doctor_id = self.doctor.id.clone();
            let doctor_name = self.doctor.name.clone();
            let active = self
                .active
                .as_mut()
                .ok_or(ConsultationError::NoActiveConsultation)?;

            if !active.draft.is_complete() {
                return Err(ConsultationError::Validation(
                    "diagnosis and treatment plan are required".to_string(),
                ));
            }

            let stamp = *active.draft.commit_stamp.get_or_insert_with(now_millis);
            let record = MedicalRecord {
                id: format!("R{stamp}"),
                patient_id: active.patient.id.clone(),
                patient_name: active.patient.name.clone(),
                doctor_id,
                doctor_name,
                diagnosis: active.draft.diagnosis.trim().to_string(),
                treatment_plan: active.draft.treatment_plan.trim().to_string(),
                visit_date: local_date(),
            };

            let details: Vec<PrescriptionDetail> = active
                .draft
                .lines()
                .iter()
                .enumerate()
                .map(|(idx, line)| PrescriptionDetail {
                    id: format!("PD{stamp}-{idx}"),
                    record_id: record.id.clone(),
                    medicine_id: line.medicine_id.clone(),
                    dosage: line.dosage.clone(),
                    usage: line.usage.clone(),
                    days: line.days.max(1),
                })
                .collect();

            (
                record,
                details,
                active.appointment.id.clone(),
                active.draft.record_acked,
                active.draft.status_acked,
            )
        };

        let commit_id = Uuid::new_v4();
        info!(
            "Committing consultation {} (record {}, {} prescription lines, appointment {})",
            commit_id,
            record.id,
            details.len(),
            appointment_id
        );

        self.phase = ConsultationPhase::Committing;
        let token = self.doctor.token.clone();

        let save = async {
            if record_acked {
                debug!("Record {} already acknowledged, skipping save", record.id);
                return Ok(());
            }
            self.gateway
                .save_medical_record(&record, &details, token.as_deref())
                .await
                .map(|_| ())
        };
        let complete = async {
            if status_acked {
                debug!(
                    "Appointment {} already completed, skipping status update",
                    appointment_id
                );
                return Ok(());
            }
            self.gateway
                .update_appointment_status(
                    &appointment_id,
                    AppointmentStatus::Completed,
                    token.as_deref(),
                )
                .await
                .map(|_| ())
        };

        let (save_result, status_result) = tokio::join!(save, complete);

        match (save_result, status_result) {
            (Ok(()), Ok(())) => {
                info!(
                    "Consultation {} committed: record {} saved, appointment {} completed",
                    commit_id, record.id, appointment_id
                );
                self.active = None;
                self.phase = ConsultationPhase::Idle;

                // Server-confirmed state is the source of truth; reload
                // instead of optimistically dropping the queue entry.
                if let Err(err) = self.refresh_queues().await {
                    warn!("Queue reload after commit failed: {}", err);
                }

                Ok(CommitReceipt {
                    record_id: record.id,
                    appointment_id,
                    prescription_count: details.len(),
                })
            }
            (save_result, status_result) => {
                let record_saved = save_result.is_ok();
                let status_updated = status_result.is_ok();
                let message = [save_result.err(), status_result.err()]
                    .into_iter()
                    .flatten()
                    .map(|err| err.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");

                if let Some(active) = self.active.as_mut() {
                    active.draft.record_acked = record_saved;
                    active.draft.status_acked = status_updated;
                }
                self.phase = ConsultationPhase::InConsultation;

                warn!(
                    "Commit {} failed (record saved: {}, status updated: {}): {}",
                    commit_id, record_saved, status_updated, message
                );
                Err(ConsultationError::CommitFailed {
                    record_saved,
                    status_updated,
                    message,
                })
            }
        }
    }
}
