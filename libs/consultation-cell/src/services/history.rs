use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use shared_gateway::BackendClient;
use shared_models::{ApiError, Medicine};

use crate::models::{HistoryLine, HistoryRecord};

/// Read side of the patient chart: every prior record with its prescription
/// lines, enriched with medicine name/price/spec for display.
pub struct HistoryService {
    gateway: Arc<BackendClient>,
}

impl HistoryService {
    pub fn new(gateway: Arc<BackendClient>) -> Self {
        Self { gateway }
    }

    pub async fn full_patient_history(
        &self,
        patient_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<HistoryRecord>, ApiError> {
        debug!("Loading history for patient {}", patient_id);

        let (mut records, medicines) = futures::try_join!(
            self.gateway.list_records(Some(patient_id), auth_token),
            self.gateway.list_medicines(auth_token),
        )?;

        // Newest visit first; visit dates are YYYY-MM-DD so the lexicographic
        // order is the chronological one.
        records.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));

        let enriched = try_join_all(records.into_iter().map(|record| {
            let medicines = &medicines;
            async move {
                let details = self
                    .gateway
                    .list_prescription_details(Some(&record.id), auth_token)
                    .await?;
                let lines = details
                    .into_iter()
                    .map(|detail| enrich_line(detail, medicines))
                    .collect();
                Ok::<_, ApiError>(HistoryRecord { record, lines })
            }
        }))
        .await?;

        Ok(enriched)
    }
}

fn enrich_line(
    detail: shared_models::PrescriptionDetail,
    medicines: &[Medicine],
) -> HistoryLine {
    let medicine = medicines.iter().find(|m| m.id == detail.medicine_id);
    HistoryLine {
        medicine_name: medicine.map(|m| m.name.clone()),
        medicine_price: medicine.map(|m| m.price),
        medicine_spec: medicine.map(|m| m.specification.clone()),
        detail,
    }
}
