use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::Api;
use crate::errors::ApiError;
use crate::services::{AccessControl, Action, ConsultationService};
use crate::types::dto::consultations::{ConsultationResponse, CreateConsultationRequest};

/// Consultation endpoints, gated on the manage-consultations policy row
pub struct ConsultationApi {
    access: Arc<AccessControl>,
    consultations: Arc<ConsultationService>,
}

impl ConsultationApi {
    pub fn new(access: Arc<AccessControl>, consultations: Arc<ConsultationService>) -> Self {
        Self { access, consultations }
    }
}

#[derive(Tags)]
enum ConsultationTags {
    /// Consultation endpoints
    Consultations,
}

impl Api for ConsultationApi {}

#[OpenApi(prefix_path = "/consultations")]
impl ConsultationApi {
    /// Record a consultation; the authenticated caller is the examining
    /// physician
    #[oai(path = "/", method = "post", tag = "ConsultationTags::Consultations")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateConsultationRequest>,
    ) -> Result<Json<ConsultationResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::ManageConsultations)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let created = self
            .consultations
            .create(
                body.0.patient_id,
                &actor.id,
                body.0.diagnosis,
                body.0.notes,
                client_ip.as_deref(),
            )
            .await?;
        Ok(Json(created.into()))
    }

    /// Get a consultation by id
    #[oai(path = "/:id", method = "get", tag = "ConsultationTags::Consultations")]
    async fn get(
        &self,
        req: &Request,
        id: Path<i64>,
    ) -> Result<Json<ConsultationResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageConsultations)
            .await?;

        let consultation = self.consultations.get(id.0).await?;
        Ok(Json(consultation.into()))
    }

    /// All consultations of a patient, oldest first
    #[oai(path = "/patient/:patient_id", method = "get", tag = "ConsultationTags::Consultations")]
    async fn by_patient(
        &self,
        req: &Request,
        patient_id: Path<i64>,
    ) -> Result<Json<Vec<ConsultationResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageConsultations)
            .await?;

        let consultations = self.consultations.list_by_patient(patient_id.0).await?;
        Ok(Json(consultations.into_iter().map(Into::into).collect()))
    }
}
