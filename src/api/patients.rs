use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::Api;
use crate::errors::ApiError;
use crate::services::{AccessControl, Action, PatientService};
use crate::types::dto::patients::{CreatePatientRequest, PatientResponse};

/// Patient registry endpoints, gated on the manage-patients policy row
pub struct PatientApi {
    access: Arc<AccessControl>,
    patients: Arc<PatientService>,
}

impl PatientApi {
    pub fn new(access: Arc<AccessControl>, patients: Arc<PatientService>) -> Self {
        Self { access, patients }
    }
}

#[derive(Tags)]
enum PatientTags {
    /// Patient registry endpoints
    Patients,
}

impl Api for PatientApi {}

#[OpenApi(prefix_path = "/patients")]
impl PatientApi {
    /// Register a patient; a PAT- number is minted for the record
    #[oai(path = "/", method = "post", tag = "PatientTags::Patients")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreatePatientRequest>,
    ) -> Result<Json<PatientResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::ManagePatients)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let created = self
            .patients
            .register(body.0.full_name, body.0.phone, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(created.into()))
    }

    /// List all patients
    #[oai(path = "/", method = "get", tag = "PatientTags::Patients")]
    async fn list(&self, req: &Request) -> Result<Json<Vec<PatientResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManagePatients)
            .await?;

        let patients = self.patients.list().await?;
        Ok(Json(patients.into_iter().map(Into::into).collect()))
    }

    /// Get a patient by id
    #[oai(path = "/:id", method = "get", tag = "PatientTags::Patients")]
    async fn get(&self, req: &Request, id: Path<i64>) -> Result<Json<PatientResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManagePatients)
            .await?;

        let patient = self.patients.get(id.0).await?;
        Ok(Json(patient.into()))
    }

    /// Get a patient by formatted number
    #[oai(path = "/number/:number", method = "get", tag = "PatientTags::Patients")]
    async fn get_by_number(
        &self,
        req: &Request,
        number: Path<String>,
    ) -> Result<Json<PatientResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManagePatients)
            .await?;

        let patient = self.patients.get_by_number(&number.0).await?;
        Ok(Json(patient.into()))
    }
}
