use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::Api;
use crate::errors::ApiError;
use crate::services::{AccessControl, Action, TicketService};
use crate::types::dto::tickets::{CreateTicketRequest, TicketResponse, UpdateTicketStatusRequest};
use crate::types::internal::TicketStatus;

/// Queue ticket endpoints, gated on the manage-tickets policy row
pub struct TicketApi {
    access: Arc<AccessControl>,
    tickets: Arc<TicketService>,
}

impl TicketApi {
    pub fn new(access: Arc<AccessControl>, tickets: Arc<TicketService>) -> Self {
        Self { access, tickets }
    }
}

#[derive(Tags)]
enum TicketTags {
    /// Service queue endpoints
    Tickets,
}

impl Api for TicketApi {}

#[OpenApi(prefix_path = "/tickets")]
impl TicketApi {
    /// Create a ticket for a patient; it enters the service queue as Waiting
    #[oai(path = "/", method = "post", tag = "TicketTags::Tickets")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateTicketRequest>,
    ) -> Result<Json<TicketResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let created = self
            .tickets
            .create(body.0.patient_id, &body.0.service, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(created.into()))
    }

    /// Overwrite a ticket's status
    #[oai(path = "/:id/status", method = "put", tag = "TicketTags::Tickets")]
    async fn update_status(
        &self,
        req: &Request,
        id: Path<i64>,
        body: Json<UpdateTicketStatusRequest>,
    ) -> Result<Json<TicketResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let status = TicketStatus::from_str(&body.0.status).map_err(ApiError::bad_request)?;
        let client_ip = self.extract_ip_address(req);
        let updated = self
            .tickets
            .set_status(id.0, status, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(updated.into()))
    }

    /// Get a ticket by id
    #[oai(path = "/:id", method = "get", tag = "TicketTags::Tickets")]
    async fn get(&self, req: &Request, id: Path<i64>) -> Result<Json<TicketResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let ticket = self.tickets.get(id.0).await?;
        Ok(Json(ticket.into()))
    }

    /// Waiting tickets for a service, oldest first
    #[oai(path = "/queue/:service", method = "get", tag = "TicketTags::Tickets")]
    async fn queue(
        &self,
        req: &Request,
        service: Path<String>,
    ) -> Result<Json<Vec<TicketResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let queue = self.tickets.queue_for(&service.0).await?;
        Ok(Json(queue.into_iter().map(Into::into).collect()))
    }

    /// Head of the waiting line for a service
    #[oai(path = "/next/:service", method = "get", tag = "TicketTags::Tickets")]
    async fn next(
        &self,
        req: &Request,
        service: Path<String>,
    ) -> Result<Json<TicketResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let head = self.tickets.next(&service.0).await?;
        Ok(Json(head.into()))
    }

    /// All tickets of a patient
    #[oai(path = "/patient/:patient_id", method = "get", tag = "TicketTags::Tickets")]
    async fn by_patient(
        &self,
        req: &Request,
        patient_id: Path<i64>,
    ) -> Result<Json<Vec<TicketResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let tickets = self.tickets.list_by_patient(patient_id.0).await?;
        Ok(Json(tickets.into_iter().map(Into::into).collect()))
    }

    /// All tickets of a service, any status
    #[oai(path = "/service/:service", method = "get", tag = "TicketTags::Tickets")]
    async fn by_service(
        &self,
        req: &Request,
        service: Path<String>,
    ) -> Result<Json<Vec<TicketResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let tickets = self.tickets.list_by_service(&service.0).await?;
        Ok(Json(tickets.into_iter().map(Into::into).collect()))
    }

    /// All tickets in a given status, across services
    #[oai(path = "/status/:status", method = "get", tag = "TicketTags::Tickets")]
    async fn by_status(
        &self,
        req: &Request,
        status: Path<String>,
    ) -> Result<Json<Vec<TicketResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::ManageTickets)
            .await?;

        let status = TicketStatus::from_str(&status.0).map_err(ApiError::bad_request)?;
        let tickets = self.tickets.list_by_status(status).await?;
        Ok(Json(tickets.into_iter().map(Into::into).collect()))
    }
}
