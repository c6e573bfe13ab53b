use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::Api;
use crate::errors::ApiError;
use crate::services::{AccessControl, Action, PaymentService};
use crate::types::dto::payments::{PaymentResponse, RecordPaymentRequest};
use crate::types::internal::PaymentMethod;

/// Cash-desk endpoints, gated on the record-payments policy row
pub struct PaymentApi {
    access: Arc<AccessControl>,
    payments: Arc<PaymentService>,
}

impl PaymentApi {
    pub fn new(access: Arc<AccessControl>, payments: Arc<PaymentService>) -> Self {
        Self { access, payments }
    }
}

#[derive(Tags)]
enum PaymentTags {
    /// Cash desk endpoints
    Payments,
}

impl Api for PaymentApi {}

#[OpenApi(prefix_path = "/payments")]
impl PaymentApi {
    /// Record a payment against a ticket; a REC- receipt number is minted
    #[oai(path = "/", method = "post", tag = "PaymentTags::Payments")]
    async fn record(
        &self,
        req: &Request,
        body: Json<RecordPaymentRequest>,
    ) -> Result<Json<PaymentResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::RecordPayments)
            .await?;

        let method = PaymentMethod::from_str(&body.0.method).map_err(ApiError::bad_request)?;
        let client_ip = self.extract_ip_address(req);
        let created = self
            .payments
            .record(
                body.0.ticket_id,
                body.0.amount_cents,
                method,
                &actor.id,
                client_ip.as_deref(),
            )
            .await?;
        Ok(Json(created.into()))
    }

    /// All payments recorded against a ticket
    #[oai(path = "/ticket/:ticket_id", method = "get", tag = "PaymentTags::Payments")]
    async fn by_ticket(
        &self,
        req: &Request,
        ticket_id: Path<i64>,
    ) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::RecordPayments)
            .await?;

        let payments = self.payments.list_by_ticket(ticket_id.0).await?;
        Ok(Json(payments.into_iter().map(Into::into).collect()))
    }

    /// Look a payment up by its receipt number
    #[oai(path = "/receipt/:number", method = "get", tag = "PaymentTags::Payments")]
    async fn by_receipt(
        &self,
        req: &Request,
        number: Path<String>,
    ) -> Result<Json<PaymentResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::RecordPayments)
            .await?;

        let payment = self.payments.get_by_receipt(&number.0).await?;
        Ok(Json(payment.into()))
    }
}
