use sea_orm::entity::prelude::*;

/// Cash-desk payment recorded against a ticket. Amounts are integer cents.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub receipt_number: String,
    pub ticket_id: i64,
    pub patient_id: i64,
    pub amount_cents: i64,
    pub method: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
