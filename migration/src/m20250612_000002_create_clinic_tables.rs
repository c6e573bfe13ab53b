use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create patients table
        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Patients::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Patients::Number).string().not_null().unique_key())
                    .col(ColumnDef::new(Patients::FullName).string().not_null())
                    .col(ColumnDef::new(Patients::Phone).string())
                    .col(ColumnDef::new(Patients::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Patients::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create tickets table
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::Number).string().not_null().unique_key())
                    .col(ColumnDef::new(Tickets::PatientId).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::Service).string().not_null())
                    .col(ColumnDef::new(Tickets::Status).string().not_null())
                    .col(ColumnDef::new(Tickets::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_patient_id")
                            .from(Tickets::Table, Tickets::PatientId)
                            .to(Patients::Table, Patients::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_service")
                    .table(Tickets::Table)
                    .col(Tickets::Service)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_status")
                    .table(Tickets::Table)
                    .col(Tickets::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_created_at")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Create payments table
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::ReceiptNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Payments::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::PatientId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(ColumnDef::new(Payments::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_ticket_id")
                            .from(Payments::Table, Payments::TicketId)
                            .to(Tickets::Table, Tickets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_ticket_id")
                    .table(Payments::Table)
                    .col(Payments::TicketId)
                    .to_owned(),
            )
            .await?;

        // Create consultations table
        manager
            .create_table(
                Table::create()
                    .table(Consultations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consultations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Consultations::PatientId).big_integer().not_null())
                    .col(ColumnDef::new(Consultations::PhysicianId).string().not_null())
                    .col(ColumnDef::new(Consultations::Diagnosis).string().not_null())
                    .col(ColumnDef::new(Consultations::Notes).string())
                    .col(ColumnDef::new(Consultations::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Consultations::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consultations_patient_id")
                            .from(Consultations::Table, Consultations::PatientId)
                            .to(Patients::Table, Patients::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_consultations_patient_id")
                    .table(Consultations::Table)
                    .col(Consultations::PatientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consultations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Patients {
    Table,
    Id,
    Number,
    FullName,
    Phone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    Number,
    PatientId,
    Service,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    ReceiptNumber,
    TicketId,
    PatientId,
    AmountCents,
    Method,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Consultations {
    Table,
    Id,
    PatientId,
    PhysicianId,
    Diagnosis,
    Notes,
    CreatedAt,
    UpdatedAt,
}
