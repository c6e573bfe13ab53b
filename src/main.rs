use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::Database;
use std::sync::Arc;
use std::time::Duration;

use clinic_backend::api::{
    AuthApi, ConsultationApi, HealthApi, PatientApi, PaymentApi, TicketApi, UserApi,
};
use clinic_backend::config::{logging, Settings};
use clinic_backend::{bootstrap, AppData};
use migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    logging::init_logging().expect("Failed to initialize logging");

    let settings = Settings::from_env().expect("Invalid configuration");

    let db = Database::connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database: {}", settings.database_url);

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Database migrations completed");

    let app_data = Arc::new(AppData::init(db, &settings));

    bootstrap::seed_default_identities(&app_data.identity_store)
        .await
        .expect("Failed to seed default identities");

    // Periodic hygiene: drop reset tokens whose expiry has passed
    let reset_flow = app_data.reset_flow.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match reset_flow.purge_expired().await {
                Ok(purged) if purged > 0 => {
                    tracing::info!("Purged {} expired reset tokens", purged);
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Reset token purge failed: {}", e),
            }
        }
    });

    let api_service = OpenApiService::new(
        (
            HealthApi,
            AuthApi::new(app_data.auth_service.clone(), app_data.reset_flow.clone()),
            UserApi::new(app_data.access.clone(), app_data.user_service.clone()),
            PatientApi::new(app_data.access.clone(), app_data.patient_service.clone()),
            TicketApi::new(app_data.access.clone(), app_data.ticket_service.clone()),
            PaymentApi::new(app_data.access.clone(), app_data.payment_service.clone()),
            ConsultationApi::new(app_data.access.clone(), app_data.consultation_service.clone()),
        ),
        "Clinic Backend",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("http://{}/api", settings.bind_addr));

    let ui = api_service.swagger_ui();

    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui);

    tracing::info!("Listening on {}", settings.bind_addr);
    Server::new(TcpListener::bind(settings.bind_addr.clone()))
        .run(app)
        .await
}
