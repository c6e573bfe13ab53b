use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use std::sync::Arc;

use clinic_backend::config::Settings;
use clinic_backend::{bootstrap, AppData};

/// Fresh in-memory application with migrations applied and the default
/// staff accounts seeded
pub async fn setup_app() -> Arc<AppData> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let settings = Settings {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "integration-test-secret-minimum-32-chars".to_string(),
        token_lifetime_secs: 3600,
        email_enabled: false,
        reset_link_base: "http://localhost:3000/reset-password".to_string(),
    };

    let app = Arc::new(AppData::init(db, &settings));
    bootstrap::seed_default_identities(&app.identity_store)
        .await
        .expect("Failed to seed default identities");
    app
}
