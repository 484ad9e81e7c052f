#![allow(clippy::result_large_err)]

use campus_attendance::{
    api::{self, AppState, auth::TokenKeys},
    config::{self, database},
    core::user,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Connect and create tables
    let database_url = database::get_database_url();
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to {}: {}", database_url, e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the first admin account when the users table is empty
    if let Some(admin) = user::seed_default_admin(&db, &app_config.admin)
        .await
        .inspect_err(|e| error!("Failed to seed admin account: {}", e))?
    {
        info!("Seeded admin account {}", admin.email);
    }

    // 6. Serve the API
    // JWT_SECRET is read here, directly before use, not stored in AppConfig
    let tokens = TokenKeys::new(&config::settings::jwt_secret(), app_config.auth.token_ttl_hours);
    api::serve(AppState::new(db, tokens), &app_config.server.bind).await
}
