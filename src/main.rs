use chem_inventory::{
    api::{self, ApiState},
    config::{self, database, users},
    core::auth,
    errors::Result,
};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let app_config = config::server::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    match users::get_admin_credentials() {
        Some(credentials) => {
            auth::ensure_admin_user(&db, &credentials)
                .await
                .inspect_err(|e| error!("Failed to seed admin account: {}", e))?;
        }
        None => warn!("INVENTORY_ADMIN_PASSWORD not set; no admin account will be seeded"),
    }

    let address = app_config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;
    info!("Listening on {}", address);

    let app = api::router(ApiState::new(db), &app_config.server);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
