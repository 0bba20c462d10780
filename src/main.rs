//! Payroll Computation Engine server.
//!
//! Reads tenant configurations from `PAYROLL_CONFIG_DIR` and serves the HTTP
//! API on `PAYROLL_BIND_ADDR`.

use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/tenants";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("payroll_engine=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config_dir = env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let bind_addr = env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        tenants = config.tenant_ids().count(),
        "Tenant configurations loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "Payroll engine listening");

    axum::serve(listener, app).await?;
    Ok(())
}
