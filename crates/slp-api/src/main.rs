//! slp-api server binary.
//!
//! Reads configuration from the environment, connects whatever
//! collaborators are configured and serves the gateway. A missing
//! collaborator is not fatal: the endpoints that need it answer 503.

use std::error::Error;

use slp_api::config::{AppConfig, LogFormat};
use slp_api::{app, db, AppState};
use slp_rpc_client::{
    IdentityClient, IdentityConfig, MatrixClient, MatrixConfig, RpcClient, RpcConfig,
    SearchClient, SearchConfig,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn connect_collaborators(mut state: AppState) -> Result<AppState, Box<dyn Error>> {
    match RpcConfig::from_env() {
        Ok(config) => state = state.with_rpc(RpcClient::new(&config)?),
        Err(err) => tracing::warn!(%err, "RPC bridge not configured. Write endpoints will return 503."),
    }
    match MatrixConfig::from_env() {
        Ok(config) => state = state.with_matrix(MatrixClient::new(&config)?),
        Err(err) => tracing::warn!(%err, "Matrix service not configured. Route aggregates will return 503."),
    }
    match SearchConfig::from_env() {
        Ok(config) => state = state.with_search(SearchClient::new(&config)?),
        Err(err) => tracing::warn!(%err, "Search not configured. The courier list will return 503."),
    }
    match IdentityConfig::from_env() {
        Ok(config) => state = state.with_identity(IdentityClient::new(&config)?),
        Err(err) => tracing::warn!(%err, "Identity provider not configured. Authentication is disabled."),
    }
    Ok(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let addr = config.bind_addr();
    let mut state = AppState::new(config);
    if let Some(pool) = db::init_pool().await? {
        state = state.with_db(pool);
    }
    let state = connect_collaborators(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "slp-api listening");
    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
