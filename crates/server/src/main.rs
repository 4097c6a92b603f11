use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use client_core::{CountryForm, RestCountriesClient};
use tracing::info;

mod api;
mod app_state;
mod config;
mod render;

use api::build_router;
use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let source = RestCountriesClient::new(&settings.countries_api_url)
        .with_context(|| format!("invalid countries api url '{}'", settings.countries_api_url))?;
    let state = AppState {
        form: Arc::new(CountryForm::new(Arc::new(source))),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, countries_api_url = %settings.countries_api_url, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
