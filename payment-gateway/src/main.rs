use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use payment_gateway::{router, AppState, GatewayConfig, HttpGateway};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    let gateway = HttpGateway::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.transport,
        config.timeout(),
    )?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    info!(
        site_code = %config.site_code,
        mode = config.mode(),
        api_url = %config.api_url,
        hash_casing = ?config.hash_casing,
        transport = ?config.transport,
        "starting payment-gateway on {addr}"
    );

    let state = AppState::new(config, Arc::new(gateway))?;
    let app = router(state).layer(cors);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
