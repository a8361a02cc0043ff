use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use home_hub::{
    api,
    config::Config,
    coordinator::Coordinator,
    feed::{FeedService, WeatherClient},
    timer::TimerService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent; env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    // Shared device state, seeded from the card list and telemetry archive
    let coordinator = Coordinator::load(&config).await;
    let shutdown = CancellationToken::new();

    // Lamp timer engine
    tokio::spawn(TimerService::new(coordinator.clone()).run(shutdown.clone()));

    // Weather / forecast / solar refresh
    {
        let weather = WeatherClient::new(&config)?;
        if !weather.is_configured() {
            info!("WEATHER_API_KEY not set; live weather disabled");
        }
        let feed = FeedService::new(weather, coordinator.clone(), config.feed_interval_secs);
        tokio::spawn(feed.run(shutdown.clone()));
    }

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(coordinator))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
