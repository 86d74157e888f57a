use std::net::SocketAddr;
use std::sync::Arc;

use funpayhunter::{
    config, routes,
    services::{fetcher::HttpFetcher, monitor::Monitor, telegram::TelegramClient},
    templates, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::load();

    let channel = Arc::new(TelegramClient::new(
        settings.telegram_bot_token.clone(),
        settings.telegram_chat_id.clone(),
    ));
    if !channel.is_configured() {
        tracing::warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, notifications disabled");
    }

    let monitor = Monitor::new(
        settings.monitor_config(),
        Arc::new(HttpFetcher::new()),
        channel.clone(),
    );

    let state = AppState {
        hbs: templates::build_handlebars()?,
        settings: settings.clone(),
        monitor: monitor.clone(),
        channel,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    monitor.shutdown().await;
    Ok(())
}
