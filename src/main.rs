use tokio::net::TcpListener;
use tracing::info;
use triplog::config::AppConfig;
use triplog::error::AppError;
use triplog::routes::create_router;
use triplog::services::{ledger::TripLedger, storage::open_repository};
use triplog::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    info!("using storage {:?}", config.storage);

    let repo = open_repository(&config.storage).await?;
    let ledger = TripLedger::open(repo).await?;

    let state = AppState::new(config.clone(), ledger);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,triplog=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
