use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::logging::Logger;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use almanac_app::app::api::routes;
use almanac_app::config::ConfigHandler;
use almanac_app::db_handler::DbProviderHandler;
use almanac_core::config::load_config;
use almanac_db::db::connection::create_pool;
use almanac_db::db::migrate::run_migrations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Almanac calendar server");

    let config = load_config()?;

    tracing::info!(
        bind_address = %config.server.bind_address(),
        auth_method = ?config.auth.method,
        "Configuration loaded"
    );

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    if config.database.run_migrations {
        run_migrations(&config.database.url).await?;
    }

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;

    let bind_addr = config.server.bind_address();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(Logger::new())
        .hoop(DbProviderHandler::new(pool))
        .hoop(ConfigHandler {
            settings: Arc::new(config),
        })
        .push(routes()?);

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
