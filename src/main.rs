mod auth;
mod config;
mod domain;
mod emails;
mod handlers;
mod metrics;
mod noticeboard;
mod realtime;
mod repo;

use std::sync::Arc;
use crate::auth::GoTrueClient;
use crate::emails::Placeholders;
use crate::handlers::AppState;
use crate::noticeboard::NoticeBoard;
use crate::realtime::RealtimeHub;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv()?;

    pretty_env_logger::init();

    let app_config = config::AppConfig::from_env()?;
    let database_config = config::DatabaseConfig::from_env()?;
    let auth_config = config::AuthConfig::from_env()?;
    let db_conn = repo::establish_database_connection(&database_config).await?;

    let hub = RealtimeHub::new(app_config.realtime.capacity);
    let listener = realtime::spawn_listener(db_conn.clone(), hub.clone(), app_config.realtime.reconnect_delay);

    let emails = emails::render_email_templates(&Placeholders::default())?;
    let state = AppState {
        board: NoticeBoard::new(repo::Repositories::new(&db_conn)),
        auth: Arc::new(GoTrueClient::new(auth_config)?),
        hub,
        emails,
        config: app_config.clone(),
    };
    let app = metrics::init(handlers::router(state));

    let tcp_listener = tokio::net::TcpListener::bind(app_config.listen_addr).await?;
    log::info!("The noticeboard is listening on {}", app_config.listen_addr);
    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to install CTRL+C signal handler: {e}");
                std::future::pending::<()>().await;
            }
            log::info!("Shutdown of the server")
        })
        .await?;

    listener.abort();
    db_conn.close().await;
    Ok(())
}
