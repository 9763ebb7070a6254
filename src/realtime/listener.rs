use std::time::Duration;
use sqlx::postgres::PgListener;
use sqlx::{Pool, Postgres};
use tokio::task::JoinHandle;
use crate::metrics;
use crate::realtime::{ChangeEvent, RealtimeHub, CHANNEL};

pub fn spawn_listener(pool: Pool<Postgres>, hub: RealtimeHub, reconnect_delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = listen(&pool, &hub).await {
                log::error!("the realtime listener failed, reconnecting in {reconnect_delay:?}: {e}");
            }
            tokio::time::sleep(reconnect_delay).await;
        }
    })
}

async fn listen(pool: &Pool<Postgres>, hub: &RealtimeHub) -> anyhow::Result<()> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANNEL).await?;
    log::info!("listening for changes on the '{CHANNEL}' channel");

    loop {
        let notification = listener.recv().await?;
        match parse_payload(notification.payload()) {
            Ok(event) => {
                metrics::REALTIME_EVENTS_COUNTER.inc();
                hub.publish(event);
            }
            Err(e) => log::warn!("skipping a malformed change payload '{}': {e}", notification.payload()),
        }
    }
}

fn parse_payload(payload: &str) -> serde_json::Result<ChangeEvent> {
    serde_json::from_str(payload)
}
