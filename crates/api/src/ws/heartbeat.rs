use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

/// How often idle dashboards are pinged to keep proxies from dropping them.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every live connection once per `period` until the handle is aborted.
pub fn start_heartbeat(ws_manager: Arc<WsManager>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; nobody is connected yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pinged = ws_manager.ping_all().await;
            if pinged > 0 {
                tracing::debug!(pinged, "WebSocket heartbeat");
            }
        }
    })
}
