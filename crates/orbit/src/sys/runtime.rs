use super::SOCKET_PATH;
use super::server::SharedSnapshot;
use crate::events::AppEvent;
use async_channel::Sender;
use std::path::Path;
use std::thread;
use tokio::runtime::Runtime;

pub fn start_background_services(tx: Sender<AppEvent>, snapshot: SharedSnapshot) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    super::server::run_server(Path::new(SOCKET_PATH), tx, snapshot).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::watch_for_reloads(tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}
