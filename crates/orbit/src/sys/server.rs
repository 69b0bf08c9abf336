use super::protocol::{Command, parse_line};
use crate::events::AppEvent;
use crate::menu::Snapshot;
use async_channel::Sender;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Latest menu state, written by the event loop and read by `dump` requests.
pub type SharedSnapshot = Arc<RwLock<Option<Snapshot>>>;

pub async fn run_server(socket_path: &Path, tx: Sender<AppEvent>, snapshot: SharedSnapshot) {
    // Cleanup old socket if it exists
    if fs_err::metadata(socket_path).is_ok() {
        let _ = fs_err::remove_file(socket_path);
    }

    let listener = match UnixListener::bind(socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                let snapshot = snapshot.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(stream, tx, snapshot).await {
                        log::warn!("Connection closed with error: {}", e);
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn serve_connection(
    mut stream: UnixStream,
    tx: Sender<AppEvent>,
    snapshot: SharedSnapshot,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_line(&line) {
            Ok(Command::Event(event)) => {
                if tx.send(AppEvent::Menu(event)).await.is_err() {
                    break;
                }
                None
            }
            Ok(Command::Dump) => {
                let json = serde_json::to_string(&*snapshot.read())
                    .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"));
                Some(json)
            }
            Err(e) => Some(format!("error: {e}")),
        };
        if let Some(reply) = reply {
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
    }
    Ok(())
}
