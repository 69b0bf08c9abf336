use orbit::config;
use orbit::events::AppEvent;
use orbit::geometry::Point;
use orbit::menu::{ListenerHost, ListenerKind, RadialMenu};
use orbit::sys::runtime;
use orbit::sys::server::SharedSnapshot;
use std::sync::Arc;
use std::time::Instant;

/// Socket-driven host: every event already arrives through the socket, so
/// listener scopes are only traced.
struct SocketHost;

impl ListenerHost for SocketHost {
    fn register(&mut self, kind: ListenerKind) {
        log::debug!("listening for {kind}");
    }

    fn unregister(&mut self, kind: ListenerKind) {
        log::debug!("stopped listening for {kind}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_or_default();
    let mut menu = RadialMenu::from_config(config, Point::default());
    let mut host = SocketHost;
    menu.mount(&mut host);

    let snapshot: SharedSnapshot = Arc::new(parking_lot::RwLock::new(Some(menu.snapshot())));
    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, snapshot.clone());

    while let Ok(event) = rx.recv_blocking() {
        match event {
            AppEvent::Menu(event) => {
                let update = menu.handle(event, Instant::now(), &mut host);
                if let Some(id) = &update.activated {
                    log::info!("Activated '{}'", id);
                }
                if let Some(gesture) = update.gesture {
                    log::debug!("{:?}", gesture);
                }
            }
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    menu.apply_config(new_config);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
        *snapshot.write() = Some(menu.snapshot());
    }

    menu.unmount(&mut host);
    Ok(())
}
