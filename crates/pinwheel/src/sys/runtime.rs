use crate::events::AppEvent;
use crate::sys::server::Subscribers;
use async_channel::Sender;
use spokes::events::InputEvent;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// Pause detection in marking mode needs a clock even while the pointer rests.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic time since the daemon started.
pub fn timestamp() -> Duration {
    EPOCH.get_or_init(Instant::now).elapsed()
}

pub fn start_background_services(
    socket_path: PathBuf,
    tx: Sender<AppEvent>,
    subscribers: Subscribers,
) {
    timestamp();

    thread::spawn(move || {
        let rt = Runtime::new().expect("Failed to create Tokio runtime");

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(socket_path, tx, subscribers).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(TICK_INTERVAL);
                    loop {
                        interval.tick().await;
                        let tick = InputEvent::Tick {
                            timestamp: timestamp(),
                        };
                        if tx.send(AppEvent::Input(tick)).await.is_err() {
                            break;
                        }
                    }
                });
            }

            std::future::pending::<()>().await;
        });
    });
}
