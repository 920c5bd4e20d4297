use crate::events::{AppEvent, Reply};
use crate::protocol;
use crate::sys::runtime::timestamp;
use async_channel::Sender;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Outgoing line queues of all connected clients.
pub type Subscribers = Arc<Mutex<Vec<Reply>>>;

const CLIENT_QUEUE_SIZE: usize = 64;

pub async fn run_server(socket_path: PathBuf, tx: Sender<AppEvent>, subscribers: Subscribers) {
    // Cleanup old socket if it exists
    if fs_err::metadata(&socket_path).is_ok() {
        let _ = fs_err::remove_file(&socket_path);
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!(
                "Failed to bind unix socket {}: {}",
                socket_path.display(),
                e
            );
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                let subscribers = subscribers.clone();
                tokio::spawn(async move {
                    handle_client(stream, tx, subscribers).await;
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Forwards the client's commands to the app and streams notifications back until
/// the client disconnects.
async fn handle_client(stream: UnixStream, tx: Sender<AppEvent>, subscribers: Subscribers) {
    let (reader, mut writer) = stream.into_split();

    let (line_tx, line_rx) = async_channel::bounded::<String>(CLIENT_QUEUE_SIZE);
    subscribers.lock().push(line_tx.clone());

    let writer_task = tokio::spawn(async move {
        while let Ok(line) = line_rx.recv().await {
            if writer.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                if let Some(event) = handle_line(line, &line_tx)
                    && tx.send(event).await.is_err()
                {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read from client: {}", e);
                break;
            }
        }
    }

    // The app drops the closed queue on its next broadcast.
    writer_task.abort();
}

/// Parses a line of `client`. Rejected lines are answered with an error line.
fn handle_line(line: &str, client: &Reply) -> Option<AppEvent> {
    match protocol::parse_line(line, timestamp()) {
        Ok(event) => Some(event.reply_to(client)),
        Err(e) => {
            log::warn!("Ignoring '{}': {}", line, e);
            if client.try_send(protocol::error_line(&e)).is_err() {
                log::warn!("Failed to report error to client");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_line_is_answered() {
        let (client, answers) = async_channel::unbounded();
        assert!(handle_line("show '{\"root\": 1}'", &client).is_none());

        let answer = answers.try_recv().unwrap();
        assert!(answer.starts_with("error Invalid menu: "), "{}", answer);
        assert!(answers.try_recv().is_err());
    }

    #[test]
    fn test_requests_carry_the_client() {
        let (client, answers) = async_channel::unbounded();
        let Some(AppEvent::Frame { reply: Some(reply) }) = handle_line("frame", &client) else {
            panic!("expected frame request");
        };
        reply.try_send("frame null".to_string()).unwrap();
        assert_eq!(answers.try_recv().unwrap(), "frame null");

        assert!(matches!(handle_line("tick", &client), Some(AppEvent::Input(_))));
        assert!(answers.try_recv().is_err());
    }
}
