use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_warn};
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::socket::{socket_url, SocketTask};
use crate::ticker::run_ticker;
use crate::{ConnId, EngineEvent, EventSink, Stream};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Server base, e.g. `ws://127.0.0.1:8080`.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Grace period for close frames when the engine shuts down.
    pub shutdown_timeout: Duration,
}

impl EngineConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

enum EngineCommand {
    Open {
        conn: ConnId,
        path: String,
        stream: Stream,
    },
    Close {
        conn: ConnId,
    },
    StartTicker {
        period: Duration,
    },
    CancelTicker,
}

/// Handle to the IO thread. Dropping it stops the thread and closes every
/// socket in the background; [`EngineHandle::shutdown`] waits for that.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut io = EngineIo {
                config,
                sink,
                sockets: HashMap::new(),
                ticker: None,
            };
            while let Ok(command) = cmd_rx.recv() {
                io.handle(&runtime, command);
            }
            // Let cancelled sockets send their close frames.
            let pending = io.cancel_all();
            let grace = io.config.shutdown_timeout;
            runtime.block_on(async {
                let _ = tokio::time::timeout(grace, join_all(pending)).await;
            });
        });

        Self {
            cmd_tx,
            thread: Some(thread),
        }
    }

    /// Closes every socket and blocks until the IO thread has exited.
    pub fn shutdown(mut self) {
        let thread = self.thread.take();
        drop(self);
        if let Some(thread) = thread {
            if thread.join().is_err() {
                engine_error!("Engine thread panicked");
            }
        }
    }

    pub fn open(&self, conn: ConnId, path: impl Into<String>, stream: Stream) {
        self.send(EngineCommand::Open {
            conn,
            path: path.into(),
            stream,
        });
    }

    pub fn close(&self, conn: ConnId) {
        self.send(EngineCommand::Close { conn });
    }

    /// Starts the ticker, replacing a running one.
    pub fn start_ticker(&self, period: Duration) {
        self.send(EngineCommand::StartTicker { period });
    }

    pub fn cancel_ticker(&self) {
        self.send(EngineCommand::CancelTicker);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct EngineIo {
    config: EngineConfig,
    sink: Arc<dyn EventSink>,
    sockets: HashMap<ConnId, (CancellationToken, JoinHandle<()>)>,
    ticker: Option<CancellationToken>,
}

impl EngineIo {
    fn handle(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::Open { conn, path, stream } => {
                let url = match socket_url(&self.config.base_url, &path) {
                    Ok(url) => url,
                    Err(err) => {
                        engine_warn!("Cannot open socket {} for {}: {}", conn, path, err);
                        self.sink.emit(EngineEvent::Closed {
                            conn,
                            reason: Some(err.to_string()),
                        });
                        return;
                    }
                };
                engine_debug!("Opening socket {} to {}", conn, url);
                let token = CancellationToken::new();
                let task = SocketTask {
                    conn,
                    stream,
                    url,
                    connect_timeout: self.config.connect_timeout,
                    token: token.clone(),
                    sink: self.sink.clone(),
                };
                let handle = runtime.spawn(task.run());
                if let Some((previous, _)) = self.sockets.insert(conn, (token, handle)) {
                    previous.cancel();
                }
            }
            EngineCommand::Close { conn } => match self.sockets.remove(&conn) {
                Some((token, _)) => token.cancel(),
                None => engine_debug!("Socket {} already closed", conn),
            },
            EngineCommand::StartTicker { period } => {
                if let Some(previous) = self.ticker.take() {
                    previous.cancel();
                }
                let token = CancellationToken::new();
                runtime.spawn(run_ticker(period, token.clone(), self.sink.clone()));
                self.ticker = Some(token);
            }
            EngineCommand::CancelTicker => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.cancel();
                }
            }
        }
    }

    fn cancel_all(&mut self) -> Vec<JoinHandle<()>> {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        self.sockets
            .drain()
            .map(|(_, (token, handle))| {
                token.cancel();
                handle
            })
            .collect()
    }
}
