use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{ConnId, ConnectError, EngineEvent, EventSink, Stream};

/// Builds the socket URL for a page path. `http(s)` bases are mapped to
/// `ws(s)`.
pub fn socket_url(base: &Url, path: &str) -> Result<Url, ConnectError> {
    let mut url = base.join(path)?;
    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => return Err(ConnectError::UnsupportedScheme(other.to_string())),
    };
    if url.scheme() != scheme {
        url.set_scheme(scheme)
            .map_err(|()| ConnectError::UnsupportedScheme(url.scheme().to_string()))?;
    }
    Ok(url)
}

pub(crate) struct SocketTask {
    pub conn: ConnId,
    pub stream: Stream,
    pub url: Url,
    pub connect_timeout: Duration,
    pub token: CancellationToken,
    pub sink: Arc<dyn EventSink>,
}

impl SocketTask {
    pub(crate) async fn run(self) {
        let reason = self.pump().await.err().map(|err| err.to_string());
        if let Some(reason) = &reason {
            engine_warn!("Socket {} to {} failed: {}", self.conn, self.url, reason);
        } else {
            engine_debug!("Socket {} to {} closed", self.conn, self.url);
        }
        self.sink.emit(EngineEvent::Closed {
            conn: self.conn,
            reason,
        });
    }

    async fn pump(&self) -> Result<(), ConnectError> {
        let connect = tokio_tungstenite::connect_async(self.url.as_str());
        let (mut ws, _) = tokio::select! {
            _ = self.token.cancelled() => return Ok(()),
            result = tokio::time::timeout(self.connect_timeout, connect) => {
                result.map_err(|_| ConnectError::Timeout(self.connect_timeout))??
            }
        };
        engine_info!("Socket {} connected to {}", self.conn, self.url);

        loop {
            let message = tokio::select! {
                _ = self.token.cancelled() => {
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                message = ws.next() => message,
            };
            match message {
                Some(Ok(Message::Text(text))) => self.deliver(text.as_str().to_owned()),
                Some(Ok(Message::Binary(bytes))) => {
                    self.deliver(String::from_utf8_lossy(&bytes).into_owned())
                }
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        let reason: &str = &frame.reason;
                        engine_debug!("Socket {} closed by server: {}", self.conn, reason);
                    }
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            }
        }
    }

    fn deliver(&self, text: String) {
        self.sink.emit(EngineEvent::Message {
            conn: self.conn,
            stream: self.stream,
            text,
        });
    }
}
