//! Wire envelope and typed events of the JSON event stream.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::types::{QueuedRun, RunRecord};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("invalid `{kind}` payload: {source}")]
    Payload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

/// The event kinds a page can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Status,
    JobQueued,
    JobStarted,
    JobCompleted,
}

impl EventKind {
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "status" => Some(EventKind::Status),
            "job_queued" => Some(EventKind::JobQueued),
            "job_started" => Some(EventKind::JobStarted),
            "job_completed" => Some(EventKind::JobCompleted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::JobQueued => "job_queued",
            EventKind::JobStarted => "job_started",
            EventKind::JobCompleted => "job_completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded event, with the `status` payload typed per page.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<S> {
    Status { title: String, snapshot: S },
    JobQueued(QueuedRun),
    JobStarted(RunRecord),
    JobCompleted(RunRecord),
}

impl<S> Event<S> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Status { .. } => EventKind::Status,
            Event::JobQueued(_) => EventKind::JobQueued,
            Event::JobStarted(_) => EventKind::JobStarted,
            Event::JobCompleted(_) => EventKind::JobCompleted,
        }
    }
}

/// `{type, title?, data}` as received from the socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(text).map_err(DecodeError::Malformed)
    }

    /// `None` for event types this client does not know about.
    pub fn event_kind(&self) -> Option<EventKind> {
        EventKind::from_type(&self.kind)
    }

    /// Decodes the payload. Unknown event types yield `Ok(None)`.
    pub fn decode<S: DeserializeOwned>(self) -> Result<Option<Event<S>>, DecodeError> {
        let Some(kind) = self.event_kind() else {
            return Ok(None);
        };
        // Events without data still decode into their all-default payload.
        let data = match self.data {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let payload_err = |source| DecodeError::Payload { kind, source };
        let event = match kind {
            EventKind::Status => Event::Status {
                title: self.title.unwrap_or_default(),
                snapshot: serde_json::from_value(data).map_err(payload_err)?,
            },
            EventKind::JobQueued => {
                Event::JobQueued(serde_json::from_value(data).map_err(payload_err)?)
            }
            EventKind::JobStarted => {
                Event::JobStarted(serde_json::from_value(data).map_err(payload_err)?)
            }
            EventKind::JobCompleted => {
                Event::JobCompleted(serde_json::from_value(data).map_err(payload_err)?)
            }
        };
        Ok(Some(event))
    }
}
