//! Progress events from a pipeline run to a single observer
//!
//! Events travel over a bounded FIFO queue. Progress events never block the
//! pipeline: when the queue is full they are dropped. Terminal events wait
//! for capacity so the observer always learns how the run ended.

use std::convert::Infallible;
use std::time::Duration;

use actix_web::web::Bytes;
use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::model::PipelineEvent;

pub const KEEPALIVE_FRAME: &str = ": keepalive\n\n";

/// Sending half, cloned into every stage of a run
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

/// Receiving half, owned by the SSE stream
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<PipelineEvent>,
}

pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx: Some(tx) }, EventReceiver { rx })
}

impl EventSender {
    /// Sink for runs nobody is watching
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Queue a progress event without waiting
    pub fn emit(&self, event: PipelineEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    kind = event.kind.as_str(),
                    stage = %event.stage,
                    "Event queue full, dropping progress event"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(kind = event.kind.as_str(), "Observer gone, event discarded");
            }
        }
    }

    /// Queue a terminal event, waiting for capacity
    pub async fn emit_terminal(&self, event: PipelineEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(event).await {
            tracing::debug!(kind = e.0.kind.as_str(), "Observer gone, terminal event discarded");
        }
    }
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<PipelineEvent> {
        self.rx.recv().await
    }
}

/// `event: <kind>` plus the JSON payload, blank-line terminated
pub fn encode_frame(event: &PipelineEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(format!("event: {}\ndata: {}\n\n", event.kind.as_str(), json)),
        Err(e) => {
            tracing::warn!(kind = event.kind.as_str(), error = %e, "Failed to serialize event");
            None
        }
    }
}

/// SSE body for one run. Emits a keepalive comment whenever no event arrives
/// within `keepalive` and ends after the terminal event. Dropping the stream
/// before that cancels `cancel`.
pub fn sse_stream(
    mut receiver: EventReceiver,
    keepalive: Duration,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<Bytes, Infallible>> + 'static {
    // Created outside the generator so an unpolled stream still cancels on drop
    let guard = cancel.drop_guard();

    async_stream::stream! {
        let mut guard = Some(guard);

        loop {
            match tokio::time::timeout(keepalive, receiver.recv()).await {
                Ok(Some(event)) => {
                    let terminal = event.kind.is_terminal();
                    if let Some(frame) = encode_frame(&event) {
                        yield Ok(Bytes::from(frame));
                    }
                    if terminal {
                        tracing::debug!(kind = event.kind.as_str(), "Terminal event delivered, closing stream");
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("Event sender dropped, closing stream");
                    break;
                }
                Err(_) => {
                    yield Ok(Bytes::from_static(KEEPALIVE_FRAME.as_bytes()));
                }
            }
        }

        if let Some(guard) = guard.take() {
            guard.disarm();
        }
    }
}
