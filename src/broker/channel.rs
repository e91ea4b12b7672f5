//! Bounded-wait request/response channel
//!
//! Bridges the page context and the worker context. A request is serialized,
//! sent with a fresh reply slot, and the sender suspends for at most
//! [`RESPONSE_TIMEOUT`]. The reply slot (`Responder`) is consumed by value,
//! so a request can receive at most one terminal reply; dropping it
//! unanswered surfaces as a broker failure on the sending side.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::warn;

use super::protocol::{BrokerRequest, BrokerResponse};
use crate::error::{ExportError, ExportResult};

/// Bounded wait for a worker round-trip
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// A serialized request together with its reply slot
pub struct Envelope {
    pub(crate) payload: String,
    pub(crate) responder: Responder,
}

impl Envelope {
    pub fn into_parts(self) -> (String, Responder) {
        (self.payload, self.responder)
    }
}

/// Write-once reply slot for a single request.
///
/// Consumed by value: exactly one terminal reply is possible. Holding the
/// responder (without replying yet) is the explicit "reply will come later"
/// marker; dropping it unanswered closes the request without a reply.
pub struct Responder {
    tx: Sender<String>,
}

impl Responder {
    pub(crate) fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }

    pub fn fulfill(self, data: impl Into<String>) {
        self.reply(BrokerResponse::success(data));
    }

    pub fn reject(self, message: impl Into<String>) {
        self.reply(BrokerResponse::error(message));
    }

    pub fn reply(self, response: BrokerResponse) {
        let payload = match serde_json::to_string(&response) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "failed to encode broker response");
                return;
            }
        };
        // the sender may have timed out and gone away
        let _ = self.tx.send(payload);
    }
}

/// Page-side handle of the bridge
#[derive(Clone)]
pub struct Broker {
    tx: Sender<Envelope>,
    timeout: Duration,
}

impl Broker {
    /// Shortens the bounded wait (tests)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends one request and suspends until its reply or the bounded wait
    /// elapses.
    pub fn send(&self, request: &BrokerRequest) -> ExportResult<BrokerResponse> {
        let payload = serde_json::to_string(request)
            .map_err(|e| ExportError::Broker(format!("failed to encode request: {e}")))?;

        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Envelope {
                payload,
                responder: Responder::new(reply_tx),
            })
            .map_err(|_| ExportError::Broker("transform channel is closed".into()))?;

        let raw = match reply_rx.recv_timeout(self.timeout) {
            Ok(raw) => raw,
            Err(RecvTimeoutError::Timeout) => {
                return Err(ExportError::Timeout(format!(
                    "no response from transform worker within {}s",
                    self.timeout.as_secs()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(ExportError::Broker(
                    "no response from transform worker".into(),
                ))
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| ExportError::Broker(format!("failed to decode response: {e}")))
    }
}

/// Creates a connected bridge: the page-side broker and the worker-side inbox
pub fn channel() -> (Broker, Receiver<Envelope>) {
    let (tx, rx) = mpsc::channel();
    (
        Broker {
            tx,
            timeout: RESPONSE_TIMEOUT,
        },
        rx,
    )
}
