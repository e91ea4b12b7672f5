//! Transform worker context
//!
//! A dedicated thread owning the dashboard-to-document transform. It drains
//! its inbox until the page side hangs up, producing exactly one terminal
//! reply per recognized request. Requests it cannot decode are dropped
//! without a reply; the sender observes that as a broker failure.

use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::channel::{channel, Broker, Envelope};
use super::protocol::BrokerRequest;
use crate::convert;
use crate::error::{ExportError, ExportResult};

/// How a dispatched request left the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A terminal reply was produced
    Replied,
    /// The request was not recognized; its reply slot was dropped unanswered
    Ignored,
}

/// Handle of the spawned worker context
pub struct TransformWorker {
    handle: JoinHandle<()>,
}

impl TransformWorker {
    /// Spawns the worker context and returns the page-side broker handle.
    ///
    /// The worker exits once every broker clone is dropped.
    pub fn spawn() -> ExportResult<(Broker, TransformWorker)> {
        let (broker, inbox) = channel();
        let handle = thread::Builder::new()
            .name("transform-worker".into())
            .spawn(move || run(inbox))
            .map_err(|e| ExportError::Broker(format!("failed to spawn transform worker: {e}")))?;

        Ok((broker, TransformWorker { handle }))
    }

    /// Waits for the worker to drain and exit
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

fn run(inbox: Receiver<Envelope>) {
    while let Ok(envelope) = inbox.recv() {
        if dispatch(envelope) == Disposition::Ignored {
            warn!("dropped unrecognized broker request");
        }
    }
    debug!("transform worker shutting down");
}

/// Decodes and handles one request
pub fn dispatch(envelope: Envelope) -> Disposition {
    let (payload, responder) = envelope.into_parts();

    let request = match serde_json::from_str::<BrokerRequest>(&payload) {
        Ok(request) => request,
        Err(err) => {
            debug!(%err, "request did not decode");
            return Disposition::Ignored;
        }
    };

    match request {
        BrokerRequest::ExportDashboard { dashboard_data } => {
            match convert::dashboard_to_yaml(&dashboard_data) {
                Ok(yaml) => responder.fulfill(yaml),
                Err(err) => responder.reject(err.to_string()),
            }
            Disposition::Replied
        }
    }
}
