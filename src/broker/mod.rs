//! Cross-context request/response bridge
//!
//! The page context and the worker context each run their own flow of
//! control; the broker is the only path between them. State crosses by value
//! as serialized messages, waits are bounded, and every recognized request
//! gets exactly one terminal reply.

pub mod channel;
pub mod protocol;
pub mod worker;

pub use channel::{channel, Broker, Envelope, Responder, RESPONSE_TIMEOUT};
pub use protocol::{BrokerRequest, BrokerResponse};
pub use worker::TransformWorker;
