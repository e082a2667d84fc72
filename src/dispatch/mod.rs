//! Command Dispatch
//!
//! The serial request/response core of the bridge: topic routing, the
//! dispatch loop, and the startup glue that wires bus endpoints and backend
//! together on a dedicated worker thread.

mod route;
mod service;
mod worker;

pub use route::{TopicClass, classify, request_token};
pub use service::Bridge;
pub use worker::{DispatchWorker, Outcome, SUCCESS_PAYLOAD};
