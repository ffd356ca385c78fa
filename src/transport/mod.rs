//! Session Transport Module
//!
//! Session-keyed request/response exchange with a remote laboratory backend:
//! - Login through a pluggable command sender
//! - XML protocol envelope wrapping and validation
//! - Single in-flight request admission
//! - Working-state and error events for UI listeners

pub mod client;
pub mod command;
pub mod envelope;
pub mod error;
pub mod events;
pub mod session;
pub mod weblab_http;

pub use client::{PendingRequest, SessionTransport, SessionTransportBuilder};
pub use command::{CommandSender, LOGIN_COMMAND};
pub use envelope::PROTOCOL_VERSION;
pub use error::{Rejected, TransportError, TransportResult};
pub use events::{TransportEvent, WorkingState};
pub use session::{Session, SessionStore};
pub use weblab_http::WebLabHttpSender;
