//! Network Module
//!
//! TCP server and client session handling.
//!
//! ## Architecture
//! - Single acceptor thread polling a non-blocking listener
//! - One worker thread per connection, tracked by the registry
//! - Every commit and reply goes through the shared log lock

mod server;
mod connection;
mod registry;
mod session;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use registry::{SessionId, SessionRegistry};
pub use session::{stream_from, Session, SessionOutcome, SessionSettings, SessionState};
