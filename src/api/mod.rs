//! Controller API: endpoint definitions, transports and the two clients.

pub mod blocking;
pub mod client;
pub mod endpoints;
pub mod pipeline;
pub mod request;
pub mod transport;

pub use blocking::SyncClient;
pub use client::AsyncClient;
pub use endpoints::DelayTest;
pub use request::{ApiRequest, Method, RawResponse};
pub use transport::{AsyncTransport, BlockingTransport, HttpTransport, Transport};
