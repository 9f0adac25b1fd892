//! Typed client for the Clash / mihomo external controller API.
//!
//! Two clients share one set of endpoint definitions: [`SyncClient`] blocks
//! the calling thread, [`AsyncClient`] runs on tokio. Both send
//! `Authorization: Bearer <token>` with every request.
//!
//! ```no_run
//! # async fn run() -> clash_capi::Result<()> {
//! let client = clash_capi::AsyncClient::new("http://127.0.0.1:9090", "secret")?;
//! for selector in client.get_selectors().await? {
//!     println!("{} -> {:?}", selector.proxy().name, selector.proxy().now);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
#[cfg(feature = "daemon")]
pub mod service;

pub use api::{AsyncClient, DelayTest, SyncClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
