//! Full-duplex byte relay.
//!
//! A [`Relay`] takes two established connections, copies bytes between them
//! in both directions on two tasks, and returns once both directions have
//! ended. What happens to the connections when a direction ends is chosen
//! with [`ClosePolicy`]; the default half-closes the destination so the
//! opposite peer learns there is nothing more coming.
//!
//! ```no_run
//! # async fn proxy(client: tokio::net::TcpStream) -> Result<(), splicer::error::Box> {
//! let backend = tokio::net::TcpStream::connect("127.0.0.1:8080").await?;
//! let report = splicer::join(client, backend).await;
//! log::info!("relayed {} bytes upstream", report.near_to_far.bytes);
//! # Ok(())
//! # }
//! ```
//!
//! Anything that is not already a single duplex stream can be paired up with
//! [`AsyncRW`], e.g. relaying the process's stdin/stdout to a socket:
//!
//! ```no_run
//! # async fn cat(addr: &str) -> Result<(), splicer::error::Box> {
//! let console = splicer::AsyncRW::new(tokio::io::stdin(), tokio::io::stdout());
//! let socket = tokio::net::TcpStream::connect(addr).await?;
//! splicer::join(console, socket).await;
//! # Ok(())
//! # }
//! ```
//!
//! The relay sets no deadlines of its own unless asked to via
//! [`Config::with_idle_timeout`]; a session whose peers never hang up runs
//! until one of them does, the caller uses the session's [`Closer`], or the
//! `run` future is dropped. A closed session gives each destination at most
//! [`CLOSE_GRACE`] to accept its shutdown.

mod asyncrw;
mod closer;
mod config;
mod direction;
pub mod error;
mod relay;
mod tunnel;

pub use asyncrw::AsyncRW;
pub use closer::Closer;
pub use config::{ClosePolicy, Config, DEFAULT_BUFFER_SIZE};
pub use direction::{Direction, End, Transfer, CLOSE_GRACE};
pub use relay::{Connection, Finished, Relay, Report};
pub use tunnel::{join, join_with};
