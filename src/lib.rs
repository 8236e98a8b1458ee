//! Request-control layer for `reqwest`-based HTTP clients.
//!
//! This crate keeps duplicate and concurrent requests in check: a
//! [`control::AbortRegistry`] cancels a superseded in-flight request when an
//! identical one (same method and URL) is issued, a
//! [`control::RequestSerializer`] releases same-URL requests one at a time
//! through a FIFO queue, and a [`client::HttpClient`] wrapper wires both
//! into every dispatch and completion.
pub mod client;
pub mod control;
pub mod error;
pub mod logger;
