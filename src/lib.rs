//! Asynchronous client library for the Docker Engine remote API.
//!
//! Remote entities are exposed as handles ([`container::Container`],
//! [`image::Image`], [`exec::Exec`], [`service::Service`]) obtained from
//! their managers on a [`Client`]. Every operation builds one
//! [`transport::Call`] holding the path, method, typed query options and
//! the endpoint's expected-status table, and hands it to the configured
//! [`transport::Transport`], which owns connection management and stream
//! demuxing. Streaming operations (logs, stats, attach, events, exec
//! output) resolve with live byte streams the caller cancels by dropping.
//!
//! No retries, no timeouts, no masking: every daemon answer mapped to an
//! error reason is surfaced exactly once, and unexpected status codes are
//! never silently accepted.

pub mod client;
pub mod container;
pub mod error;
pub mod exec;
pub mod image;
pub mod service;
pub mod transport;

pub use client::Client;
pub use error::Error;
