//! HTTP transport implementation
//!
//! A reqwest client implementing the [`Transport`](crate::Transport) trait.
//! It sends each request once; retries happen in the executor.

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
