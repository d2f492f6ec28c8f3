//! HTTP gateway to the assistant backend.
//!
//! Implements the `RemoteApi` trait from `finch-core` over `reqwest`.

pub mod client;
pub mod config;
mod dto;

pub use client::RemoteGateway;
pub use config::GatewayConfig;
