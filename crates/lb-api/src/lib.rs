//! lb-api: HTTP API layer for the Liquidity Book SDK
//!
//! Exposes bin math, liquidity shapes, route discovery and best-trade
//! quoting over a small JSON API.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, StateError};
