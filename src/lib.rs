//! Harekaze - Chinachu DVR client
//!
//! Request catalog, response decoding and error classification for the
//! Chinachu WUI REST API, plus recording downloads and guide lookups.

pub mod api;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod guide;
pub mod image;
pub mod models;

#[cfg(test)]
mod test_support;

pub use api::ApiRequest;
pub use client::{ChinachuClient, Transport};
pub use config::ClientConfig;
pub use error::ApiError;
