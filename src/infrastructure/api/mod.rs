//! Care coordination API client.

mod client;
mod dto;

pub use client::ChatApiClient;
