//! Credentialed playlist listing via the YouTube Data API.

pub mod dto;
mod adapter;
mod client;

pub use client::{DataApiClient, DEFAULT_BASE_URL, MAX_PAGE_SIZE};
