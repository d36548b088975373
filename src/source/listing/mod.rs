//! Unauthenticated paged playlist listing.

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, ListingClient};
