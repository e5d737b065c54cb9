//! # BeHonest Shared
//!
//! JSON payloads exchanged with clients (the like button script, health probes).

pub mod dto;
pub mod response;

pub use response::ApiResponse;
