//! # BeHonest Core
//!
//! The domain layer of BeHonest.
//! Entities, form validation rules and the ports that infrastructure implements.
//! This crate has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod ports;

pub use error::{DomainError, RepoError};
