//! # FloorLink Domain
//!
//! Pure types shared by the FloorLink client.
//!
//! This crate contains:
//! - The error enum and `Result` alias
//! - Client credential configuration
//! - The API response envelope
//! - Request-side input types (parameter lists, filters, dispatch requests)
//!
//! ## Architecture
//! - No dependencies on other FloorLink crates
//! - Only external dependencies allowed
//! - No I/O; everything here is plain data

pub mod config;
pub mod envelope;
pub mod errors;
pub mod request;

// Re-export commonly used items
pub use config::*;
pub use envelope::*;
pub use errors::*;
pub use request::*;
