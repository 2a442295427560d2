//! Fairway Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging, and identity utilities for the Fairway
//! workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all Fairway
//! workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing configuration
//! - **Slugs**: Natural-key derivation from business and city names
//!
//! # Example
//!
//! ```
//! use fairway_common::slug::slugify;
//!
//! assert_eq!(slugify("Par Tee Golf"), "par-tee-golf");
//! ```

pub mod error;
pub mod logging;
pub mod slug;

// Re-export commonly used types
pub use error::{FairwayError, Result};
