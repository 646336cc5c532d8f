//! BKG Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging, and checksum utilities for the BKG
//! workspace.
//!
//! # Overview
//!
//! This crate provides the ambient functionality used across all BKG
//! workspace members:
//!
//! - **Error Handling**: Custom error type and result alias
//! - **Logging**: Centralized tracing initialization
//! - **Checksums**: Payload digest utilities for download traceability
//!
//! # Example
//!
//! ```no_run
//! use bkg_common::{Result, checksum};
//!
//! fn digest_payload(payload: &[u8]) -> Result<()> {
//!     let digest = checksum::sha256_hex(payload);
//!     println!("Payload digest: {}", digest);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{BkgError, Result};
