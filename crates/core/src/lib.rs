//! Medusa Storefront Core - Shared types library.
//!
//! This crate provides common types used across the storefront components:
//! - `storefront` - Server-rendered storefront and commerce API client
//! - `cli` - Command-line tools against the commerce API
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for commerce ids, currencies, locales and
//!   price formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
