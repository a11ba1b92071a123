//! HiredWithAndi Core - Shared types library.
//!
//! This crate provides common types used across the console components:
//! - `console` - Session & access controller for the admin console
//! - `cli` - Command-line client for the console
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, the
//!   [`types::Role`] enum, and the persisted [`types::Session`] record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
