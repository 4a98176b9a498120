//! Slack Mail Bridge Core - Domain types and message composition.
//!
//! This crate provides the types shared by the bridge server, the CLI, and
//! the integration tests.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no SMTP. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Slack ids, contact addresses, and outbound messages
//! - [`compose`] - The notification composer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod compose;
pub mod types;

pub use compose::{ComposeError, Composer, Interaction};
pub use types::*;
