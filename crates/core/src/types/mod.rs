//! Core types for the Slack mail bridge.
//!
//! This module provides type-safe wrappers for Slack identifiers, the
//! user-supplied contact address, and the outbound message.

pub mod address;
pub mod ids;
pub mod message;

pub use address::{AddressError, ContactAddress};
pub use ids::{ChannelId, MessageTs, UserId};
pub use message::{DeliveryResult, MessageKind, MessageOrigin, OriginLocation, OutboundMessage};
