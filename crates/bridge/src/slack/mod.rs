//! Slack integration for the support-email bridge.
//!
//! This module provides:
//! - [`SignatureVerifier`] gating every inbound webhook
//! - [`SlackApi`] and its HTTP implementation [`SlackClient`]
//! - Block Kit and interaction payload types
//! - The support-form modal and status texts
//!
//! # Flow
//!
//! 1. Slack calls the webhook; the signature is verified
//! 2. `/email` opens the support form
//! 3. The form submission, or a message shortcut, is emailed to support
//! 4. The user is told whether it worked, in place or by DM

mod client;
mod error;
pub mod messages;
mod signature;
mod types;

pub(crate) use client::REQUEST_TIMEOUT;
pub use client::{SlackApi, SlackClient};
pub use error::SlackError;
pub use signature::{
    REPLAY_WINDOW_SECS, RejectReason, SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER,
    Verification,
};
pub use types::{
    ApiResponse, Block, ContextElement, ConversationRef, InputElement, InputValue,
    InteractionChannel, InteractionTeam, InteractionUser, MessageShortcut, PlainText,
    PostMessageResponse, ShortcutMessage, SlackUser, SlashCommand, SubmittedView, UserProfile,
    View, ViewState, ViewSubmission,
};
