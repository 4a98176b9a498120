//! Business logic services for the bridge.
//!
//! # Services
//!
//! - `email` - Delivery gateway over an SMTP relay
//! - `feedback` - Status reporting back to Slack with DM fallback
//! - `relay` - Interaction handlers tying the pieces together

pub mod email;
pub mod feedback;
pub mod relay;

pub use email::{EmailError, Mailer, SmtpMailer, build_message};
pub use feedback::{FeedbackOutcome, FeedbackReporter, FeedbackTarget};
pub use relay::{Outcome, RelayService};
