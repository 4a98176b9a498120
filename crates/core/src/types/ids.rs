//! Newtype identifiers for Slack entities.
//!
//! Slack identifies users, channels, and messages with opaque strings. The
//! `define_slack_id!` macro wraps each in its own type so a user id can never
//! be passed where a channel id is expected.

/// Macro to define a type-safe Slack identifier wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()`, `Display`, `AsRef<str>`, `From<String>`/`From<&str>`
///
/// # Example
///
/// ```rust
/// # use slack_mailbridge_core::define_slack_id;
/// define_slack_id!(TeamId);
///
/// let team = TeamId::new("T0123");
/// assert_eq!(team.as_str(), "T0123");
/// ```
#[macro_export]
macro_rules! define_slack_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw Slack identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_slack_id!(UserId);
define_slack_id!(ChannelId);
define_slack_id!(MessageTs);

impl ChannelId {
    /// Whether this is a direct-message conversation.
    ///
    /// Slack prefixes IM conversation ids with `D`. Thread replies are not
    /// available in these conversations.
    #[must_use]
    pub fn is_direct_message(&self) -> bool {
        self.0.starts_with('D')
    }
}

impl MessageTs {
    /// Permalink path fragment for this message: `p` followed by the
    /// timestamp with the dot removed (`1712345678.000200` -> `p1712345678000200`).
    #[must_use]
    pub fn permalink_fragment(&self) -> String {
        let digits: String = self.0.chars().filter(|c| *c != '.').collect();
        format!("p{digits}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_message_detection() {
        assert!(ChannelId::new("D024BE91L").is_direct_message());
        assert!(!ChannelId::new("C024BE91L").is_direct_message());
        assert!(!ChannelId::new("G024BE91L").is_direct_message());
    }

    #[test]
    fn test_permalink_fragment() {
        let ts = MessageTs::new("1712345678.000200");
        assert_eq!(ts.permalink_fragment(), "p1712345678000200");
    }

    #[test]
    fn test_serde_transparent() {
        let user = UserId::new("U123");
        assert_eq!(serde_json::to_string(&user).expect("serialize"), "\"U123\"");
        let parsed: UserId = serde_json::from_str("\"U123\"").expect("deserialize");
        assert_eq!(parsed, user);
    }
}
