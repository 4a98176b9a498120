//! Slack wire types.
//!
//! A subset of Block Kit needed for the support-form modal, the inbound
//! interaction payloads the bridge handles, and Web API responses.
//!
//! See: <https://api.slack.com/block-kit> and
//! <https://api.slack.com/interactivity/handling#payloads>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slack_mailbridge_core::{ChannelId, MessageTs, UserId};

// =============================================================================
// Block Kit
// =============================================================================

/// A modal view, as passed to `views.open`.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    /// Always `"modal"`.
    #[serde(rename = "type")]
    pub view_type: &'static str,
    /// Identifies the view in the `view_submission` payload.
    pub callback_id: String,
    /// Modal title.
    pub title: PlainText,
    /// Submit button label.
    pub submit: PlainText,
    /// Close button label.
    pub close: PlainText,
    /// Modal body.
    pub blocks: Vec<Block>,
}

/// Block Kit block types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Context block with small muted text.
    Context { elements: Vec<ContextElement> },
    /// Input block wrapping a single form element.
    Input {
        block_id: String,
        label: PlainText,
        element: InputElement,
    },
}

/// Plain text object.
#[derive(Debug, Clone, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    /// Create a new plain text object.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Context block elements.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    /// Markdown text in context.
    Mrkdwn { text: String },
}

/// Input block elements.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    /// Single or multi-line text box.
    PlainTextInput {
        action_id: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        multiline: bool,
        placeholder: PlainText,
    },
}

// =============================================================================
// Inbound payloads
// =============================================================================

/// Slash command invocation (form-encoded fields).
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommand {
    /// The command, including the leading slash (e.g. `/email`).
    pub command: String,
    /// Text typed after the command.
    #[serde(default)]
    pub text: Option<String>,
    /// Invoking user.
    pub user_id: UserId,
    /// Invoking user's handle.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Channel the command was run in.
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Short-lived id for opening a modal.
    pub trigger_id: String,
}

/// User attached to an interaction payload.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    /// Slack user ID.
    pub id: UserId,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl InteractionUser {
    /// Best name available in the payload itself.
    #[must_use]
    pub fn handle(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Channel where an interaction occurred.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    /// Channel ID.
    pub id: ChannelId,
    /// Channel name (`directmessage` for DMs).
    #[serde(default)]
    pub name: Option<String>,
}

/// Workspace an interaction occurred in.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionTeam {
    /// Team ID.
    pub id: String,
    /// Workspace subdomain (`acme` in `acme.slack.com`).
    #[serde(default)]
    pub domain: Option<String>,
}

/// `view_submission` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmission {
    /// User who submitted the modal.
    pub user: InteractionUser,
    /// The submitted view.
    pub view: SubmittedView,
}

impl ViewSubmission {
    /// Value typed into input `action_id` of block `block_id`.
    #[must_use]
    pub fn input_value(&self, block_id: &str, action_id: &str) -> Option<&str> {
        self.view
            .state
            .values
            .get(block_id)?
            .get(action_id)?
            .value
            .as_deref()
    }
}

/// View state as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedView {
    /// Callback id set when the view was opened.
    #[serde(default)]
    pub callback_id: Option<String>,
    /// Input values keyed by block id then action id.
    pub state: ViewState,
}

/// Input values of a submitted view.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, InputValue>>,
}

/// A single submitted input.
#[derive(Debug, Clone, Deserialize)]
pub struct InputValue {
    #[serde(default)]
    pub value: Option<String>,
}

/// `message_action` payload (message shortcut).
#[derive(Debug, Clone, Deserialize)]
pub struct MessageShortcut {
    /// Shortcut callback id.
    #[serde(default)]
    pub callback_id: Option<String>,
    /// User who invoked the shortcut.
    pub user: InteractionUser,
    /// Channel containing the message.
    pub channel: InteractionChannel,
    /// Workspace.
    #[serde(default)]
    pub team: Option<InteractionTeam>,
    /// The message the shortcut was invoked on.
    pub message: ShortcutMessage,
}

/// Message a shortcut was invoked on.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortcutMessage {
    /// Message timestamp (unique ID within the channel).
    pub ts: MessageTs,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Author, absent for bot messages.
    #[serde(default)]
    pub user: Option<UserId>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Common shape of every Web API response.
pub trait ApiResponse {
    /// Whether the call succeeded.
    fn ok(&self) -> bool;
    /// Error code when it did not.
    fn error(&self) -> Option<&str>;
}

macro_rules! impl_api_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn ok(&self) -> bool {
                    self.ok
                }

                fn error(&self) -> Option<&str> {
                    self.error.as_deref()
                }
            }
        )*
    };
}

impl_api_response!(
    PostMessageResponse,
    OpenViewResponse,
    UserInfoResponse,
    ConversationsOpenResponse,
);

/// Response from `chat.postMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID where message was posted.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique ID).
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `views.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenViewResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `users.info`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoResponse {
    pub ok: bool,
    #[serde(default)]
    pub user: Option<SlackUser>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `conversations.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationsOpenResponse {
    pub ok: bool,
    #[serde(default)]
    pub channel: Option<ConversationRef>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Conversation reference returned by `conversations.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRef {
    pub id: ChannelId,
}

/// User object from `users.info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

/// Profile fields of a user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SlackUser {
    /// Human-facing name: real name first, then profile names, then handle.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        let profile = self.profile.as_ref();
        [
            self.real_name.as_deref(),
            profile.and_then(|p| p.real_name.as_deref()),
            profile.and_then(|p| p.display_name.as_deref()),
            self.name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
    }
}
