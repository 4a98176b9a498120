//! Slack Web API client.
//!
//! Looks up users, opens modals, opens DM conversations and posts messages.
//! Handlers talk to Slack through the [`SlackApi`] trait so tests can swap in
//! an in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use slack_mailbridge_core::{ChannelId, MessageTs, UserId};
use tracing::{debug, error, instrument};

use super::error::SlackError;
use super::types::{
    ApiResponse, ConversationsOpenResponse, OpenViewResponse, PostMessageResponse, SlackUser,
    UserInfoResponse, View,
};

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Timeout applied to every Web API call.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The Slack operations the bridge needs.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Look up a user's profile (`users.info`).
    async fn user_info(&self, user: &UserId) -> Result<SlackUser, SlackError>;

    /// Open a modal for a trigger (`views.open`).
    async fn open_view(&self, trigger_id: &str, view: &View) -> Result<(), SlackError>;

    /// Post a plain-text message (`chat.postMessage`).
    ///
    /// `channel` may be a conversation id or a user id. With `thread_ts` the
    /// message is posted as a thread reply.
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&MessageTs>,
    ) -> Result<PostMessageResponse, SlackError>;

    /// Open, or reuse, the bot's DM with a user (`conversations.open`).
    async fn open_direct_message(&self, user: &UserId) -> Result<ChannelId, SlackError>;
}

/// Slack API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    bot_token: SecretString,
    /// API base URL, without trailing slash.
    base_url: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("bot_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Create a new Slack client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(bot_token: SecretString) -> Result<Self, SlackError> {
        Self::with_base_url(bot_token, SLACK_API_BASE)
    }

    /// Create a client against a different API host.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(
        bot_token: SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, SlackError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Config(e.to_string()))?;

        Ok(Self {
            client,
            bot_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn post(&self, method: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
    }

    /// Send a request and unwrap the `ok`/`error` envelope.
    async fn call<T>(&self, method: &str, request: RequestBuilder) -> Result<T, SlackError>
    where
        T: DeserializeOwned + ApiResponse,
    {
        let result: T = request.send().await?.json().await?;

        if !result.ok() {
            let code = result.error().unwrap_or("unknown_error").to_string();
            error!(method, error = %code, "Slack API error");
            return Err(SlackError::Api(code));
        }

        Ok(result)
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    #[instrument(skip(self), fields(user = %user))]
    async fn user_info(&self, user: &UserId) -> Result<SlackUser, SlackError> {
        let request = self.post("users.info").form(&[("user", user.as_str())]);
        let response: UserInfoResponse = self.call("users.info", request).await?;

        response
            .user
            .ok_or_else(|| SlackError::Response("users.info returned no user".to_string()))
    }

    #[instrument(skip(self, trigger_id, view), fields(callback_id = %view.callback_id))]
    async fn open_view(&self, trigger_id: &str, view: &View) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct OpenView<'a> {
            trigger_id: &'a str,
            view: &'a View,
        }

        let request = self.post("views.open").json(&OpenView { trigger_id, view });
        let _: OpenViewResponse = self.call("views.open", request).await?;

        debug!("Modal opened");
        Ok(())
    }

    #[instrument(skip(self, text), fields(channel = %channel, thread_ts = ?thread_ts))]
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&MessageTs>,
    ) -> Result<PostMessageResponse, SlackError> {
        #[derive(Serialize)]
        struct PostMessage<'a> {
            channel: &'a str,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            thread_ts: Option<&'a str>,
        }

        let message = PostMessage {
            channel,
            text,
            thread_ts: thread_ts.map(MessageTs::as_str),
        };

        let request = self.post("chat.postMessage").json(&message);
        let result: PostMessageResponse = self.call("chat.postMessage", request).await?;

        debug!(
            ts = ?result.ts,
            channel = ?result.channel,
            "Message posted to Slack"
        );

        Ok(result)
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn open_direct_message(&self, user: &UserId) -> Result<ChannelId, SlackError> {
        #[derive(Serialize)]
        struct OpenConversation<'a> {
            users: &'a str,
        }

        let request = self.post("conversations.open").json(&OpenConversation {
            users: user.as_str(),
        });
        let response: ConversationsOpenResponse =
            self.call("conversations.open", request).await?;

        response
            .channel
            .map(|c| c.id)
            .ok_or_else(|| SlackError::Response("conversations.open returned no channel".to_string()))
    }
}
