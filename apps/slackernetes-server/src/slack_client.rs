//! Thin async client for the Slack Web API methods used by slackernetes.
//!
//! Wraps `reqwest::Client` with the bot token for authorization and provides
//! typed methods for the Slack endpoints needed by this application. It is
//! also the production [`ChatOps`] implementation the router replies through.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use slackernetes_core::{ChatOps, CoreError};
use tracing::{debug, warn};

use crate::error::ServerError;

/// Base URL for Slack Web API.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Thin async client for Slack Web API methods used by slackernetes.
///
/// All methods authenticate with the bot token (`xoxb-...`) except
/// [`connections_open`](Self::connections_open) which uses the app-level
/// token (`xapp-...`) passed as a parameter.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient").finish_non_exhaustive()
    }
}

/// Slack response envelope: `ok`, an optional `error`, and method-specific
/// fields flattened into `data`.
#[derive(Debug, Deserialize)]
struct SlackApiResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Deserialize)]
struct NoData {}

#[derive(Debug, Deserialize)]
struct AuthTestData {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageData {
    ts: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadUrlData {
    upload_url: Option<String>,
    file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    user: Option<NamedObject>,
}

#[derive(Debug, Deserialize)]
struct ConversationInfoData {
    channel: Option<NamedObject>,
}

#[derive(Debug, Deserialize)]
struct NamedObject {
    name: String,
}

impl<T> SlackApiResponse<T> {
    /// Converts an `ok: false` response into an error naming the method.
    fn into_result(self, method: &str) -> Result<T, ServerError> {
        if !self.ok {
            let error_msg = self.error.as_deref().unwrap_or("unknown");
            warn!(method, error = error_msg, "Slack API error");
            return Err(ServerError::SlackApi(format!("{method} error: {error_msg}")));
        }
        Ok(self.data)
    }
}

impl SlackClient {
    /// Creates a new Slack Web API client with the given bot token.
    pub fn new(bot_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
        }
    }

    /// Returns the bot's own user ID via `auth.test`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::SlackApi` if the token is rejected or the
    /// response carries no user ID.
    pub async fn auth_test(&self) -> Result<String, ServerError> {
        let data: AuthTestData = self.call_bot_form("auth.test", &[]).await?;
        data.user_id
            .ok_or_else(|| ServerError::SlackApi("auth.test response missing 'user_id'".into()))
    }

    /// Opens a Socket Mode connection and returns the WebSocket URL.
    ///
    /// Uses the app-level token (`xapp-...`) rather than the bot token.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::SlackApi` if the API call fails or returns an error.
    pub async fn connections_open(&self, app_token: &str) -> Result<String, ServerError> {
        debug!("Opening Socket Mode connection");
        let resp = self
            .http
            .post(format!("{SLACK_API_BASE}/apps.connections.open"))
            .bearer_auth(app_token)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|e| {
                ServerError::SlackApi(format!("apps.connections.open request failed: {e}"))
            })?;

        let data: ConnectionsOpenData = parse_response(resp, "apps.connections.open").await?;
        data.url.ok_or_else(|| {
            ServerError::SlackApi("apps.connections.open response missing 'url'".into())
        })
    }

    /// Posts a plain text message to a channel and returns its timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::SlackApi` if the API call fails or returns an error.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<String, ServerError> {
        let body = serde_json::json!({
            "channel": channel,
            "text": text,
        });
        debug!(channel, "Posting message");
        let data: PostMessageData = self.call_bot_json("chat.postMessage", &body).await?;
        data.ts
            .ok_or_else(|| ServerError::SlackApi("chat.postMessage response missing 'ts'".into()))
    }

    /// Uploads a text file to a channel with an initial comment.
    ///
    /// Follows Slack's external upload flow: reserve an upload URL, send the
    /// bytes there, then complete the upload into the channel.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::SlackApi` if any of the three steps fails.
    pub async fn upload_file(
        &self,
        channel: &str,
        initial_comment: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), ServerError> {
        let length = content.len().to_string();
        let reserved: UploadUrlData = self
            .call_bot_form(
                "files.getUploadURLExternal",
                &[("filename", filename), ("length", &length)],
            )
            .await?;
        let (Some(upload_url), Some(file_id)) = (reserved.upload_url, reserved.file_id) else {
            return Err(ServerError::SlackApi(
                "files.getUploadURLExternal response missing 'upload_url' or 'file_id'".into(),
            ));
        };

        debug!(channel, filename, bytes = content.len(), "Uploading file");
        self.http
            .post(&upload_url)
            .body(content.to_owned())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServerError::SlackApi(format!("file upload failed: {e}")))?;

        let files = serde_json::json!([{ "id": file_id, "title": filename }]).to_string();
        let _: NoData = self
            .call_bot_form(
                "files.completeUploadExternal",
                &[
                    ("files", files.as_str()),
                    ("channel_id", channel),
                    ("initial_comment", initial_comment),
                ],
            )
            .await?;
        Ok(())
    }

    /// Resolves a user ID to the user's handle via `users.info`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::SlackApi` if the lookup fails.
    pub async fn user_name(&self, user_id: &str) -> Result<String, ServerError> {
        let data: UserInfoData = self.call_bot_form("users.info", &[("user", user_id)]).await?;
        data.user
            .map(|u| u.name)
            .ok_or_else(|| ServerError::SlackApi("users.info response missing 'user'".into()))
    }

    /// Resolves a channel ID to its name via `conversations.info`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::SlackApi` if the lookup fails.
    pub async fn channel_name(&self, channel_id: &str) -> Result<String, ServerError> {
        let data: ConversationInfoData = self
            .call_bot_form("conversations.info", &[("channel", channel_id)])
            .await?;
        data.channel.map(|c| c.name).ok_or_else(|| {
            ServerError::SlackApi("conversations.info response missing 'channel'".into())
        })
    }

    /// Sends a JSON POST request to a Slack Web API method using the bot token.
    async fn call_bot_json<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, ServerError> {
        let resp = self
            .http
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ServerError::SlackApi(format!("{method} request failed: {e}")))?;
        parse_response(resp, method).await
    }

    /// Sends a form-encoded POST request to a Slack Web API method using the
    /// bot token. Read methods such as `users.info` only accept this form.
    async fn call_bot_form<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ServerError> {
        let resp = self
            .http
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(&self.bot_token)
            .form(params)
            .send()
            .await
            .map_err(|e| ServerError::SlackApi(format!("{method} request failed: {e}")))?;
        parse_response(resp, method).await
    }
}

/// Decodes a Slack response body and checks its `ok` flag.
async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    method: &str,
) -> Result<T, ServerError> {
    let api_resp: SlackApiResponse<T> = resp
        .json()
        .await
        .map_err(|e| ServerError::SlackApi(format!("{method} response parse failed: {e}")))?;
    api_resp.into_result(method)
}

impl ChatOps for SlackClient {
    async fn post_text(&self, channel: &str, text: &str) -> Result<(), CoreError> {
        self.post_message(channel, text).await?;
        Ok(())
    }

    async fn post_file(
        &self,
        channel: &str,
        initial_comment: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), CoreError> {
        Ok(self
            .upload_file(channel, initial_comment, filename, content)
            .await?)
    }

    async fn user_name(&self, user_id: &str) -> Result<String, CoreError> {
        Ok(SlackClient::user_name(self, user_id).await?)
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, CoreError> {
        Ok(SlackClient::channel_name(self, channel_id).await?)
    }
}
