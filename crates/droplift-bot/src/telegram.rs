//! Telegram Bot API client
//!
//! Direct implementation of the three Bot API methods Droplift needs:
//! `getMe`, long-polling `getUpdates` and `sendMessage`.

use crate::dispatcher::InboundMessage;
use crate::error::{BotError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Seconds the server holds a `getUpdates` request open
pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

/// Upper bound on a single request, longer than the long poll it may carry
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 15);

/// Pause after a failed `getUpdates` call
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Telegram Bot API client
pub struct TelegramClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: TELEGRAM_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("Telegram {}", method);

        let response = self.client.post(self.url(method)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let api_response: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            BotError::UnexpectedResponse(format!("{} returned {}: {}", method, status, e))
        })?;

        if !api_response.ok {
            let description = api_response
                .description
                .unwrap_or_else(|| "Unknown error".to_string());
            let code = api_response
                .error_code
                .unwrap_or_else(|| i64::from(status.as_u16()));
            if code == 401 || code == 404 {
                return Err(BotError::Unauthorized(description));
            }
            return Err(BotError::Api { code, description });
        }

        api_response.result.ok_or_else(|| {
            BotError::UnexpectedResponse(format!("{} returned no result", method))
        })
    }

    /// Identify the bot; fails with `Unauthorized` for a bad token
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Fetch updates newer than `offset`, waiting up to `timeout_secs`
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = SendMessageRequest { chat_id, text };
        let _: Message = self.call("sendMessage", &request).await?;
        Ok(())
    }
}

/// Spawn the long-polling loop feeding text messages into `sender`
///
/// The loop ends when `shutdown` fires or the receiving side is dropped.
/// Failed polls are logged and retried after `RETRY_DELAY`.
pub fn spawn_poller(
    client: Arc<TelegramClient>,
    sender: mpsc::Sender<InboundMessage>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut offset = 0;

        loop {
            let polled = tokio::select! {
                _ = shutdown.cancelled() => break,
                polled = client.get_updates(offset, LONG_POLL_TIMEOUT_SECS) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("Failed to fetch updates: {}", e);
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => continue,
                    }
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message.and_then(InboundMessage::from_message) else {
                    continue;
                };
                if sender.send(message).await.is_err() {
                    tracing::debug!("Dispatcher is gone, stopping poller");
                    return;
                }
            }
        }

        tracing::debug!("Poller stopped");
    })
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TelegramClient {
        TelegramClient::new("123:abc")
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_get_me() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/getMe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"id": 42, "is_bot": true, "first_name": "Lift", "username": "lift_bot"}
            })))
            .mount(&mock_server)
            .await;

        let me = client_for(&mock_server).get_me().await.unwrap();
        assert_eq!(me.id, 42);
        assert_eq!(me.username.as_deref(), Some("lift_bot"));
    }

    #[tokio::test]
    async fn test_get_me_with_bad_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/getMe"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).get_me().await.unwrap_err();
        assert!(matches!(err, BotError::Unauthorized(ref d) if d == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_send_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(serde_json::json!({"chat_id": 7, "text": "Done!"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 1, "chat": {"id": 7, "type": "private"}, "text": "Done!"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server).send_message(7, "Done!").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .send_message(7, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Api { code: 400, .. }));
    }

    #[tokio::test]
    async fn test_get_updates_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_json(serde_json::json!({
                "offset": 10,
                "timeout": 0,
                "allowed_updates": ["message"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 7}, "text": "/up"}},
                    {"update_id": 11, "edited_message": {}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let updates = client_for(&mock_server).get_updates(10, 0).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[0].message.as_ref().and_then(|m| m.text.as_deref()),
            Some("/up")
        );
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn test_poller_forwards_text_messages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_json(serde_json::json!({
                "offset": 0,
                "timeout": 30,
                "allowed_updates": ["message"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 5, "message": {"message_id": 1, "chat": {"id": 7}}},
                    {"update_id": 6, "message": {"message_id": 2, "chat": {"id": 7}, "text": "/ping"}}
                ]
            })))
            .mount(&mock_server)
            .await;

        // later polls see nothing new
        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "result": []}))
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&mock_server)
            .await;

        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let handle = spawn_poller(Arc::new(client_for(&mock_server)), tx, shutdown.clone());

        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.chat_id, 7);
        assert_eq!(message.text, "/ping");

        shutdown.cancel();
        handle.await.unwrap();
    }
}
