//! REST implementation of the chat transport.
//!
//! Endpoint selection follows the credential: a held token routes sends to
//! the persistent `/api/chat` endpoint with a bearer header, otherwise the
//! public endpoint is used. Response shapes are decoded into the
//! [`SendResponse`] tagged union here, at the boundary, so the engine never
//! sees optional-field fallback chains.

use crate::identity::CredentialStore;
use async_trait::async_trait;
use procqa_core::text::FALLBACK_REPLY;
use procqa_core::transport::{ChatTransport, ConversationRecord, HistoryResponse, SendResponse};
use procqa_core::{ProcqaError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequestWire<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PublicChatRequestWire<'a> {
    question: &'a str,
}

/// Raw send response; which optional fields are present depends on the
/// endpoint. Older backend revisions used `answer`, newer ones `response`.
#[derive(Debug, Deserialize)]
struct SendResponseWire {
    #[serde(default)]
    conversation: Option<ConversationRecord>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

fn decode_send(wire: SendResponseWire) -> SendResponse {
    if let Some(conversation) = wire.conversation {
        return SendResponse::Conversation(conversation);
    }
    let reply = wire
        .response
        .or(wire.answer)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());
    SendResponse::Reply { reply }
}

/// `ChatTransport` over the procqa REST backend.
pub struct HttpChatTransport {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
}

impl HttpChatTransport {
    /// Creates a transport against `base_url` using the shared credential
    /// holder for bearer authentication.
    pub fn new(base_url: impl Into<String>, credentials: CredentialStore) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_error_body(response: reqwest::Response) -> String {
        response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string())
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn fetch_history(&self) -> Result<HistoryResponse> {
        let token = self
            .credentials
            .token()
            .ok_or_else(|| ProcqaError::credential("history requires a credential"))?;

        let response = self
            .client
            .get(self.url("/api/chat/history"))
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProcqaError::transport(format!("history request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::read_error_body(response).await;
            return Err(ProcqaError::transport(format!(
                "history API error ({status}): {body}"
            )));
        }

        response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| ProcqaError::transport(format!("failed to parse history response: {e}")))
    }

    async fn send_message(
        &self,
        content: &str,
        conversation_id: Option<&str>,
    ) -> Result<SendResponse> {
        let request_id = Uuid::new_v4();
        let token = self.credentials.token();

        let request = match &token {
            Some(token) => {
                tracing::debug!(%request_id, continuing = conversation_id.is_some(), "sending via persistent chat endpoint");
                self.client
                    .post(self.url("/api/chat"))
                    .bearer_auth(token)
                    .json(&ChatRequestWire {
                        message: content,
                        conversation_id,
                    })
            }
            None => {
                tracing::debug!(%request_id, "sending via public chat endpoint");
                self.client
                    .post(self.url("/api/chat/public"))
                    .json(&PublicChatRequestWire { question: content })
            }
        };

        let response = request
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProcqaError::transport(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::read_error_body(response).await;
            return Err(ProcqaError::transport(format!(
                "chat API error ({status}): {body}"
            )));
        }

        let wire = response
            .json::<SendResponseWire>()
            .await
            .map_err(|e| ProcqaError::transport(format!("failed to parse chat response: {e}")))?;
        Ok(decode_send(wire))
    }

    async fn delete_conversation(&self, id: &str) -> Result<()> {
        let mut request = self
            .client
            .delete(self.url(&format!("/api/chat/conversations/{id}")))
            .timeout(REQUEST_TIMEOUT);
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProcqaError::transport(format!("delete request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::read_error_body(response).await;
            return Err(ProcqaError::transport(format!(
                "delete API error ({status}): {body}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> SendResponseWire {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_full_conversation_wins() {
        let decoded = decode_send(wire(
            r#"{
                "response": "ignored",
                "conversation": {
                    "id": "64f1a2b3c4d5e6f708192aab",
                    "title": "Quy trình",
                    "messages": [],
                    "created_at": "2025-01-01T00:00:00Z",
                    "updated_at": "2025-01-01T00:00:00Z"
                }
            }"#,
        ));
        assert!(matches!(decoded, SendResponse::Conversation(record) if record.title == "Quy trình"));
    }

    #[test]
    fn test_decode_prefers_response_over_answer() {
        let decoded = decode_send(wire(r#"{"response": "a", "answer": "b"}"#));
        assert_eq!(decoded, SendResponse::Reply { reply: "a".to_string() });
    }

    #[test]
    fn test_decode_falls_back_to_answer() {
        let decoded = decode_send(wire(r#"{"answer": "Chào bạn!"}"#));
        assert_eq!(
            decoded,
            SendResponse::Reply {
                reply: "Chào bạn!".to_string()
            }
        );
    }

    #[test]
    fn test_decode_empty_body_yields_fixed_apology() {
        let decoded = decode_send(wire("{}"));
        assert_eq!(
            decoded,
            SendResponse::Reply {
                reply: FALLBACK_REPLY.to_string()
            }
        );
    }

    #[test]
    fn test_decode_blank_reply_yields_fixed_apology() {
        let decoded = decode_send(wire(r#"{"response": "   "}"#));
        assert_eq!(
            decoded,
            SendResponse::Reply {
                reply: FALLBACK_REPLY.to_string()
            }
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let transport =
            HttpChatTransport::new("http://localhost:5000/", CredentialStore::new());
        assert_eq!(transport.url("/api/chat"), "http://localhost:5000/api/chat");
    }

    #[test]
    fn test_continuation_id_omitted_from_wire_when_absent() {
        let body = serde_json::to_value(ChatRequestWire {
            message: "A",
            conversation_id: None,
        })
        .unwrap();
        assert!(body.get("conversation_id").is_none());
    }
}
