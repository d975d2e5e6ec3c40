//! Chat wire format.

use serde::{Deserialize, Serialize};

use crate::models::null_as_default;

/// Sender tag written on every reply.
pub const AGENT_SENDER: &str = "agent";

/// One chat frame: `{"id", "from", "text", "timestamp"}`.
///
/// Missing and `null` fields decode as empty strings; anything that is not
/// a JSON object of this shape is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
}

impl ChatMessage {
    /// Decode a raw frame. Invalid UTF-8 and invalid JSON both fail.
    pub fn decode(frame: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(frame)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Turn a client message into the agent's answer: sender becomes
    /// [`AGENT_SENDER`], text becomes the canned greeting. A missing id is
    /// generated so every reply can be correlated.
    pub fn into_reply(mut self) -> Self {
        if self.id.is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
        }
        self.from = AGENT_SENDER.to_string();
        self.text = format!("Hello {}", self.text);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_rewrites_sender_and_text() {
        let msg = ChatMessage::decode(br#"{"id":"1","from":"client","text":"hi","timestamp":"T"}"#).unwrap();
        let reply = msg.into_reply();
        assert_eq!(
            reply,
            ChatMessage {
                id: "1".into(),
                from: "agent".into(),
                text: "Hello hi".into(),
                timestamp: "T".into(),
            }
        );
    }

    #[test]
    fn missing_id_is_generated() {
        let reply = ChatMessage::decode(br#"{"text":"yo"}"#).unwrap().into_reply();
        assert!(uuid::Uuid::parse_str(&reply.id).is_ok());
        assert_eq!(reply.text, "Hello yo");
        assert_eq!(reply.timestamp, "");
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let msg = ChatMessage::decode(br#"{"id":"7","from":null,"text":null,"timestamp":null}"#).unwrap();
        assert_eq!(msg.from, "");
        let reply = msg.into_reply();
        assert_eq!(reply.id, "7");
        assert_eq!(reply.text, "Hello ");
    }

    #[test]
    fn malformed_frames_fail_to_decode() {
        let frames: [&[u8]; 5] = [
            b"not json",
            b"\"a string\"",
            b"[1,2]",
            b"{\"text\": 5}",
            &[0xff, 0xfe],
        ];
        for frame in frames {
            assert!(ChatMessage::decode(frame).is_err(), "{:?}", frame);
        }
    }

    #[test]
    fn trailing_whitespace_is_tolerated() {
        assert!(ChatMessage::decode(b"{\"text\":\"hi\"}\r").is_ok());
    }
}
