//! Structured email fields used to chain lookup and reply actions.

use serde::{Deserialize, Serialize};

/// Fields identifying an email, as reported by the email assistant.
///
/// Built per lookup and never persisted beyond the workflow that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReference {
    pub message_id: String,
    pub thread_id: String,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub in_reply_to: Option<String>,
    pub subject: String,
    pub body: String,
    pub sender: String,
}

impl EmailReference {
    /// Message id a reply should point at: `in_reply_to` when known, else `message_id`.
    pub fn reply_target_id(&self) -> &str {
        self.in_reply_to
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.message_id)
    }

    /// JSON Schema used to request this shape as structured model output.
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message_id": { "type": "string", "description": "The message ID of the email" },
                "thread_id": { "type": "string", "description": "The thread ID of the email" },
                "references": { "type": ["string", "null"], "description": "The references of the email" },
                "in_reply_to": { "type": ["string", "null"], "description": "The in-reply-to of the email" },
                "subject": { "type": "string", "description": "The subject of the email" },
                "body": { "type": "string", "description": "The body of the email" },
                "sender": { "type": "string", "description": "The sender of the email" },
            },
            "required": [
                "message_id", "thread_id", "references", "in_reply_to", "subject", "body", "sender"
            ],
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(in_reply_to: Option<&str>) -> EmailReference {
        EmailReference {
            message_id: "<m1@mail>".into(),
            thread_id: "t1".into(),
            references: None,
            in_reply_to: in_reply_to.map(Into::into),
            subject: "Hello".into(),
            body: "Hi".into(),
            sender: "moe@picaos.com".into(),
        }
    }

    #[test]
    fn reply_target_prefers_in_reply_to() {
        assert_eq!(reference(Some("<parent@mail>")).reply_target_id(), "<parent@mail>");
        assert_eq!(reference(None).reply_target_id(), "<m1@mail>");
        assert_eq!(reference(Some("")).reply_target_id(), "<m1@mail>");
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let parsed: EmailReference = serde_json::from_str(
            r#"{"message_id":"m","thread_id":"t","subject":"s","body":"b","sender":"x@y.com"}"#,
        )
        .unwrap();
        assert!(parsed.references.is_none());
        assert!(parsed.in_reply_to.is_none());
    }
}
