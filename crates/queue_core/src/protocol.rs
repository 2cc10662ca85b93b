use serde::{Deserialize, Serialize};
use serde_json::Value;

const KNOWN_ACTIONS: &[&str] = &["getStatus", "clearQueue", "runPromptChain", "enqueuePrompt"];

/// Requests accepted over the request/response channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetStatus,
    ClearQueue,
    RunPromptChain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chain: Option<String>,
    },
    EnqueuePrompt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Status(StatusReport),
    Ack(Ack),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub queue: Vec<String>,
    pub is_responding: bool,
    pub is_processing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("request is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("request has no string `action` field")]
    MissingAction,
    #[error("malformed `{action}` request: {source}")]
    Malformed {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses one request. Unknown actions yield `Ok(None)`: they carry no response contract.
pub fn parse_request(raw: &str) -> Result<Option<Request>, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(ProtocolError::Json)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingAction)?
        .to_string();
    if !KNOWN_ACTIONS.contains(&action.as_str()) {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| ProtocolError::Malformed { action, source })
}

#[cfg(test)]
mod tests {
    use super::{parse_request, Ack, ProtocolError, Request, Response, StatusReport};

    #[test]
    fn parses_known_actions() {
        assert_eq!(
            parse_request(r#"{"action":"getStatus"}"#).unwrap(),
            Some(Request::GetStatus)
        );
        assert_eq!(
            parse_request(r#"{"action":"runPromptChain","chain":"a ~ b"}"#).unwrap(),
            Some(Request::RunPromptChain {
                chain: Some("a ~ b".to_string())
            })
        );
        assert_eq!(
            parse_request(r#"{"action":"enqueuePrompt"}"#).unwrap(),
            Some(Request::EnqueuePrompt { prompt: None })
        );
    }

    #[test]
    fn unknown_action_is_ignored() {
        assert_eq!(parse_request(r#"{"action":"queueUpdated"}"#).unwrap(), None);
    }

    #[test]
    fn missing_action_is_an_error() {
        assert!(matches!(
            parse_request(r#"{"chain":"x"}"#),
            Err(ProtocolError::MissingAction)
        ));
        assert!(matches!(parse_request("not json"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn responses_use_wire_field_names() {
        let status = Response::Status(StatusReport {
            queue: vec!["a".to_string()],
            is_responding: true,
            is_processing: false,
        });
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"queue":["a"],"isResponding":true,"isProcessing":false}"#
        );
        assert_eq!(
            serde_json::to_string(&Response::Ack(Ack::ok())).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Response::Ack(Ack::error("Empty chain"))).unwrap(),
            r#"{"success":false,"error":"Empty chain"}"#
        );
    }
}
