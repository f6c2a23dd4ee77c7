use serde::{Deserialize, Serialize};

use crate::{request::RequestParams, types::JsonRpcVersion};

/// A JSON-RPC notification (request without an id).
///
/// Notifications never receive a response, not even on dispatch failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
}

impl JsonRpcNotification {
    pub fn new(method: String, params: Option<RequestParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, from_str, json, to_string};

    #[test]
    fn test_notification_serialization() {
        let notification = JsonRpcNotification::new("test_notification".to_string(), None);

        let json_str = to_string(&notification).unwrap();
        let parsed: JsonRpcNotification = from_str(&json_str).unwrap();

        assert_eq!(parsed.method, "test_notification");
        assert!(parsed.params.is_none());
    }

    #[test]
    fn test_notification_with_params() {
        let mut params = Map::new();
        params.insert("message".to_string(), json!("Hello"));
        params.insert("level".to_string(), json!("info"));
        let notification =
            JsonRpcNotification::new("log".to_string(), Some(RequestParams::Object(params)));

        let parsed: JsonRpcNotification = from_str(&to_string(&notification).unwrap()).unwrap();
        let params = parsed.params.unwrap();
        assert_eq!(params.get("message"), Some(&json!("Hello")));
        assert_eq!(params.get("level"), Some(&json!("info")));
    }

    #[test]
    fn test_notification_json_format() {
        let notification = JsonRpcNotification::new("ping".to_string(), None);
        let json_str = to_string(&notification).unwrap();

        // Should not contain an "id" field
        assert!(!json_str.contains("\"id\""));
        assert!(json_str.contains("\"jsonrpc\":\"2.0\""));
        assert!(json_str.contains("\"method\":\"ping\""));
    }
}
