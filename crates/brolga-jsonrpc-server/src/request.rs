use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{JsonRpcVersion, RequestId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl RequestParams {
    /// Get a parameter by name (for object params)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            RequestParams::Object(map) => map.get(key),
            RequestParams::Array(_) => None,
        }
    }

    /// Number of supplied parameters
    pub fn len(&self) -> usize {
        match self {
            RequestParams::Object(map) => map.len(),
            RequestParams::Array(vec) => vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interpret object params as positional if their keys are exactly the
    /// contiguous range `"0".."n-1"`. Array params are trivially positional.
    /// Returns the values in index order, or `None` for genuinely named params.
    pub fn as_positional(&self) -> Option<Vec<Value>> {
        match self {
            RequestParams::Array(vec) => Some(vec.clone()),
            RequestParams::Object(map) => {
                let mut indexed: Vec<(usize, &Value)> = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let index: usize = key.parse().ok()?;
                    indexed.push((index, value));
                }
                indexed.sort_by_key(|(i, _)| *i);
                for (expected, (actual, _)) in indexed.iter().enumerate() {
                    if *actual != expected {
                        return None;
                    }
                }
                Some(indexed.into_iter().map(|(_, v)| v.clone()).collect())
            }
        }
    }

}

/// A JSON-RPC request carrying an id. Requests without an id are
/// notifications and modeled separately as [`crate::JsonRpcNotification`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: String, params: Option<RequestParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            method,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_string};

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(RequestId::Number(1), "test_method".to_string(), None);

        let json = to_string(&request).unwrap();
        let parsed: JsonRpcRequest = from_str(&json).unwrap();

        assert_eq!(parsed.id, RequestId::Number(1));
        assert_eq!(parsed.method, "test_method");
        assert!(parsed.params.is_none());
    }

    #[test]
    fn test_request_params_round_trip() {
        let mut map = Map::new();
        map.insert("name".to_string(), json!("test"));
        map.insert("value".to_string(), json!(42));
        let request = JsonRpcRequest::new(
            RequestId::String("req1".to_string()),
            "set_value".to_string(),
            Some(RequestParams::Object(map)),
        );

        let parsed: JsonRpcRequest = from_str(&to_string(&request).unwrap()).unwrap();
        let params = parsed.params.unwrap();
        assert_eq!(params.get("name"), Some(&json!("test")));
        assert_eq!(params.get("value"), Some(&json!(42)));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_array_params_are_positional() {
        let params = RequestParams::Array(vec![json!(1), json!(2)]);
        assert_eq!(params.as_positional(), Some(vec![json!(1), json!(2)]));
    }

    #[test]
    fn test_contiguous_indexed_object_is_positional() {
        let mut map = Map::new();
        map.insert("1".to_string(), json!("b"));
        map.insert("0".to_string(), json!("a"));
        let params = RequestParams::Object(map);
        assert_eq!(params.as_positional(), Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_named_object_is_not_positional() {
        let mut map = Map::new();
        map.insert("minuend".to_string(), json!(42));
        map.insert("subtrahend".to_string(), json!(23));
        let params = RequestParams::Object(map);
        assert!(params.as_positional().is_none());

        // A gap in the index range also disqualifies positional treatment.
        let mut map = Map::new();
        map.insert("0".to_string(), json!("a"));
        map.insert("2".to_string(), json!("c"));
        assert!(RequestParams::Object(map).as_positional().is_none());
    }
}
